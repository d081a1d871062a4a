//! Daemon command - daily rebuild and publish cycle.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveTime;
use clap::Args;
use tokio_util::sync::CancellationToken;

use packsmith::builder::BuildMaterializer;
use packsmith::publish::GitPublisher;
use packsmith::scheduler::Scheduler;
use packsmith::store::{BlobStore, FsBlobStore, MappingStore, PackStore};

use super::common;
use crate::error::CliError;

/// Arguments for the daemon command.
#[derive(Debug, Args)]
pub struct DaemonArgs {
    /// Workspace document listing packs and mappings
    pub workspace: PathBuf,

    /// Directory holding asset blobs
    #[arg(long, default_value = "blobs")]
    pub blobs: PathBuf,

    /// Root directory for branch build trees
    #[arg(long, default_value = "builds")]
    pub out: PathBuf,

    /// Local time of the daily flush, HH:MM
    #[arg(long, default_value = "04:00")]
    pub flush_at: String,

    /// Build tasks running at once during a flush
    #[arg(long, default_value_t = 5)]
    pub max_concurrency: usize,
}

/// Run the daemon command.
///
/// Wires the workspace stores into a [`Scheduler`] and hands control to
/// its loop: each cycle rebuilds every pack, then commits and pushes
/// the version-controlled ones. Stops on Ctrl-C.
pub async fn run(args: DaemonArgs) -> Result<(), CliError> {
    let flush_at = NaiveTime::parse_from_str(&args.flush_at, "%H:%M")
        .map_err(|e| CliError::Usage(format!("invalid --flush-at: {}", e)))?;

    let store = common::load_store(&args.workspace).await?;
    let blobs = Arc::new(FsBlobStore::new(&args.blobs));
    let materializer = Arc::new(BuildMaterializer::new(
        &args.out,
        Arc::clone(&store) as Arc<dyn MappingStore>,
        blobs as Arc<dyn BlobStore>,
    ));
    let publisher = Arc::new(GitPublisher::new(Arc::clone(&materializer)));
    let scheduler = Scheduler::new(publisher, Arc::clone(&store) as Arc<dyn PackStore>)
        .with_materializer(materializer)
        .with_flush_at(flush_at)
        .with_max_concurrency(args.max_concurrency);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    println!("Daemon running; flushing daily at {}", flush_at.format("%H:%M"));
    scheduler.run(cancel).await;
    println!("Daemon stopped");
    Ok(())
}
