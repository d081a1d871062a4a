//! Build command - materialize packs into branch build trees.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use packsmith::builder::BuildMaterializer;
use packsmith::store::{BlobStore, FsBlobStore, MappingStore, PackStore};

use super::common;
use crate::error::CliError;

/// Arguments for the build command.
#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Workspace document listing packs and mappings
    pub workspace: PathBuf,

    /// Directory holding asset blobs
    #[arg(long, default_value = "blobs")]
    pub blobs: PathBuf,

    /// Root directory for branch build trees
    #[arg(long, default_value = "builds")]
    pub out: PathBuf,

    /// Build only the named pack
    #[arg(long)]
    pub pack: Option<String>,
}

/// Run the build command.
pub async fn run(args: BuildArgs) -> Result<(), CliError> {
    let store = common::load_store(&args.workspace).await?;
    let blobs = Arc::new(FsBlobStore::new(&args.blobs));
    let materializer = BuildMaterializer::new(
        &args.out,
        Arc::clone(&store) as Arc<dyn MappingStore>,
        blobs as Arc<dyn BlobStore>,
    );

    let packs = common::select_packs(store.packs().await?, args.pack.as_deref())?;
    for pack in &packs {
        materializer.build_pack(pack).await?;
        println!("Built {} ({} branches)", pack.name, pack.branches.len());
    }

    let snapshot = materializer.metrics().snapshot();
    println!("Files written:   {}", snapshot.files_written);
    println!("Files unchanged: {}", snapshot.files_skipped);
    if snapshot.branch_failures > 0 {
        println!("Branch failures: {}", snapshot.branch_failures);
    }
    Ok(())
}
