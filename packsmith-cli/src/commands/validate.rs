//! Validate command - compare a built branch against a reference catalog.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, ValueEnum};

use packsmith::reference::{CatalogSource, Edition, HttpCatalogSource, HttpClient, ReqwestClient};
use packsmith::store::PackStore;
use packsmith::validate::{compare_textures, scan_tree, ExclusionRules};
use packsmith::version::VersionId;

use super::common;
use crate::error::CliError;

/// Platform edition selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EditionArg {
    /// The desktop edition
    Java,
    /// The cross-platform edition
    Bedrock,
}

impl From<EditionArg> for Edition {
    fn from(arg: EditionArg) -> Self {
        match arg {
            EditionArg::Java => Edition::Java,
            EditionArg::Bedrock => Edition::Bedrock,
        }
    }
}

/// Arguments for the validate command.
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Workspace document listing packs and mappings
    pub workspace: PathBuf,

    /// Root directory of branch build trees
    #[arg(long, default_value = "builds")]
    pub out: PathBuf,

    /// Pack to validate
    #[arg(long)]
    pub pack: String,

    /// Branch to validate
    #[arg(long)]
    pub branch: String,

    /// Platform edition to validate against
    #[arg(long, value_enum, default_value_t = EditionArg::Java)]
    pub edition: EditionArg,

    /// Write the full report here in addition to the summary
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Run the validate command.
pub async fn run(args: ValidateArgs) -> Result<(), CliError> {
    let store = common::load_store(&args.workspace).await?;
    let pack = store
        .pack_by_name(&args.pack)
        .await?
        .ok_or_else(|| CliError::Usage(format!("no pack named {}", args.pack)))?;
    let branch = pack
        .branch_by_name(&args.branch)
        .ok_or_else(|| CliError::Usage(format!("no branch named {}", args.branch)))?;

    let version = match branch.target {
        VersionId::Latest => {
            return Err(CliError::Usage(
                "branch tracks the latest release; validate a branch with an explicit target"
                    .to_string(),
            ))
        }
        release => release.to_string(),
    };

    let source = HttpCatalogSource::new(Arc::new(ReqwestClient::new()?) as Arc<dyn HttpClient>);
    let catalog = source.catalog(args.edition.into(), &version).await?;

    // Branch trees live at <out>/<pack id>/<branch id>.
    let branch_dir = args.out.join(pack.id.to_string()).join(branch.dir_name());
    let pack_files = scan_tree(&branch_dir)?;

    let rules = ExclusionRules::default_rules(&pack.emissive_suffix)?;
    let report = compare_textures(&pack_files, &catalog.paths, &rules);

    println!("{} / {} against {} {}", pack.name, branch.name, catalog.edition, catalog.version);
    println!("matching: {}", report.matching_summary());
    println!("missing:  {}", report.missing_summary());
    println!("unused:   {}", report.unused.len());

    if let Some(path) = args.report {
        report.write_report(&path)?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}
