use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;
use tracing::info;

use relval_attribution::consts::UNIQUE_IDS_SUFFIX;
use relval_io::{IdWrite, IdentifierSetBuilder, ReleaseFiles};

pub fn run_unique_ids(matches: &ArgMatches) -> Result<()> {
    let assembly = matches
        .get_one::<String>("assembly")
        .context("An assembly accession is required.")?;
    let release_folder = matches
        .get_one::<PathBuf>("release-folder")
        .context("A release folder is required.")?;
    let output = matches
        .get_one::<PathBuf>("output")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(format!("{}{}", assembly, UNIQUE_IDS_SUFFIX)));

    let ids = IdentifierSetBuilder::for_release(&ReleaseFiles::for_assembly(
        release_folder,
        assembly,
    ))
    .with_progress(true)
    .build()?;
    ids.write_ids(&output)?;

    info!(ids = ids.len(), output = %output.display(), "wrote release ids");
    Ok(())
}
