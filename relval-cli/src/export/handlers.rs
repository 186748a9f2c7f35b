use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;
use tracing::info;

use relval_attribution::{StoreAccessions, UniverseSource};
use relval_io::IdWrite;
use relval_store::{DocumentStore, FieldPath};

pub fn run_export(matches: &ArgMatches) -> Result<()> {
    let store_dir = matches
        .get_one::<PathBuf>("store-dir")
        .context("A store directory is required.")?;
    let output = matches
        .get_one::<PathBuf>("output")
        .context("An output path is required.")?;
    let field: FieldPath = matches
        .get_one::<String>("field")
        .context("An id field is required.")?
        .parse()?;

    let store = DocumentStore::open(store_dir)
        .with_context(|| format!("Can't open store exports in {}", store_dir.display()))?;

    let mut accessions = StoreAccessions::new(&store).with_field(field);
    if let Some(collections) = matches.get_many::<String>("collections") {
        accessions = accessions.with_collections(collections.cloned().collect());
    }

    let ids = accessions.build_universe()?;
    ids.write_ids(output)?;

    info!(ids = ids.len(), output = %output.display(), "wrote store ids");
    Ok(())
}
