use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;
use tracing::info;

use relval_attribution::{
    ReconcileConfig, Reconciliation, RunContext, StoreAccessions, UniverseSource,
};
use relval_io::{IdentifierSetBuilder, ReleaseFiles, TypedSource};
use relval_store::DocumentStore;

/// Config file first, then command line flags on top.
pub fn load_config(matches: &ArgMatches) -> Result<ReconcileConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ReconcileConfig::try_from(path)?,
        None => ReconcileConfig::default(),
    };

    if let Some(batch_size) = matches.get_one::<usize>("batch-size") {
        config.batch_size = *batch_size;
    }
    if let Some(workers) = matches.get_one::<usize>("workers") {
        config.workers = *workers;
    }
    if let Some(timeout) = matches.get_one::<u64>("query-timeout") {
        config.query_timeout_secs = Some(*timeout);
    }

    config.validate()?;
    Ok(config)
}

pub fn run_validate(matches: &ArgMatches) -> Result<()> {
    let assembly = matches
        .get_one::<String>("assembly")
        .context("An assembly accession is required.")?;
    let release_folder = matches
        .get_one::<PathBuf>("release-folder")
        .context("A release folder is required.")?;
    let store_dir = matches
        .get_one::<PathBuf>("store-dir")
        .context("A store directory is required.")?;
    let output = matches
        .get_one::<PathBuf>("output")
        .context("An output directory is required.")?;

    let config = load_config(matches)?;
    let store = DocumentStore::open(store_dir)
        .with_context(|| format!("Can't open store exports in {}", store_dir.display()))?;

    let release = IdentifierSetBuilder::for_release(&ReleaseFiles::for_assembly(
        release_folder,
        assembly,
    ))
    .with_progress(true);

    let store_side: Box<dyn UniverseSource + '_> = match matches.get_many::<TypedSource>("store-ids") {
        Some(sources) => Box::new(
            sources.fold(IdentifierSetBuilder::new().with_progress(true), |builder, source| {
                builder.add_source(source.kind, &source.path)
            }),
        ),
        None => Box::new(StoreAccessions::new(&store)),
    };

    let context = RunContext::new(assembly, output);
    let mut reconciliation = Reconciliation::new(&config, &store)?;
    let report = reconciliation.run(&context, &release, store_side.as_ref())?;

    for category in &report.categories {
        println!("{}\t{}", category.name, category.matched.len());
    }
    info!(
        missing = report.missing_count,
        attributed = report.attributed_count(),
        "all missing ids attributed"
    );

    Ok(())
}
