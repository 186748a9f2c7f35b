use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;

use relval_core::{IdentifierSet, diff};
use relval_io::{IdWrite, IdentifierSetBuilder, TypedSource};

fn read_ids(source: &TypedSource) -> Result<IdentifierSet> {
    Ok(IdentifierSetBuilder::new()
        .add_source(source.kind, &source.path)
        .build()?)
}

pub fn run_diff(matches: &ArgMatches) -> Result<()> {
    let a = matches
        .get_one::<TypedSource>("a")
        .context("A source for -a is required.")?;
    let b = matches
        .get_one::<TypedSource>("b")
        .context("A source for -b is required.")?;

    let missing = diff(&read_ids(a)?, &read_ids(b)?);

    match matches.get_one::<PathBuf>("output") {
        Some(output) => missing.write_ids(output)?,
        None => {
            let mut writer = BufWriter::new(stdout().lock());
            for id in &missing {
                writeln!(writer, "{}", id)?;
            }
            writer.flush()?;
        }
    }

    Ok(())
}
