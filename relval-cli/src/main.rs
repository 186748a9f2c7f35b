mod exit_codes;
mod logging;

mod validate {
    pub mod cli;
    pub mod handlers;
}
mod unique_ids {
    pub mod cli;
    pub mod handlers;
}
mod diff {
    pub mod cli;
    pub mod handlers;
}
mod export {
    pub mod cli;
    pub mod handlers;
}

use std::process::ExitCode;

use anyhow::Result;
use clap::Command;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "relval";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Validates RS release files against the variant datastore and explains every missing id.")
        .subcommand_required(true)
        .subcommand(validate::cli::create_validate_cli())
        .subcommand(unique_ids::cli::create_unique_ids_cli())
        .subcommand(diff::cli::create_diff_cli())
        .subcommand(export::cli::create_export_cli())
}

fn run() -> Result<()> {
    let matches = build_parser().get_matches();

    match matches.subcommand() {
        //
        // FULL VALIDATION RUN
        //
        Some((validate::cli::VALIDATE_CMD, matches)) => {
            validate::handlers::run_validate(matches)?;
        }

        //
        // RELEASE UNIVERSE
        //
        Some((unique_ids::cli::UNIQUE_IDS_CMD, matches)) => {
            unique_ids::handlers::run_unique_ids(matches)?;
        }

        //
        // SET DIFFERENCE
        //
        Some((diff::cli::DIFF_CMD, matches)) => {
            diff::handlers::run_diff(matches)?;
        }

        //
        // STORE UNIVERSE
        //
        Some((export::cli::EXPORT_CMD, matches)) => {
            export::handlers::run_export(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

fn main() -> ExitCode {
    logging::init();

    match run() {
        Ok(()) => ExitCode::from(exit_codes::EXIT_SUCCESS),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(exit_codes::exit_code_for(&err))
        }
    }
}
