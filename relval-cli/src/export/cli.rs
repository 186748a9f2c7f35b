use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, arg, value_parser};

pub const EXPORT_CMD: &str = "export-store-ids";

pub fn create_export_cli() -> Command {
    Command::new(EXPORT_CMD)
        .about("Write the distinct RS accessions held by the datastore exports.")
        .arg_required_else_help(true)
        .arg(
            arg!(--"store-dir" <dir> "Folder of collection exports (<collection>.jsonl[.gz])")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("collections")
                .long("collections")
                .value_name("name")
                .help("Collections to read; defaults to the four clustered variant collections")
                .num_args(1..)
                .action(ArgAction::Append),
        )
        .arg(arg!(--field <path> "Dotted path of the id field").default_value("accession"))
        .arg(
            arg!(-o --output <file> "Where to write the ids")
                .default_value("store_unique_rs_ids.txt")
                .value_parser(value_parser!(PathBuf)),
        )
}
