use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, arg, value_parser};

use relval_io::TypedSource;

pub const VALIDATE_CMD: &str = "validate";

pub fn create_validate_cli() -> Command {
    Command::new(VALIDATE_CMD)
        .about("Check that every RS id of a release is in the datastore, or explain why it is not.")
        .arg_required_else_help(true)
        .arg(arg!(--assembly <assembly> "Assembly accession, e.g. GCA_000001405.15").required(true))
        .arg(
            arg!(--"release-folder" <folder> "Folder holding the assembly's release files")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(--"store-dir" <dir> "Folder of collection exports (<collection>.jsonl[.gz])")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("store-ids")
                .long("store-ids")
                .value_name("file")
                .help("Store-side RS ids, as <file> or <kind>=<file>; read from the clustered collections of --store-dir when omitted")
                .num_args(1..)
                .action(ArgAction::Append)
                .value_parser(value_parser!(TypedSource)),
        )
        .arg(
            arg!(-o --output <dir> "Where to write id files and the report")
                .default_value(".")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(arg!(-c --config <file> "TOML file with batch size, workers, timeout and categories").value_parser(value_parser!(PathBuf)))
        .arg(arg!(--"batch-size" <n> "Maximum ids per store query").value_parser(value_parser!(usize)))
        .arg(arg!(--workers <n> "Threads querying batches concurrently").value_parser(value_parser!(usize)))
        .arg(arg!(--"query-timeout" <secs> "Abort when a single store query takes longer").value_parser(value_parser!(u64)))
}
