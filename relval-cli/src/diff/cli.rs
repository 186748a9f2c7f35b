use std::path::PathBuf;

use clap::{Arg, Command, arg, value_parser};

use relval_io::TypedSource;

pub const DIFF_CMD: &str = "diff";

pub fn create_diff_cli() -> Command {
    Command::new(DIFF_CMD)
        .about("Write the ids of one list that are absent from another.")
        .arg_required_else_help(true)
        .arg(
            Arg::new("a")
                .short('a')
                .value_name("ids")
                .help("Ids to keep, as <file> or <kind>=<file> (kinds: active, merged, multimap, merged-deprecated, deprecated, id-list)")
                .required(true)
                .value_parser(value_parser!(TypedSource)),
        )
        .arg(
            Arg::new("b")
                .short('b')
                .value_name("ids")
                .help("Ids to drop, as <file> or <kind>=<file>")
                .required(true)
                .value_parser(value_parser!(TypedSource)),
        )
        .arg(arg!(-o --output <file> "Defaults to stdout").value_parser(value_parser!(PathBuf)))
}
