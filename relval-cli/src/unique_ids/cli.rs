use std::path::PathBuf;

use clap::{Command, arg, value_parser};

pub const UNIQUE_IDS_CMD: &str = "unique-ids";

pub fn create_unique_ids_cli() -> Command {
    Command::new(UNIQUE_IDS_CMD)
        .about("Write every distinct RS id of a release, one per line.")
        .arg_required_else_help(true)
        .arg(arg!(--assembly <assembly> "Assembly accession").required(true))
        .arg(
            arg!(--"release-folder" <folder> "Folder holding the assembly's release files")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(arg!(-o --output <file> "Defaults to <assembly>_unique_ids.txt").value_parser(value_parser!(PathBuf)))
}
