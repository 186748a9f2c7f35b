/// Prefix carried by RS accessions in release files (`rs123` -> `123`).
pub const RS_PREFIX: &str = "rs";

/// Marker for VCF meta-information and header lines.
pub const VCF_HEADER_PREFIX: char = '#';

pub const GZIP_EXTENSION: &str = "gz";
