use std::ffi::OsStr;
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

use crate::consts::{GZIP_EXTENSION, RS_PREFIX};
use crate::errors::{IdentifierError, Result};

pub fn is_gzipped(path: &Path) -> bool {
    path.extension() == Some(OsStr::new(GZIP_EXTENSION))
}

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// Release files are frequently written as concatenated gzip members, so the
/// multi-member decoder is used.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let file = File::open(path).map_err(|source| IdentifierError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let file: Box<dyn Read> = match is_gzipped(path) {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

///
/// Output sink that gzips its content when the target path ends in `.gz`.
///
pub enum DynamicWriter {
    Plain(BufWriter<File>),
    Gzipped(GzEncoder<BufWriter<File>>),
}

impl DynamicWriter {
    /// Flush buffered data and, for gzip output, write the stream trailer.
    pub fn finish(self) -> std::io::Result<()> {
        match self {
            DynamicWriter::Plain(mut writer) => writer.flush(),
            DynamicWriter::Gzipped(encoder) => encoder.finish()?.flush(),
        }
    }
}

impl Write for DynamicWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            DynamicWriter::Plain(writer) => writer.write(buf),
            DynamicWriter::Gzipped(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            DynamicWriter::Plain(writer) => writer.flush(),
            DynamicWriter::Gzipped(encoder) => encoder.flush(),
        }
    }
}

///
/// Get a writer for either a gzip'd or non-gzip'd file.
///
/// Parent directories are created as needed. Call [DynamicWriter::finish]
/// once everything is written.
///
pub fn get_dynamic_writer(path: &Path) -> Result<DynamicWriter> {
    let wrap = |source| IdentifierError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(wrap)?;
        }
    }

    let file = BufWriter::new(File::create(path).map_err(wrap)?);
    let writer = match is_gzipped(path) {
        true => DynamicWriter::Gzipped(GzEncoder::new(file, Compression::default())),
        false => DynamicWriter::Plain(file),
    };

    Ok(writer)
}

///
/// Parse a single RS identifier token.
///
/// A leading `rs` prefix is stripped and surrounding whitespace ignored; what
/// remains must be a non-empty run of ASCII digits that fits in a `u64`.
/// Signs, decimal points and any other character make the token invalid.
///
pub fn parse_identifier(token: &str) -> Option<u64> {
    let token = token.trim();
    let digits = token.strip_prefix(RS_PREFIX).unwrap_or(token);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    digits.parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("rs123", Some(123))]
    #[case("123", Some(123))]
    #[case("  rs42\r", Some(42))]
    #[case("0", Some(0))]
    #[case("rsXYZ", None)]
    #[case("rs", None)]
    #[case("", None)]
    #[case("+5", None)]
    #[case("-5", None)]
    #[case("12.5", None)]
    #[case("ss123", None)]
    #[case("99999999999999999999999", None)]
    fn test_parse_identifier(#[case] token: &str, #[case] expected: Option<u64>) {
        assert_eq!(parse_identifier(token), expected);
    }

    #[rstest]
    fn test_dynamic_writer_and_reader_handle_gzip() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("nested").join("ids.txt.gz");

        let mut writer = get_dynamic_writer(&path).unwrap();
        writeln!(writer, "rs1").unwrap();
        writeln!(writer, "rs2").unwrap();
        writer.finish().unwrap();

        let lines: Vec<String> = get_dynamic_reader(&path)
            .unwrap()
            .lines()
            .collect::<std::io::Result<_>>()
            .unwrap();

        assert_eq!(lines, vec!["rs1".to_string(), "rs2".to_string()]);
    }

    #[rstest]
    fn test_missing_file_names_the_path() {
        let err = match get_dynamic_reader(Path::new("does/not/exist.txt")) {
            Ok(_) => panic!("reading a missing file should fail"),
            Err(err) => err,
        };
        assert!(matches!(err, IdentifierError::FileRead { .. }));
        assert!(err.to_string().contains("does/not/exist.txt"));
    }
}
