use std::io::BufRead;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use relval_core::errors::{IdentifierError, Result};
use relval_core::utils::{get_dynamic_reader, parse_identifier};
use relval_core::IdentifierSet;

use crate::consts::PROGRESS_INTERVAL;
use crate::source::{Field, ReleaseFiles, SourceKind};

///
/// Normalizes a list of typed flat files into one canonical [IdentifierSet].
///
/// Sources are read in the order they were added. Any token that is not a
/// valid RS id fails the whole build with
/// [IdentifierError::MalformedIdentifier]; empty files simply contribute
/// nothing.
///
#[derive(Debug, Clone, Default)]
pub struct IdentifierSetBuilder {
    sources: Vec<(SourceKind, PathBuf)>,
    progress: bool,
}

impl IdentifierSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder over every release file of an assembly.
    pub fn for_release(files: &ReleaseFiles) -> Self {
        IdentifierSetBuilder {
            sources: files.sources(),
            progress: false,
        }
    }

    pub fn add_source<P: AsRef<Path>>(mut self, kind: SourceKind, path: P) -> Self {
        self.sources.push((kind, path.as_ref().to_path_buf()));
        self
    }

    /// Show a spinner on stderr while reading.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn sources(&self) -> &[(SourceKind, PathBuf)] {
        &self.sources
    }

    pub fn build(&self) -> Result<IdentifierSet> {
        let spinner = match self.progress {
            true => {
                let spinner = ProgressBar::new_spinner();
                spinner.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} [{elapsed}] {msg} ({per_sec})")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner())
                        .tick_strings(&["-", "\\", "|", "/"]),
                );
                spinner
            }
            false => ProgressBar::hidden(),
        };

        let mut ids: Vec<u64> = Vec::new();
        for (kind, path) in &self.sources {
            spinner.set_message(format!("Reading {} ids from {}", kind, path.display()));
            let before = ids.len();
            read_source(*kind, path, &mut ids, &spinner)?;
            debug!(
                kind = %kind,
                path = %path.display(),
                extracted = ids.len() - before,
                "read identifier source"
            );
        }

        let set = IdentifierSet::from_unsorted(ids);
        spinner.finish_and_clear();
        info!(
            sources = self.sources.len(),
            unique_ids = set.len(),
            "built identifier set"
        );

        Ok(set)
    }
}

///
/// Append every id a single source contributes to `ids`.
///
/// # Arguments
/// - kind: extraction rule for this file
/// - path: the (optionally gzipped) file
/// - ids: accumulator, left unsorted
///
pub fn read_source(
    kind: SourceKind,
    path: &Path,
    ids: &mut Vec<u64>,
    progress: &ProgressBar,
) -> Result<()> {
    let reader = get_dynamic_reader(path)?;

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| IdentifierError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let line_number = index + 1;

        if line.trim().is_empty() || kind.is_header(&line) {
            continue;
        }

        for field in kind.fields() {
            let token = match field {
                Field::Line => Some(line.as_str()),
                Field::Column(column) => line.split('\t').nth(*column),
            };

            let id = token.and_then(parse_identifier).ok_or_else(|| {
                IdentifierError::MalformedIdentifier {
                    path: path.to_path_buf(),
                    line: line_number,
                    token: token.unwrap_or(line.as_str()).to_string(),
                }
            })?;
            ids.push(id);
        }

        if line_number as u64 % PROGRESS_INTERVAL == 0 {
            progress.inc(PROGRESS_INTERVAL);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs::File;
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn write_gz(path: &Path, content: &str) {
        let file = File::create(path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(content.as_bytes()).unwrap();
        encoder.finish().unwrap();
    }

    fn vcf(ids: &[&str]) -> String {
        let mut content = String::from("##fileformat=VCFv4.1\n#CHROM\tPOS\tID\tREF\tALT\n");
        for (i, id) in ids.iter().enumerate() {
            content.push_str(&format!("1\t{}\t{}\tA\tG\n", 100 + i, id));
        }
        content
    }

    #[fixture]
    fn release_folder() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let files = ReleaseFiles::for_assembly(dir.path(), "GCA_1.1");

        write_gz(
            &files.path_for(SourceKind::Active).unwrap(),
            &vcf(&["rs1", "rs2", "rs3"]),
        );
        write_gz(&files.path_for(SourceKind::Merged).unwrap(), &vcf(&["rs10"]));
        write_gz(
            &files.path_for(SourceKind::Multimap).unwrap(),
            &vcf(&["rs2", "rs20"]),
        );
        write_gz(
            &files.path_for(SourceKind::MergedDeprecated).unwrap(),
            "rs30\trs31\nrs32\trs3\n",
        );
        write_gz(
            &files.path_for(SourceKind::Deprecated).unwrap(),
            "rs40\n\nrs41\n",
        );

        dir
    }

    #[rstest]
    fn test_build_release_universe(release_folder: tempfile::TempDir) {
        let files = ReleaseFiles::for_assembly(release_folder.path(), "GCA_1.1");
        let set = IdentifierSetBuilder::for_release(&files).build().unwrap();

        assert_eq!(
            set.as_slice(),
            &[1, 2, 3, 10, 20, 30, 31, 32, 40, 41]
        );
    }

    #[rstest]
    fn test_malformed_active_id_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("GCA_1.1_current_ids.vcf.gz");
        write_gz(&path, &vcf(&["rs1", "rsXYZ"]));

        let err = IdentifierSetBuilder::new()
            .add_source(SourceKind::Active, &path)
            .build()
            .unwrap_err();

        match err {
            IdentifierError::MalformedIdentifier { line, token, .. } => {
                assert_eq!(line, 4);
                assert_eq!(token, "rsXYZ");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[rstest]
    fn test_missing_column_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merged_deprecated.txt");
        std::fs::write(&path, "rs1\trs2\nrs3\n").unwrap();

        let err = IdentifierSetBuilder::new()
            .add_source(SourceKind::MergedDeprecated, &path)
            .build()
            .unwrap_err();

        assert!(matches!(
            err,
            IdentifierError::MalformedIdentifier { line: 2, .. }
        ));
    }

    #[rstest]
    fn test_empty_sources_give_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("store_ids.txt");
        let gz = dir.path().join("deprecated.txt.gz");
        std::fs::write(&plain, "").unwrap();
        write_gz(&gz, "");

        let set = IdentifierSetBuilder::new()
            .add_source(SourceKind::IdList, &plain)
            .add_source(SourceKind::Deprecated, &gz)
            .build()
            .unwrap();

        assert!(set.is_empty());
        assert!(IdentifierSetBuilder::new().build().unwrap().is_empty());
    }

    #[rstest]
    fn test_id_list_without_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mongo_unique_rs_ids.txt");
        std::fs::write(&path, "3\n1\n2\n1\n").unwrap();

        let set = IdentifierSetBuilder::new()
            .add_source(SourceKind::IdList, &path)
            .build()
            .unwrap();

        assert_eq!(set.as_slice(), &[1, 2, 3]);
    }

    #[rstest]
    fn test_missing_release_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let files = ReleaseFiles::for_assembly(dir.path(), "GCA_9.9");

        let err = IdentifierSetBuilder::for_release(&files)
            .build()
            .unwrap_err();

        assert!(matches!(err, IdentifierError::FileRead { .. }));
        assert!(err.to_string().contains("GCA_9.9_current_ids.vcf.gz"));
    }
}
