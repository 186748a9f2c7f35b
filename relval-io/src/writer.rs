use std::io::Write;
use std::path::Path;

use relval_core::IdentifierSet;
use relval_core::errors::{IdentifierError, Result};
use relval_core::utils::get_dynamic_writer;

pub trait IdWrite {
    ///
    /// Write ids to disk, one per line, in ascending order.
    ///
    /// The file is gzipped when the path ends in `.gz`; parent directories
    /// are created as needed.
    ///
    /// # Arguments
    /// - path: the path to the file to dump to
    fn write_ids<T: AsRef<Path>>(&self, path: T) -> Result<()>;
}

impl IdWrite for IdentifierSet {
    fn write_ids<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        let path = path.as_ref();
        let wrap = |source| IdentifierError::FileWrite {
            path: path.to_path_buf(),
            source,
        };

        let mut writer = get_dynamic_writer(path)?;
        for id in self.iter() {
            writeln!(writer, "{}", id).map_err(wrap)?;
        }
        writer.finish().map_err(wrap)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::{IdentifierSetBuilder, SourceKind};

    #[rstest]
    #[case("ids.txt")]
    #[case("ids.txt.gz")]
    fn test_written_ids_read_back(#[case] file_name: &str) {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("out").join(file_name);
        let ids = IdentifierSet::from_unsorted(vec![42, 7, 7, 1_000_000]);

        ids.write_ids(&path).unwrap();

        let read = IdentifierSetBuilder::new()
            .add_source(SourceKind::IdList, &path)
            .build()
            .unwrap();
        assert_eq!(read, ids);
    }

    #[rstest]
    fn test_plain_output_is_sorted_lines() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("residual.txt");

        IdentifierSet::from_unsorted(vec![5, 4]).write_ids(&path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "4\n5\n");
    }
}
