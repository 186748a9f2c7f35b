use std::fmt::{self, Display};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use relval_core::consts::VCF_HEADER_PREFIX;

use crate::consts::*;

///
/// The kinds of flat file an [IdentifierSet](relval_core::IdentifierSet) can be built from.
///
/// Each kind fixes how ids are pulled out of a line: which tab-separated
/// column(s) to read and whether VCF header lines are skipped. The `rs`
/// prefix is always optional and stripped before parsing.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Current (active) RS IDs, VCF, ID column.
    Active,
    /// RS IDs merged into another RS, VCF, ID column.
    Merged,
    /// RS IDs mapped to several locations, VCF, ID column.
    Multimap,
    /// Two-column `old<TAB>new` mapping of merged-then-deprecated RS IDs; both columns count.
    MergedDeprecated,
    /// Deprecated RS IDs, one per line.
    Deprecated,
    /// A plain accession dump (one id per line), e.g. exported from the datastore.
    IdList,
}

/// Where an id token lives on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// The whole line.
    Line,
    /// A zero-based, tab-separated column.
    Column(usize),
}

impl SourceKind {
    pub fn fields(&self) -> &'static [Field] {
        match self {
            SourceKind::Active | SourceKind::Merged | SourceKind::Multimap => &[Field::Column(2)],
            SourceKind::MergedDeprecated => &[Field::Column(0), Field::Column(1)],
            SourceKind::Deprecated | SourceKind::IdList => &[Field::Line],
        }
    }

    pub fn skips_header_lines(&self) -> bool {
        matches!(
            self,
            SourceKind::Active | SourceKind::Merged | SourceKind::Multimap
        )
    }

    pub fn is_header(&self, line: &str) -> bool {
        self.skips_header_lines() && line.starts_with(VCF_HEADER_PREFIX)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Active => "active",
            SourceKind::Merged => "merged",
            SourceKind::Multimap => "multimap",
            SourceKind::MergedDeprecated => "merged-deprecated",
            SourceKind::Deprecated => "deprecated",
            SourceKind::IdList => "id-list",
        }
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "active" | "current" => Ok(SourceKind::Active),
            "merged" => Ok(SourceKind::Merged),
            "multimap" => Ok(SourceKind::Multimap),
            "merged-deprecated" => Ok(SourceKind::MergedDeprecated),
            "deprecated" => Ok(SourceKind::Deprecated),
            "id-list" | "ids" => Ok(SourceKind::IdList),
            _ => Err(format!("Invalid source kind: {}", s)),
        }
    }
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

///
/// An input file together with the kind of file it is.
///
/// Parsed from `kind=path`, e.g. `merged=GCA_1.1_merged_ids.vcf.gz`. Text
/// without a known kind before the first `=` is taken whole as the path of
/// an id list.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedSource {
    pub kind: SourceKind,
    pub path: PathBuf,
}

impl FromStr for TypedSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("Empty source".to_string());
        }

        if let Some((kind, path)) = s.split_once('=') {
            if let Ok(kind) = kind.parse::<SourceKind>() {
                if path.is_empty() {
                    return Err(format!("Missing path for {} source", kind));
                }
                return Ok(TypedSource {
                    kind,
                    path: PathBuf::from(path),
                });
            }
        }

        Ok(TypedSource {
            kind: SourceKind::IdList,
            path: PathBuf::from(s),
        })
    }
}

impl Display for TypedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind, self.path.display())
    }
}

///
/// The release files published for one assembly.
///
/// Release files follow the `<folder>/<assembly><suffix>` naming used by the
/// release pipeline, e.g. `GCA_000003055.6_current_ids.vcf.gz`.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseFiles {
    pub assembly: String,
    pub folder: PathBuf,
}

impl ReleaseFiles {
    pub fn for_assembly<P: AsRef<Path>>(folder: P, assembly: &str) -> Self {
        ReleaseFiles {
            assembly: assembly.to_string(),
            folder: folder.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, kind: SourceKind) -> Option<PathBuf> {
        let suffix = match kind {
            SourceKind::Active => CURRENT_IDS_SUFFIX,
            SourceKind::Merged => MERGED_IDS_SUFFIX,
            SourceKind::Multimap => MULTIMAP_IDS_SUFFIX,
            SourceKind::MergedDeprecated => MERGED_DEPRECATED_IDS_SUFFIX,
            SourceKind::Deprecated => DEPRECATED_IDS_SUFFIX,
            SourceKind::IdList => return None,
        };
        Some(self.folder.join(format!("{}{}", self.assembly, suffix)))
    }

    /// The five release sources, in the order they are read.
    pub fn sources(&self) -> Vec<(SourceKind, PathBuf)> {
        [
            SourceKind::Active,
            SourceKind::Merged,
            SourceKind::Multimap,
            SourceKind::MergedDeprecated,
            SourceKind::Deprecated,
        ]
        .into_iter()
        .filter_map(|kind| self.path_for(kind).map(|path| (kind, path)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_release_file_names() {
        let files = ReleaseFiles::for_assembly("/release/cow", "GCA_000003055.6");
        let sources = files.sources();

        assert_eq!(sources.len(), 5);
        assert_eq!(
            sources[0],
            (
                SourceKind::Active,
                PathBuf::from("/release/cow/GCA_000003055.6_current_ids.vcf.gz")
            )
        );
        assert_eq!(
            sources[3].1,
            PathBuf::from("/release/cow/GCA_000003055.6_merged_deprecated_ids.txt.gz")
        );
        assert_eq!(files.path_for(SourceKind::IdList), None);
    }

    #[rstest]
    #[case("active", SourceKind::Active)]
    #[case("merged_deprecated", SourceKind::MergedDeprecated)]
    #[case("ID-LIST", SourceKind::IdList)]
    fn test_source_kind_from_str(#[case] input: &str, #[case] expected: SourceKind) {
        assert_eq!(input.parse::<SourceKind>().unwrap(), expected);
    }

    #[rstest]
    #[case("merged=out/merged.vcf.gz", SourceKind::Merged, "out/merged.vcf.gz")]
    #[case("deprecated=dep.txt", SourceKind::Deprecated, "dep.txt")]
    #[case("accessions.txt", SourceKind::IdList, "accessions.txt")]
    #[case("run=3/ids.txt", SourceKind::IdList, "run=3/ids.txt")]
    fn test_typed_source_from_str(
        #[case] input: &str,
        #[case] kind: SourceKind,
        #[case] path: &str,
    ) {
        let source: TypedSource = input.parse().unwrap();
        assert_eq!(
            source,
            TypedSource {
                kind,
                path: PathBuf::from(path)
            }
        );
    }

    #[rstest]
    #[case("")]
    #[case("active=")]
    fn test_typed_source_needs_a_path(#[case] input: &str) {
        assert!(input.parse::<TypedSource>().is_err());
    }

    #[rstest]
    fn test_only_vcf_sources_skip_headers() {
        assert!(SourceKind::Multimap.is_header("#CHROM\tPOS\tID"));
        assert!(!SourceKind::Deprecated.is_header("#rs1"));
    }
}
