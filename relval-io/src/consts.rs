pub const CURRENT_IDS_SUFFIX: &str = "_current_ids.vcf.gz";
pub const MERGED_IDS_SUFFIX: &str = "_merged_ids.vcf.gz";
pub const MULTIMAP_IDS_SUFFIX: &str = "_multimap_ids.vcf.gz";
pub const MERGED_DEPRECATED_IDS_SUFFIX: &str = "_merged_deprecated_ids.txt.gz";
pub const DEPRECATED_IDS_SUFFIX: &str = "_deprecated_ids.txt.gz";

/// Lines read between progress updates.
pub const PROGRESS_INTERVAL: u64 = 100_000;
