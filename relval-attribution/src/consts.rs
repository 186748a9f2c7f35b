pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_WORKERS: usize = 1;

pub const RS_WITH_MERGED_SS_PARENTS: &str = "rs_with_merged_ss_parents";
pub const RS_WITH_DECLUSTERED_SS_PARENTS: &str = "rs_with_declustered_ss_parents";
pub const RS_WITH_TANDEM_REPEAT_TYPE: &str = "rs_with_tandem_repeat_type";
pub const RS_WITH_NON_NUCLEOTIDE_LETTERS: &str = "rs_with_non_nucleotide_letters";

pub const NUCLEOTIDES_ONLY_PATTERN: &str = "^[acgtnACGTN]+$";
pub const DECLUSTERED_REASON_PATTERN: &str = "^Declustered.*";

// output file suffixes, prefixed with the assembly accession
pub const UNIQUE_IDS_SUFFIX: &str = "_unique_ids.txt";
pub const MISSING_IDS_SUFFIX: &str = "_missing_ids.txt";
pub const RESIDUAL_IDS_SUFFIX: &str = "_rs_still_missing.txt";
pub const REPORT_SUFFIX: &str = "_attribution_report.json";
