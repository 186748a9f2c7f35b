// EVA and dbSNP collections of the accessioning database.
pub const SUBMITTED_VARIANT_ENTITY: &str = "submittedVariantEntity";
pub const SUBMITTED_VARIANT_OPERATION_ENTITY: &str = "submittedVariantOperationEntity";
pub const DBSNP_SUBMITTED_VARIANT_ENTITY: &str = "dbsnpSubmittedVariantEntity";
pub const DBSNP_SUBMITTED_VARIANT_OPERATION_ENTITY: &str = "dbsnpSubmittedVariantOperationEntity";
pub const CLUSTERED_VARIANT_ENTITY: &str = "clusteredVariantEntity";
pub const CLUSTERED_VARIANT_OPERATION_ENTITY: &str = "clusteredVariantOperationEntity";
pub const DBSNP_CLUSTERED_VARIANT_ENTITY: &str = "dbsnpClusteredVariantEntity";
pub const DBSNP_CLUSTERED_VARIANT_OPERATION_ENTITY: &str = "dbsnpClusteredVariantOperationEntity";

/// Collections whose `accession` field makes up the store-side RS universe.
pub const RS_UNIVERSE_COLLECTIONS: [&str; 4] = [
    CLUSTERED_VARIANT_ENTITY,
    CLUSTERED_VARIANT_OPERATION_ENTITY,
    DBSNP_CLUSTERED_VARIANT_ENTITY,
    DBSNP_CLUSTERED_VARIANT_OPERATION_ENTITY,
];

pub const ACCESSION_FIELD: &str = "accession";

/// File extensions tried, in order, when resolving a collection export.
pub const COLLECTION_FILE_EXTENSIONS: [&str; 4] = ["jsonl", "json", "jsonl.gz", "json.gz"];

// Extended JSON wrappers mongoexport uses for 64 and 32 bit integers.
pub const NUMBER_LONG_KEY: &str = "$numberLong";
pub const NUMBER_INT_KEY: &str = "$numberInt";
