//! Exit codes of the `relval` binary.
//!
//! Release pipelines branch on these, so they only ever grow.
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | Success                                            |
//! | 1    | General error                                      |
//! | 2    | Usage error (bad arguments or configuration)       |
//! | 3    | A release or id file holds a malformed identifier  |
//! | 4    | The datastore could not be read or queried         |
//! | 5    | Some missing ids could not be attributed           |

use anyhow::Error;

use relval_attribution::ReconcileError;
use relval_core::IdentifierError;
use relval_store::StoreError;

pub const EXIT_SUCCESS: u8 = 0;

pub const EXIT_ERROR: u8 = 1;

/// Bad arguments, or a config file that does not validate.
/// clap exits with this code on its own for parse failures.
pub const EXIT_USAGE: u8 = 2;

pub const EXIT_MALFORMED_IDENTIFIER: u8 = 3;

/// Includes per-query timeouts and unreadable collection exports.
pub const EXIT_STORE_QUERY: u8 = 4;

/// Reconciliation finished but left ids unexplained.
pub const EXIT_UNATTRIBUTED_RESIDUAL: u8 = 5;

pub fn exit_code_for(err: &Error) -> u8 {
    if let Some(err) = err.downcast_ref::<ReconcileError>() {
        return match err {
            ReconcileError::Identifier(err) => identifier_code(err),
            ReconcileError::StoreQuery { .. } | ReconcileError::Store(_) => EXIT_STORE_QUERY,
            ReconcileError::UnattributedResidual { .. } => EXIT_UNATTRIBUTED_RESIDUAL,
            ReconcileError::Config(_) => EXIT_USAGE,
            ReconcileError::Report { .. } | ReconcileError::Io(_) => EXIT_ERROR,
        };
    }
    if let Some(err) = err.downcast_ref::<IdentifierError>() {
        return identifier_code(err);
    }
    if err.downcast_ref::<StoreError>().is_some() {
        return EXIT_STORE_QUERY;
    }

    EXIT_ERROR
}

fn identifier_code(err: &IdentifierError) -> u8 {
    match err {
        IdentifierError::MalformedIdentifier { .. } => EXIT_MALFORMED_IDENTIFIER,
        _ => EXIT_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    use anyhow::Context;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn malformed() -> IdentifierError {
        IdentifierError::MalformedIdentifier {
            path: PathBuf::from("GCA_1.1_current_ids.vcf.gz"),
            line: 4,
            token: "rsXYZ".to_string(),
        }
    }

    fn timeout() -> StoreError {
        StoreError::Timeout {
            collection: "submittedVariantEntity".to_string(),
            elapsed: Duration::from_secs(700),
        }
    }

    #[rstest]
    #[case(ReconcileError::Identifier(malformed()).into(), EXIT_MALFORMED_IDENTIFIER)]
    #[case(malformed().into(), EXIT_MALFORMED_IDENTIFIER)]
    #[case(
        ReconcileError::StoreQuery { category: "rs_with_tandem_repeat_type".to_string(), source: timeout() }.into(),
        EXIT_STORE_QUERY
    )]
    #[case(timeout().into(), EXIT_STORE_QUERY)]
    #[case(
        ReconcileError::UnattributedResidual { count: 2, path: PathBuf::from("x") }.into(),
        EXIT_UNATTRIBUTED_RESIDUAL
    )]
    #[case(ReconcileError::Config("batch_size must be at least 1".to_string()).into(), EXIT_USAGE)]
    #[case(anyhow::anyhow!("something else"), EXIT_ERROR)]
    fn test_exit_codes(#[case] err: Error, #[case] expected: u8) {
        assert_eq!(exit_code_for(&err), expected);
    }

    #[rstest]
    fn test_context_keeps_the_code() {
        let result: Result<(), IdentifierError> = Err(malformed());
        let err = result.context("reading the release").unwrap_err();
        assert_eq!(exit_code_for(&err), EXIT_MALFORMED_IDENTIFIER);
    }
}
