pub mod identifier_set;

// re-export for cleaner imports
pub use self::identifier_set::{IdentifierSet, diff};
