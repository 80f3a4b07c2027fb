//! Service layer providing business-oriented stock operations on top of models.
//! - Separates business rules from data access.
//! - Reuses validation and entity definitions in the `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod beer;
