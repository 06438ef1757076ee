//! Service layer for the issue tracker.
//! - `issues` holds the domain model, list query engine and repository trait.
//! - `file` provides the JSON-file backed repository.
//! - `storage` contains the generic whole-document JSON persistence.

pub mod errors;
pub mod runtime;
pub mod pagination;
pub mod storage;
pub mod issues;
pub mod file;
