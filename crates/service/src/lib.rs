//! Service layer providing the student record operations on top of models.
//! - Separates business rules from storage.
//! - Reuses validation and entity definitions in `models` crate.
//! - Provides one error type tagged by `ErrorKind`.

pub mod errors;
pub mod query;
pub mod runtime;
pub mod storage;
pub mod students;
#[cfg(test)]
pub mod test_support;

pub use errors::{ErrorKind, ServiceError};
pub use query::{SearchQuery, SortField, SortOrder, Stats};
pub use storage::{JsonFileStore, MemoryStore, StudentRepository};
pub use students::StudentService;
