//! Storage abstractions for the service layer
//!
//! The record service only ever loads or saves the whole collection, so the
//! repository trait has exactly those two operations.

use async_trait::async_trait;
use models::Student;

use crate::errors::ServiceError;

pub mod json_file_store;
pub mod memory_store;

pub use json_file_store::JsonFileStore;
pub use memory_store::MemoryStore;

/// Whole-collection persistence for student records.
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Load every record; a missing or unreadable-as-JSON store is empty.
    async fn load(&self) -> Result<Vec<Student>, ServiceError>;
    /// Replace the stored collection with `students`.
    async fn save(&self, students: &[Student]) -> Result<(), ServiceError>;
}
