//! Student record types and field validation.

pub mod errors;
pub mod patch;
pub mod student;

pub use errors::ValidationError;
pub use patch::Patch;
pub use student::{Student, StudentInput, StudentPatch};
