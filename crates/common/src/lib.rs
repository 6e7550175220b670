//! Shared helpers for the student registry crates: logging setup, runtime
//! directory checks and small transport DTOs.

pub mod env;
pub mod types;
pub mod utils;
