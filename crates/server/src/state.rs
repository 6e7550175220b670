use std::sync::Arc;

use service::{StudentRepository, StudentService};

/// Shared handler state; the store is injected, never global.
#[derive(Clone)]
pub struct AppState {
    pub students: Arc<StudentService>,
}

impl AppState {
    pub fn new(repo: Arc<dyn StudentRepository>) -> Self {
        Self { students: Arc::new(StudentService::new(repo)) }
    }
}
