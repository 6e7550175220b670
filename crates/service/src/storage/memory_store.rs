use async_trait::async_trait;
use models::Student;
use tokio::sync::RwLock;

use super::StudentRepository;
use crate::errors::ServiceError;

/// In-memory collection, used by tests and `storage.backend = "memory"`.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Vec<Student>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_students(students: Vec<Student>) -> Self {
        Self { inner: RwLock::new(students) }
    }
}

#[async_trait]
impl StudentRepository for MemoryStore {
    async fn load(&self) -> Result<Vec<Student>, ServiceError> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, students: &[Student]) -> Result<(), ServiceError> {
        *self.inner.write().await = students.to_vec();
        Ok(())
    }
}
