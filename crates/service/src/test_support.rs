#![cfg(test)]
use std::sync::Arc;

use chrono::Utc;
use models::{Student, StudentInput};
use uuid::Uuid;

use crate::storage::MemoryStore;
use crate::students::StudentService;

pub fn sample_input(name: &str, email: &str, age: i64) -> StudentInput {
    StudentInput {
        name: name.into(),
        email: email.into(),
        age,
        department: Some("CS".into()),
        cgpa: 3,
    }
}

pub fn sample_student(name: &str, email: &str, age: i64, department: Option<&str>) -> Student {
    Student {
        id: Uuid::new_v4(),
        name: name.into(),
        email: email.into(),
        age,
        department: department.map(str::to_string),
        created_at: Utc::now(),
        cgpa: 3,
    }
}

pub fn memory_service() -> StudentService {
    StudentService::new(Arc::new(MemoryStore::new()))
}
