//! Pure collection queries: search, department filter, sorting and stats.
//!
//! These work on an already-loaded snapshot so they can be tested without a store.

use std::{cmp::Ordering, collections::BTreeMap, str::FromStr};

use models::Student;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Department label used in stats for records without one.
pub const UNKNOWN_DEPARTMENT: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Age,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortField {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "age" => Ok(SortField::Age),
            "name" => Ok(SortField::Name),
            _ => Err(ServiceError::BadRequest("Sort field must be 'age' or 'name'".into())),
        }
    }
}

impl FromStr for SortOrder {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ServiceError::BadRequest("Sort order must be 'asc' or 'desc'".into())),
        }
    }
}

/// Optional search filters; blank values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl SearchQuery {
    fn name_filter(&self) -> Option<String> {
        self.name.as_deref().filter(|n| !n.is_empty()).map(str::to_lowercase)
    }

    fn email_filter(&self) -> Option<String> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_lowercase)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total: usize,
    pub average_age: Option<f64>,
    pub count_per_department: BTreeMap<String, usize>,
}

pub fn search(students: Vec<Student>, query: &SearchQuery) -> Vec<Student> {
    let mut results = students;
    if let Some(name) = query.name_filter() {
        results.retain(|s| s.name.to_lowercase().contains(&name));
    }
    if let Some(email) = query.email_filter() {
        results.retain(|s| s.email.trim().to_lowercase() == email);
    }
    results
}

pub fn filter_by_department(students: Vec<Student>, department: &str) -> Vec<Student> {
    let wanted = department.to_lowercase();
    students
        .into_iter()
        .filter(|s| s.department.as_deref().is_some_and(|d| d.to_lowercase() == wanted))
        .collect()
}

fn compare(a: &Student, b: &Student, by: SortField) -> Ordering {
    match by {
        SortField::Age => a.age.cmp(&b.age),
        SortField::Name => a.name.cmp(&b.name),
    }
}

/// Stable sort; equal keys keep their collection order in both directions.
pub fn sort(students: &mut [Student], by: SortField, order: SortOrder) {
    match order {
        SortOrder::Asc => students.sort_by(|a, b| compare(a, b, by)),
        SortOrder::Desc => students.sort_by(|a, b| compare(b, a, by)),
    }
}

pub fn stats(students: &[Student]) -> Stats {
    let total = students.len();
    let average_age = (total > 0)
        .then(|| students.iter().map(|s| s.age as f64).sum::<f64>() / total as f64);
    let mut count_per_department = BTreeMap::new();
    for s in students {
        let dept = s.department.as_deref().unwrap_or(UNKNOWN_DEPARTMENT);
        *count_per_department.entry(dept.to_string()).or_insert(0) += 1;
    }
    Stats { total, average_age, count_per_department }
}
