use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(Serialize, ToSchema)]
pub struct MessageDoc { pub message: String }

#[derive(Serialize, ToSchema)]
pub struct ErrorDoc {
    pub error: String,
    /// `validation` | `not_found` | `conflict` | `bad_request` | `storage`
    pub kind: String,
    pub detail: String,
    pub field: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct StudentDoc {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: i64,
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "CGPA")]
    pub cgpa: i64,
}

#[derive(Serialize, ToSchema)]
pub struct StudentInputDoc {
    /// At least 2 non-whitespace characters
    pub name: String,
    /// Unique, case-insensitive
    pub email: String,
    /// 10..=100
    pub age: i64,
    pub department: Option<String>,
    /// 0..=4
    #[serde(rename = "CGPA")]
    pub cgpa: i64,
}

/// Omitted keys keep their value; `department: null` clears the department.
#[derive(Serialize, ToSchema)]
pub struct StudentPatchDoc {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
    pub department: Option<String>,
    #[serde(rename = "CGPA")]
    pub cgpa: Option<i64>,
}

#[derive(Serialize, ToSchema)]
pub struct UpdateResponseDoc {
    pub message: String,
    pub student: StudentDoc,
}

#[derive(Serialize, ToSchema)]
pub struct StatsDoc {
    pub total: usize,
    pub average_age: Option<f64>,
    pub count_per_department: BTreeMap<String, usize>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::home,
        crate::routes::health,
        crate::routes::students::get_student,
        crate::routes::students::view_students,
        crate::routes::students::list_students,
        crate::routes::students::create_student,
        crate::routes::students::update_student,
        crate::routes::students::delete_student,
        crate::routes::students::search_students,
        crate::routes::students::filter_students,
        crate::routes::students::sort_students,
        crate::routes::students::student_stats,
    ),
    components(
        schemas(
            HealthResponse,
            MessageDoc,
            ErrorDoc,
            StudentDoc,
            StudentInputDoc,
            StudentPatchDoc,
            UpdateResponseDoc,
            StatsDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "students")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_student_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for p in ["/", "/health", "/students/{id}", "/students", "/update_student/{id}", "/students/stats", "/student/filter"] {
            assert!(paths.iter().any(|k| k.as_str() == p), "missing {p}");
        }
    }
}
