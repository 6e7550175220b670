use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use common::types::Message;
use models::{Student, StudentInput, StudentPatch};
use serde::{Deserialize, Serialize};
use service::{SearchQuery, Stats};
use tracing::info;
use uuid::Uuid;

use crate::{errors::ApiError, metrics, state::AppState};

#[derive(Debug, Deserialize)]
pub struct FilterQuery {
    pub department: String,
}

#[derive(Debug, Deserialize)]
pub struct SortQuery {
    #[serde(default = "default_sort_by")]
    pub by: String,
    #[serde(default = "default_sort_order")]
    pub order: String,
}

fn default_sort_by() -> String { "age".into() }
fn default_sort_order() -> String { "asc".into() }

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub message: String,
    pub student: Student,
}

/// 获取指定学生
#[utoipa::path(
    get, path = "/students/{id}", tag = "students",
    params(("id" = Uuid, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student", body = crate::openapi::StudentDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get_student(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Student>, ApiError> {
    metrics::record_request("get");
    let Path(id) = id?;
    Ok(Json(state.students.get(id).await?))
}

/// Strict listing: an empty collection is a 400.
#[utoipa::path(
    get, path = "/student_view", tag = "students",
    responses(
        (status = 200, description = "All students", body = [crate::openapi::StudentDoc]),
        (status = 400, description = "No student exist", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn view_students(State(state): State<AppState>) -> Result<Json<Vec<Student>>, ApiError> {
    metrics::record_request("list_all");
    Ok(Json(state.students.list_all().await?))
}

#[utoipa::path(
    get, path = "/students", tag = "students",
    responses((status = 200, description = "All students, possibly none", body = [crate::openapi::StudentDoc]))
)]
pub async fn list_students(State(state): State<AppState>) -> Result<Json<Vec<Student>>, ApiError> {
    metrics::record_request("list");
    Ok(Json(state.students.list().await?))
}

/// 创建学生
#[utoipa::path(
    post, path = "/students", tag = "students",
    request_body = crate::openapi::StudentInputDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::StudentDoc),
        (status = 400, description = "Validation Error or duplicate email", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create_student(
    State(state): State<AppState>,
    payload: Result<Json<StudentInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    metrics::record_request("create");
    let Json(input) = payload?;
    let created = state.students.create(input).await?;
    info!(id = %created.id, "create_student");
    Ok((StatusCode::CREATED, Json(created)))
}

/// 更新学生（只修改提交的字段）
#[utoipa::path(
    put, path = "/update_student/{id}", tag = "students",
    params(("id" = Uuid, Path, description = "Student id")),
    request_body = crate::openapi::StudentPatchDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::UpdateResponseDoc),
        (status = 400, description = "Validation Error or duplicate email", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update_student(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<StudentPatch>, JsonRejection>,
) -> Result<Json<UpdateResponse>, ApiError> {
    metrics::record_request("update");
    let Path(id) = id?;
    let Json(patch) = payload?;
    let student = state.students.update(id, patch).await?;
    Ok(Json(UpdateResponse { message: "Successfully updated".into(), student }))
}

#[utoipa::path(
    delete, path = "/students/{id}", tag = "students",
    params(("id" = Uuid, Path, description = "Student id")),
    responses(
        (status = 200, description = "Deleted", body = crate::openapi::MessageDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn delete_student(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Message>, ApiError> {
    metrics::record_request("delete");
    let Path(id) = id?;
    state.students.delete(id).await?;
    Ok(Json(Message::new("Student deleted Successfully")))
}

#[utoipa::path(
    get, path = "/students/search", tag = "students",
    params(
        ("name" = Option<String>, Query, description = "Case-insensitive substring of the name"),
        ("email" = Option<String>, Query, description = "Case-insensitive exact email")
    ),
    responses((status = 200, description = "Matching students", body = [crate::openapi::StudentDoc]))
)]
pub async fn search_students(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<Student>>, ApiError> {
    metrics::record_request("search");
    let Query(query) = query?;
    Ok(Json(state.students.search(&query).await?))
}

#[utoipa::path(
    get, path = "/student/filter", tag = "students",
    params(("department" = String, Query, description = "Department, case-insensitive")),
    responses(
        (status = 200, description = "Students in the department", body = [crate::openapi::StudentDoc]),
        (status = 404, description = "No students found in this department", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn filter_students(
    State(state): State<AppState>,
    query: Result<Query<FilterQuery>, QueryRejection>,
) -> Result<Json<Vec<Student>>, ApiError> {
    metrics::record_request("filter");
    let Query(FilterQuery { department }) = query?;
    Ok(Json(state.students.filter_by_department(&department).await?))
}

#[utoipa::path(
    get, path = "/students/sort", tag = "students",
    params(
        ("by" = Option<String>, Query, description = "`age` (default) or `name`"),
        ("order" = Option<String>, Query, description = "`asc` (default) or `desc`")
    ),
    responses(
        (status = 200, description = "Sorted students", body = [crate::openapi::StudentDoc]),
        (status = 400, description = "Bad sort field or order", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn sort_students(
    State(state): State<AppState>,
    query: Result<Query<SortQuery>, QueryRejection>,
) -> Result<Json<Vec<Student>>, ApiError> {
    metrics::record_request("sort");
    let Query(SortQuery { by, order }) = query?;
    Ok(Json(state.students.sort(&by, &order).await?))
}

#[utoipa::path(
    get, path = "/students/stats", tag = "students",
    responses((status = 200, description = "Aggregate statistics", body = crate::openapi::StatsDoc))
)]
pub async fn student_stats(State(state): State<AppState>) -> Result<Json<Stats>, ApiError> {
    metrics::record_request("stats");
    Ok(Json(state.students.stats().await?))
}
