use std::sync::Arc;

use chrono::Utc;
use models::{student::same_email, Student, StudentInput, StudentPatch};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::query::{self, SearchQuery, SortField, SortOrder, Stats};
use crate::storage::StudentRepository;

/// Record store service.
///
/// Every call loads the full collection from the repository; mutations write
/// the full collection back. Mutations inside this process are serialized so
/// their read-modify-write cycles never interleave.
pub struct StudentService {
    repo: Arc<dyn StudentRepository>,
    write_lock: Mutex<()>,
}

impl StudentService {
    pub fn new(repo: Arc<dyn StudentRepository>) -> Self {
        Self { repo, write_lock: Mutex::new(()) }
    }

    /// Fetch one record by id.
    pub async fn get(&self, id: Uuid) -> Result<Student, ServiceError> {
        self.repo
            .load()
            .await?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| ServiceError::not_found("student"))
    }

    /// Every record; an empty collection is reported as a client error.
    pub async fn list_all(&self) -> Result<Vec<Student>, ServiceError> {
        let students = self.repo.load().await?;
        if students.is_empty() {
            return Err(ServiceError::BadRequest("No student exist".into()));
        }
        Ok(students)
    }

    /// Every record, possibly none.
    pub async fn list(&self) -> Result<Vec<Student>, ServiceError> {
        self.repo.load().await
    }

    pub async fn create(&self, input: StudentInput) -> Result<Student, ServiceError> {
        input.validate()?;
        let _guard = self.write_lock.lock().await;
        let mut students = self.repo.load().await?;
        if students.iter().any(|s| same_email(&s.email, &input.email)) {
            return Err(ServiceError::Conflict("Email already exists".into()));
        }
        let student = input.into_student(Uuid::new_v4(), Utc::now())?;
        students.push(student.clone());
        self.repo.save(&students).await?;
        info!(id = %student.id, email = %student.email, total = students.len(), "student created");
        Ok(student)
    }

    /// Apply the supplied fields of `patch` to the record with `id`.
    ///
    /// The email uniqueness check skips the record being updated, so
    /// re-sending its current email is accepted.
    pub async fn update(&self, id: Uuid, patch: StudentPatch) -> Result<Student, ServiceError> {
        patch.validate()?;
        let _guard = self.write_lock.lock().await;
        let mut students = self.repo.load().await?;
        let idx = students
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| ServiceError::not_found("student"))?;
        if let Some(email) = patch.email() {
            let taken = students
                .iter()
                .any(|s| s.id != id && same_email(&s.email, email));
            if taken {
                return Err(ServiceError::Conflict("Email already exists".into()));
            }
        }
        if patch.is_empty() {
            debug!(%id, "empty update payload; nothing to persist");
            return Ok(students.swap_remove(idx));
        }
        students[idx].apply(patch)?;
        let updated = students[idx].clone();
        self.repo.save(&students).await?;
        info!(%id, "student updated");
        Ok(updated)
    }

    /// Remove the first record with `id` and return it.
    pub async fn delete(&self, id: Uuid) -> Result<Student, ServiceError> {
        let _guard = self.write_lock.lock().await;
        let mut students = self.repo.load().await?;
        let idx = students
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| ServiceError::not_found("student"))?;
        let removed = students.remove(idx);
        self.repo.save(&students).await?;
        info!(%id, remaining = students.len(), "student deleted");
        Ok(removed)
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<Student>, ServiceError> {
        let students = self.repo.load().await?;
        Ok(query::search(students, query))
    }

    pub async fn filter_by_department(&self, department: &str) -> Result<Vec<Student>, ServiceError> {
        let found = query::filter_by_department(self.repo.load().await?, department);
        if found.is_empty() {
            return Err(ServiceError::NotFound("No students found in this department".into()));
        }
        Ok(found)
    }

    /// Sort by `by` (`age` | `name`) in `order` (`asc` | `desc`).
    pub async fn sort(&self, by: &str, order: &str) -> Result<Vec<Student>, ServiceError> {
        let by: SortField = by.parse()?;
        let order: SortOrder = order.parse()?;
        let mut students = self.repo.load().await?;
        query::sort(&mut students, by, order);
        Ok(students)
    }

    pub async fn stats(&self) -> Result<Stats, ServiceError> {
        let students = self.repo.load().await?;
        Ok(query::stats(&students))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::storage::{JsonFileStore, MemoryStore};
    use crate::test_support::{memory_service, sample_input};
    use models::Patch;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn create_then_get_returns_payload_plus_identity() -> Result<(), ServiceError> {
        let svc = memory_service();
        let input = sample_input("Ana", "ana@example.com", 20);
        let before = Utc::now();
        let created = svc.create(input.clone()).await?;
        let fetched = svc.get(created.id).await?;
        assert_eq!(fetched, created);
        assert_eq!(fetched.name, input.name);
        assert_eq!(fetched.email, input.email);
        assert_eq!(fetched.age, input.age);
        assert_eq!(fetched.department, input.department);
        assert_eq!(fetched.cgpa, input.cgpa);
        assert!(fetched.created_at >= before);
        Ok(())
    }

    #[tokio::test]
    async fn ids_are_unique() -> Result<(), ServiceError> {
        let svc = memory_service();
        let a = svc.create(sample_input("Ana", "a@example.com", 20)).await?;
        let b = svc.create(sample_input("Ben", "b@example.com", 21)).await?;
        assert_ne!(a.id, b.id);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() -> Result<(), ServiceError> {
        let svc = memory_service();
        svc.create(sample_input("Ana", "ana@example.com", 20)).await?;
        let err = svc.create(sample_input("Other", "ANA@example.com", 30)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(svc.list().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn invalid_payloads_are_rejected_without_persisting() -> Result<(), ServiceError> {
        let svc = memory_service();
        let cases = [
            (sample_input("Ana", "ana@example.com", 9), "age"),
            (sample_input("Ana", "ana@example.com", 101), "age"),
            (StudentInput { cgpa: 5, ..sample_input("Ana", "ana@example.com", 20) }, "CGPA"),
            (StudentInput { cgpa: -1, ..sample_input("Ana", "ana@example.com", 20) }, "CGPA"),
            (sample_input(" a ", "ana@example.com", 20), "name"),
            (sample_input("Ana", "not-an-email", 20), "email"),
        ];
        for (input, field) in cases {
            let err = svc.create(input).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
            assert_eq!(err.field(), Some(field));
        }
        assert!(svc.list().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn get_unknown_is_not_found() {
        let svc = memory_service();
        let err = svc.get(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn list_all_is_strict_but_list_is_not() -> Result<(), ServiceError> {
        let svc = memory_service();
        assert_eq!(svc.list_all().await.unwrap_err().kind(), ErrorKind::BadRequest);
        assert!(svc.list().await?.is_empty());
        svc.create(sample_input("Ana", "ana@example.com", 20)).await?;
        assert_eq!(svc.list_all().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn update_unknown_is_not_found() {
        let svc = memory_service();
        let patch = StudentPatch { department: Patch::Set("X".into()), ..Default::default() };
        let err = svc.update(Uuid::new_v4(), patch).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn update_changes_only_supplied_fields() -> Result<(), ServiceError> {
        let svc = memory_service();
        let created = svc.create(sample_input("Ana", "ana@example.com", 20)).await?;
        let patch = StudentPatch { department: Patch::Set("X".into()), ..Default::default() };
        let updated = svc.update(created.id, patch).await?;
        assert_eq!(updated, Student { department: Some("X".into()), ..created.clone() });
        assert_eq!(svc.get(created.id).await?, updated);
        Ok(())
    }

    #[tokio::test]
    async fn update_with_own_email_is_allowed() -> Result<(), ServiceError> {
        let svc = memory_service();
        let created = svc.create(sample_input("Ana", "ana@example.com", 20)).await?;
        let patch = StudentPatch {
            email: Patch::Set("ana@example.com".into()),
            age: Patch::Set(22),
            ..Default::default()
        };
        let updated = svc.update(created.id, patch).await?;
        assert_eq!(updated.age, 22);
        assert_eq!(updated.email, "ana@example.com");
        Ok(())
    }

    #[tokio::test]
    async fn update_to_another_records_email_conflicts() -> Result<(), ServiceError> {
        let svc = memory_service();
        svc.create(sample_input("Ana", "ana@example.com", 20)).await?;
        let ben = svc.create(sample_input("Ben", "ben@example.com", 21)).await?;
        let patch = StudentPatch { email: Patch::Set("Ana@Example.com".into()), ..Default::default() };
        let err = svc.update(ben.id, patch).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(svc.get(ben.id).await?.email, "ben@example.com");
        Ok(())
    }

    #[tokio::test]
    async fn update_validation_leaves_record_untouched() -> Result<(), ServiceError> {
        let svc = memory_service();
        let created = svc.create(sample_input("Ana", "ana@example.com", 20)).await?;
        let patch = StudentPatch { name: Patch::Set("Zed".into()), cgpa: Patch::Set(9), ..Default::default() };
        let err = svc.update(created.id, patch).await.unwrap_err();
        assert_eq!(err.field(), Some("CGPA"));
        assert_eq!(svc.get(created.id).await?, created);
        Ok(())
    }

    #[tokio::test]
    async fn empty_update_returns_record_unchanged() -> Result<(), ServiceError> {
        let svc = memory_service();
        let created = svc.create(sample_input("Ana", "ana@example.com", 20)).await?;
        assert_eq!(svc.update(created.id, StudentPatch::default()).await?, created);
        Ok(())
    }

    #[tokio::test]
    async fn delete_twice_fails_second_time() -> Result<(), ServiceError> {
        let svc = memory_service();
        let a = svc.create(sample_input("Ana", "ana@example.com", 20)).await?;
        let b = svc.create(sample_input("Ben", "ben@example.com", 21)).await?;
        let removed = svc.delete(a.id).await?;
        assert_eq!(removed.id, a.id);
        assert_eq!(svc.delete(a.id).await.unwrap_err().kind(), ErrorKind::NotFound);
        let left = svc.list().await?;
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, b.id);
        Ok(())
    }

    #[tokio::test]
    async fn delete_then_recreate_same_email() -> Result<(), ServiceError> {
        let svc = memory_service();
        let a = svc.create(sample_input("Ana", "ana@example.com", 20)).await?;
        svc.delete(a.id).await?;
        let again = svc.create(sample_input("Ana", "ana@example.com", 20)).await?;
        assert_ne!(again.id, a.id);
        Ok(())
    }

    #[tokio::test]
    async fn sort_validates_params_before_loading() -> Result<(), ServiceError> {
        let svc = memory_service();
        for age in [30, 20, 25] {
            svc.create(sample_input("Stu", &format!("s{age}@example.com"), age)).await?;
        }
        let sorted = svc.sort("age", "asc").await?;
        assert_eq!(sorted.iter().map(|s| s.age).collect::<Vec<_>>(), vec![20, 25, 30]);
        assert_eq!(svc.sort("gpa", "asc").await.unwrap_err().kind(), ErrorKind::BadRequest);
        assert_eq!(svc.sort("age", "sideways").await.unwrap_err().kind(), ErrorKind::BadRequest);
        Ok(())
    }

    #[tokio::test]
    async fn filter_without_match_is_not_found() -> Result<(), ServiceError> {
        let svc = memory_service();
        svc.create(sample_input("Ana", "ana@example.com", 20)).await?;
        assert_eq!(svc.filter_by_department("cs").await?.len(), 1);
        assert_eq!(svc.filter_by_department("Math").await.unwrap_err().kind(), ErrorKind::NotFound);
        Ok(())
    }

    #[tokio::test]
    async fn search_and_stats_on_empty_are_valid() -> Result<(), ServiceError> {
        let svc = memory_service();
        assert!(svc.search(&SearchQuery::default()).await?.is_empty());
        let stats = svc.stats().await?;
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_age, None);
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_creates_are_not_lost() -> Result<(), ServiceError> {
        let svc = Arc::new(StudentService::new(Arc::new(MemoryStore::new())));
        let mut handles = Vec::new();
        for i in 0..16 {
            let svc = Arc::clone(&svc);
            handles.push(tokio::spawn(async move {
                svc.create(sample_input("Stu", &format!("s{i}@example.com"), 20)).await
            }));
        }
        for h in handles {
            h.await.expect("task join")?;
        }
        assert_eq!(svc.list().await?.len(), 16);
        Ok(())
    }

    #[tokio::test]
    async fn file_backed_service_persists_across_instances() -> Result<(), anyhow::Error> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("students.json");
        let svc = StudentService::new(Arc::new(JsonFileStore::new(&path)));
        let created = svc.create(sample_input("Ana", "ana@example.com", 20)).await?;

        let fresh = StudentService::new(Arc::new(JsonFileStore::new(&path)));
        assert_eq!(fresh.get(created.id).await?, created);
        Ok(())
    }
}
