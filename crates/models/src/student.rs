use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::errors::ValidationError;
use crate::patch::Patch;

/// Payload field name paired with its field in [`FieldCheck`].
const FIELDS: [(&str, &str); 4] = [("name", "name"), ("email", "email"), ("age", "age"), ("cgpa", "CGPA")];

/// Constraints shared by the create and update payloads. `None` skips a field.
///
/// `name` holds the name with whitespace removed, so its length is the visible length.
#[derive(Debug, Default, Validate)]
struct FieldCheck {
    #[validate(length(min = 2, message = "must contain at least 2 non-whitespace characters"))]
    name: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    email: Option<String>,
    #[validate(range(min = 10, max = 100, message = "must be between 10 and 100"))]
    age: Option<i64>,
    #[validate(range(min = 0, max = 4, message = "must be between 0 and 4"))]
    cgpa: Option<i64>,
}

fn visible(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

impl FieldCheck {
    /// Run the derived checks and report the first failing field in payload order.
    fn run(&self) -> Result<(), ValidationError> {
        match self.validate() {
            Ok(()) => Ok(()),
            Err(errors) => Err(first_violation(&errors)),
        }
    }
}

fn first_violation(errors: &ValidationErrors) -> ValidationError {
    let all = errors.errors();
    for (ident, field) in FIELDS {
        if let Some(ValidationErrorsKind::Field(list)) = all.get(ident) {
            if let Some(err) = list.first() {
                let constraint = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                return ValidationError::new(field, constraint);
            }
        }
    }
    ValidationError::new("payload", errors.to_string())
}

/// Stored student record.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: i64,
    #[serde(default)]
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "CGPA")]
    pub cgpa: i64,
}

/// Create payload: no id/created_at, those are assigned server-side.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StudentInput {
    pub name: String,
    pub email: String,
    pub age: i64,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(rename = "CGPA")]
    pub cgpa: i64,
}

/// Update payload. Keys left out of the JSON object stay `Patch::Unset`.
///
/// `id` and `created_at` are not part of the payload, so they can never change.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct StudentPatch {
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub email: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub age: Patch<i64>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub department: Patch<String>,
    #[serde(rename = "CGPA", default, skip_serializing_if = "Patch::is_unset")]
    pub cgpa: Patch<i64>,
}

/// Email addresses are stored trimmed and compared case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_string()
}

pub fn same_email(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

impl StudentInput {
    /// Check every field; the first violation wins.
    pub fn validate(&self) -> Result<(), ValidationError> {
        FieldCheck {
            name: Some(visible(&self.name)),
            email: Some(normalize_email(&self.email)),
            age: Some(self.age),
            cgpa: Some(self.cgpa),
        }
        .run()
    }

    /// Turn a validated payload into a record.
    pub fn into_student(self, id: Uuid, created_at: DateTime<Utc>) -> Result<Student, ValidationError> {
        self.validate()?;
        Ok(Student {
            id,
            name: self.name,
            email: normalize_email(&self.email),
            age: self.age,
            department: self.department,
            created_at,
            cgpa: self.cgpa,
        })
    }
}

impl StudentPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_unset()
            && self.email.is_unset()
            && self.age.is_unset()
            && self.department.is_unset()
            && self.cgpa.is_unset()
    }

    /// Email carried by the patch, if one is being set.
    pub fn email(&self) -> Option<&str> {
        self.email.as_set().map(|e| e.as_str())
    }

    /// Check the supplied fields only; unset fields are not inspected.
    /// `null` is only accepted for `department`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let nulls = [
            ("name", self.name.is_null()),
            ("email", self.email.is_null()),
            ("age", self.age.is_null()),
            ("CGPA", self.cgpa.is_null()),
        ];
        let check = FieldCheck {
            name: self.name.as_set().map(|n| visible(n)),
            email: self.email.as_set().map(|e| normalize_email(e)),
            age: self.age.as_set().copied(),
            cgpa: self.cgpa.as_set().copied(),
        };
        let found = check.run().err();
        for (field, is_null) in nulls {
            if is_null {
                return Err(ValidationError::new(field, "must not be null"));
            }
            if let Some(err) = found.as_ref().filter(|e| e.field == field) {
                return Err(err.clone());
            }
        }
        Ok(())
    }
}

impl Student {
    /// Validate the whole patch, then copy its set fields onto `self`.
    /// On error the record is left untouched.
    pub fn apply(&mut self, patch: StudentPatch) -> Result<(), ValidationError> {
        patch.validate()?;
        let StudentPatch { name, email, age, department, cgpa } = patch;
        if let Some(name) = name.into_required("name")? {
            self.name = name;
        }
        if let Some(email) = email.into_required("email")? {
            self.email = normalize_email(&email);
        }
        if let Some(age) = age.into_required("age")? {
            self.age = age;
        }
        if let Some(department) = department.into_nullable() {
            self.department = department;
        }
        if let Some(cgpa) = cgpa.into_required("CGPA")? {
            self.cgpa = cgpa;
        }
        Ok(())
    }
}
