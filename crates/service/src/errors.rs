use models::ValidationError;
use thiserror::Error;

/// Tag for every failure the record service can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    BadRequest,
    Storage,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::Storage => "storage",
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Validation(_) => ErrorKind::Validation,
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::Conflict(_) => ErrorKind::Conflict,
            ServiceError::BadRequest(_) => ErrorKind::BadRequest,
            ServiceError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Message without the kind prefix, for response bodies.
    pub fn detail(&self) -> String {
        match self {
            ServiceError::Validation(e) => e.to_string(),
            ServiceError::NotFound(m)
            | ServiceError::Conflict(m)
            | ServiceError::BadRequest(m)
            | ServiceError::Storage(m) => m.clone(),
        }
    }

    /// Offending field for validation failures.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ServiceError::Validation(e) => Some(e.field),
            _ => None,
        }
    }
}
