#![forbid(unsafe_code)]

use tf_core::RecordId;
use tf_storage::StoreError;

/// What the services hand back to callers.
///
/// Storage failures are surfaced, never retried here; retry policy
/// belongs to the caller.
#[derive(Debug)]
pub enum ServiceError {
    NotFound(&'static str),
    Validation(&'static str),
    HeadMoved {
        expected: RecordId,
        actual: Option<RecordId>,
    },
    Storage(StoreError),
}

impl ServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "INVALID_INPUT",
            Self::HeadMoved { .. } => "HEAD_MOVED",
            Self::Storage(_) => "STORAGE",
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(what) => write!(f, "not found: {what}"),
            Self::Validation(message) => write!(f, "invalid input: {message}"),
            Self::HeadMoved { expected, actual } => match actual {
                Some(actual) => write!(f, "head moved (expected={expected}, actual={actual})"),
                None => write!(f, "head moved (expected={expected}, branch is empty)"),
            },
            Self::Storage(err) => write!(f, "storage: {err}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Storage(value)
    }
}
