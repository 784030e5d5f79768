use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    NotFound,
    Duplicate,
    InvalidState,
    MalformedImport,
    Cancelled,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code:?}: {message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }

    pub fn malformed_import(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedImport, message)
    }

    /// Errors the user can fix by re-entering input.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::Validation | ErrorCode::Duplicate | ErrorCode::MalformedImport
        )
    }
}
