//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid credential format: a digest must be 32 characters, got {length}")]
    InvalidCredentialFormat { length: usize },

    #[error("Missing field on portal page: {0}")]
    MissingField(String),

    #[error("Malformed value for {label}: {value:?}")]
    MalformedField { label: String, value: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Portal error: {0}")]
    Portal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a missing field error
    pub fn missing_field(label: impl Into<String>) -> Self {
        Self::MissingField(label.into())
    }

    /// Create a malformed field error
    pub fn malformed_field(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::MalformedField {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Create a portal error
    pub fn portal(msg: impl Into<String>) -> Self {
        Self::Portal(msg.into())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (for JSON output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }

    /// Attach a context entry
    pub fn with_context(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.context
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value);
        self
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail(e.to_string()),
        }
    }
}
