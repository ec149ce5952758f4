//! Crate error types.
//!
//! Every compile-time failure (schema, typing, validation, unsupported
//! option, user-closure binding) and every execution failure surfaces as a
//! [`FrameError`]. The DAG built before the failing call is never touched.

use std::io;
use thiserror::Error;

/// Result type for frame construction, lowering and execution.
pub type FrameResult<T> = Result<T, FrameError>;

/// The kind of a [`FrameError`], independent of its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Schema,
    Type,
    Validation,
    Unsupported,
    Binding,
    Execution,
}

/// Errors raised while building, lowering or executing a frame.
#[derive(Error, Debug)]
pub enum FrameError {
    /// Unknown column, duplicate column names, non-primitive column where a
    /// primitive one is expected.
    #[error("{0}")]
    Schema(String),

    /// Incompatible operand types or a wrong-typed column accessor.
    #[error("{0}")]
    Type(String),

    /// Empty required arguments, mismatched lengths, disallowed casts.
    #[error("{0}")]
    Validation(String),

    /// A surface option that is recognised but not implemented.
    #[error("{0}")]
    Unsupported(String),

    /// A user closure failed while being evaluated against a row.
    #[error("{0}")]
    Binding(String),

    /// No executable inputs, conflicting clients, transport failure.
    #[error("{0}")]
    Execution(String),

    /// HTTP transport error.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed server JSON.
    #[error("failed to decode server response: {0}")]
    Json(#[from] serde_json::Error),

    /// Bad execution server address.
    #[error("invalid server url: {0}")]
    Url(#[from] url::ParseError),

    /// Malformed CSV input.
    #[error("failed to read csv: {0}")]
    Csv(#[from] csv::Error),

    /// Local I/O (result files).
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl FrameError {
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::Type(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Re-wrap an error raised while evaluating a user lambda.
    ///
    /// `function` is the applied function name (`extend`), `argument` the
    /// argument that carried the lambda (`extend_columns`) and `index` its
    /// 0-indexed position in that argument.
    pub fn binding(function: &str, argument: &str, index: usize, source: &FrameError) -> Self {
        Self::Binding(format!(
            "'{function}' function {argument} argument incompatible. \
             Error occurred while evaluating {function} lambda at index {index} (0-indexed). \
             Message: {source}"
        ))
    }

    /// The error kind, used by callers that branch on failure class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Schema(_) => ErrorKind::Schema,
            Self::Type(_) => ErrorKind::Type,
            Self::Validation(_) | Self::Csv(_) => ErrorKind::Validation,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::Binding(_) => ErrorKind::Binding,
            Self::Execution(_) | Self::Http(_) | Self::Json(_) | Self::Url(_) | Self::Io(_) => {
                ErrorKind::Execution
            }
        }
    }
}
