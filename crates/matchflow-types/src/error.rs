//! Structured error model for resolution engine operations.
//!
//! [`EngineError`] carries a category, a stable code, and a retryability
//! flag. Construct via category-specific factory methods.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad classification of an engine error.
///
/// Determines how the work pump treats a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed or unparseable record payload.
    BadInput,
    /// Referenced record or entity does not exist.
    NotFound,
    /// Engine call timed out (retryable).
    Timeout,
    /// Transient repository error, e.g. lock contention (retryable).
    DatabaseTransient,
    /// Invalid or missing engine configuration.
    Configuration,
    /// License restriction violated.
    License,
    /// Unrecoverable engine fault.
    Unrecoverable,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::BadInput => "bad_input",
            Self::NotFound => "not_found",
            Self::Timeout => "timeout",
            Self::DatabaseTransient => "database_transient",
            Self::Configuration => "configuration",
            Self::License => "license",
            Self::Unrecoverable => "unrecoverable",
        };
        f.write_str(s)
    }
}

/// How the work pump should treat a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// The payload itself is bad: count it, log at ERROR, move on.
    MalformedInput,
    /// Transient condition: count it, log at WARN, move on.
    Retryable,
    /// The engine is in trouble: stop taking new work and surface the error.
    Fatal,
}

/// Structured error from a resolution engine operation.
///
/// Carries classification and an optional diagnostic detail blob.
/// Construct via category-specific factory methods (e.g.
/// [`EngineError::bad_input`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("[{category}] {code}: {message}")]
pub struct EngineError {
    pub category: ErrorCategory,
    pub code: String,
    pub message: String,
    pub retryable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl EngineError {
    fn new(
        category: ErrorCategory,
        retryable: bool,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            code: code.into(),
            message: message.into(),
            retryable,
            details: None,
        }
    }

    /// Malformed record payload (not retryable, skippable).
    #[must_use]
    pub fn bad_input(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::BadInput, false, code, message)
    }

    /// Missing record or entity (not retryable, skippable).
    #[must_use]
    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::NotFound, false, code, message)
    }

    /// Engine call timeout (retryable).
    #[must_use]
    pub fn timeout(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Timeout, true, code, message)
    }

    /// Transient repository error (retryable).
    #[must_use]
    pub fn database_transient(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::DatabaseTransient, true, code, message)
    }

    /// Configuration error (fatal).
    #[must_use]
    pub fn configuration(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Configuration, false, code, message)
    }

    /// License restriction (fatal).
    #[must_use]
    pub fn license(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::License, false, code, message)
    }

    /// Unrecoverable engine fault (fatal).
    #[must_use]
    pub fn unrecoverable(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Unrecoverable, false, code, message)
    }

    /// Attach structured diagnostic details.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// How the work pump should treat this error.
    ///
    /// Input-shaped problems are skippable, transient problems are
    /// retryable, everything else halts intake.
    #[must_use]
    pub fn disposition(&self) -> Disposition {
        match self.category {
            ErrorCategory::BadInput | ErrorCategory::NotFound => Disposition::MalformedInput,
            _ if self.retryable => Disposition::Retryable,
            _ => Disposition::Fatal,
        }
    }
}
