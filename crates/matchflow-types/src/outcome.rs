//! Classified result of one unit operation.

use crate::error::{Disposition, EngineError};

/// What happened to a single work item.
///
/// Callers pattern-match on this instead of catching error types; the
/// classification is fixed at the invocation site via
/// [`EngineError::disposition`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The operation succeeded. `info` carries the engine's enriched
    /// response when the call was made with-info.
    Success { info: Option<String> },
    /// The item itself was bad; the run continues without it.
    MalformedInput(EngineError),
    /// A transient engine condition; the run continues without the item.
    Retryable(EngineError),
    /// The engine is unhealthy; no further items should be submitted.
    Fatal(EngineError),
}

impl Outcome {
    /// Classify an engine error into an outcome.
    #[must_use]
    pub fn from_error(err: EngineError) -> Self {
        match err.disposition() {
            Disposition::MalformedInput => Self::MalformedInput(err),
            Disposition::Retryable => Self::Retryable(err),
            Disposition::Fatal => Self::Fatal(err),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl From<Result<Option<String>, EngineError>> for Outcome {
    fn from(result: Result<Option<String>, EngineError>) -> Self {
        match result {
            Ok(info) => Self::Success { info },
            Err(err) => Self::from_error(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_disposition() {
        assert!(matches!(
            Outcome::from_error(EngineError::bad_input("NOT_JSON", "bad payload")),
            Outcome::MalformedInput(_)
        ));
        assert!(matches!(
            Outcome::from_error(EngineError::timeout("ENGINE_TIMEOUT", "timed out")),
            Outcome::Retryable(_)
        ));
        assert!(matches!(
            Outcome::from_error(EngineError::unrecoverable("CORRUPT_REPO", "corrupt")),
            Outcome::Fatal(_)
        ));
    }

    #[test]
    fn from_result_maps_success() {
        let outcome: Outcome = Ok(Some("{\"AFFECTED_ENTITIES\":[]}".to_string())).into();
        assert!(outcome.is_success());

        let outcome: Outcome = Ok(None).into();
        assert_eq!(outcome, Outcome::Success { info: None });
    }
}
