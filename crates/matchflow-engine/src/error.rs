//! Pump error model.

use matchflow_types::EngineError;

/// Categorized pump error.
///
/// `Engine` wraps a typed [`EngineError`] surfaced as fatal by the pump.
/// `Infrastructure` wraps opaque host-side errors (file I/O, channel
/// failures, panicked worker tasks) that have nothing to do with the
/// engine.
#[derive(Debug)]
pub enum PumpError {
    /// Fatal engine error that halted intake.
    Engine(EngineError),
    /// Host-side error (I/O, channels, task join).
    Infrastructure(anyhow::Error),
}

impl std::fmt::Display for PumpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Engine(e) => write!(f, "{}", e),
            Self::Infrastructure(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for PumpError {}

impl From<anyhow::Error> for PumpError {
    fn from(e: anyhow::Error) -> Self {
        Self::Infrastructure(e)
    }
}

impl PumpError {
    /// Returns the typed engine error if this is an `Engine` variant.
    pub fn as_engine_error(&self) -> Option<&EngineError> {
        match self {
            Self::Engine(e) => Some(e),
            Self::Infrastructure(_) => None,
        }
    }
}
