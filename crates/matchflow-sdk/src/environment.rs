//! Scoped engine construction.
//!
//! An [`Environment`] owns one engine instance for the life of the caller's
//! scope. There is no process-global factory: construct it, hand out
//! handles, drop it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use matchflow_types::EngineError;

use crate::engine::{ConfigManager, ResolutionEngine};
use crate::memory::MemoryEngine;

/// Engine settings document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Data sources registered at startup.
    pub data_sources: Vec<String>,
}

impl EngineSettings {
    /// Parse a settings JSON document.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error for unparseable documents.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json).map_err(|e| {
            EngineError::configuration("BAD_SETTINGS", format!("settings are not valid JSON: {e}"))
        })
    }
}

/// Owns an engine instance and hands out shared handles to it.
pub struct Environment {
    instance_name: String,
    engine: Arc<MemoryEngine>,
}

impl Environment {
    #[must_use]
    pub fn builder() -> EnvironmentBuilder {
        EnvironmentBuilder::default()
    }

    /// Name this environment was constructed under, for diagnostics.
    #[must_use]
    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    /// Shared handle to the operational engine surface.
    #[must_use]
    pub fn engine(&self) -> Arc<dyn ResolutionEngine> {
        self.engine.clone()
    }

    /// Shared handle to the configuration surface.
    #[must_use]
    pub fn config(&self) -> Arc<dyn ConfigManager> {
        self.engine.clone()
    }

    /// The embedded reference engine, for tests that need its injection
    /// hooks.
    #[must_use]
    pub fn memory_engine(&self) -> Arc<MemoryEngine> {
        self.engine.clone()
    }
}

#[derive(Default)]
pub struct EnvironmentBuilder {
    instance_name: Option<String>,
    settings: EngineSettings,
}

impl EnvironmentBuilder {
    #[must_use]
    pub fn instance_name(mut self, name: impl Into<String>) -> Self {
        self.instance_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Construct the environment and its engine instance.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error when the settings are unusable.
    pub fn build(self) -> Result<Environment, EngineError> {
        let instance_name = self.instance_name.unwrap_or_else(|| "matchflow".to_string());
        let engine = if self.settings.data_sources.is_empty() {
            MemoryEngine::new()
        } else {
            MemoryEngine::with_data_sources(self.settings.data_sources)
        };
        Ok(Environment {
            instance_name,
            engine: Arc::new(engine),
        })
    }
}
