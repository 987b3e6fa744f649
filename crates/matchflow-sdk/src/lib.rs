//! The resolution engine seam.
//!
//! Vendor entity-resolution engines are closed-source libraries driven over
//! blocking calls. [`ResolutionEngine`] and [`ConfigManager`] define the
//! surface matchflow consumes; [`Environment`] owns construction and
//! teardown; [`MemoryEngine`] is the embedded reference backend used by the
//! CLI and the test suites.

pub mod engine;
pub mod environment;
pub mod flags;
pub mod memory;

pub use engine::{ConfigManager, ResolutionEngine};
pub use environment::{EngineSettings, Environment};
pub use flags::CallFlags;
pub use memory::MemoryEngine;
