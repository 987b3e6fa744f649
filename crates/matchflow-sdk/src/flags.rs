//! Per-call options for engine operations.

/// Options applied to a single engine call.
///
/// Replaces vendor flag bitmasks with an explicit struct; today the only
/// knob is whether the engine should return its enriched "with info"
/// response describing the entities the call affected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallFlags {
    pub with_info: bool,
}

impl CallFlags {
    /// Request the enriched with-info response.
    #[must_use]
    pub fn with_info() -> Self {
        Self { with_info: true }
    }
}
