//! Session configuration.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SnapshotConfig
// ---------------------------------------------------------------------------

/// Options for a snapshot or restore pass.
///
/// Deserializable so tools can load it from JSON alongside their other
/// settings; missing fields take their defaults.
///
/// ```
/// use lockstep_snapshot::config::DEFAULT_MAX_DEPTH;
/// use lockstep_snapshot::SnapshotConfig;
///
/// let config: SnapshotConfig = serde_json::from_str(r#"{ "debug_mode": true }"#).unwrap();
/// assert!(config.debug_mode);
/// assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
/// assert!(!SnapshotConfig::default().debug_mode);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Emit a `trace` event with the stream offset at the start and end of
    /// every object, event and player. Used to locate the first byte where
    /// two diverging snapshots differ.
    pub debug_mode: bool,

    /// How many payloads may be open at once. Each first reference to an
    /// object or event is read or written in place, so a chain of references
    /// nests one level per link. Deeper graphs fail with
    /// [`SnapshotError::NestingTooDeep`](crate::SnapshotError::NestingTooDeep).
    ///
    /// Must fit the stack of the pass thread, see
    /// [`PASS_STACK_SIZE`](crate::snapshot::PASS_STACK_SIZE).
    pub max_depth: usize,
}

/// Default nesting limit of a pass.
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            debug_mode: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl SnapshotConfig {
    /// A config with offset tracing enabled.
    pub fn debug() -> Self {
        Self {
            debug_mode: true,
            ..Self::default()
        }
    }
}
