//! Errors of the reference simulation.

use lockstep_snapshot::SnapshotError;

/// Errors produced while creating, saving or loading a [`Game`](crate::game::Game).
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The settings are outside their documented ranges.
    #[error("invalid game settings: {0}")]
    InvalidSettings(String),

    /// Settings JSON could not be parsed.
    #[error("failed to parse game settings: {0}")]
    SettingsJson(#[from] serde_json::Error),

    /// Encoding or decoding the snapshot failed.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// A restored object does not fit where the world or a player expected it.
    #[error("restored {what} {id} has the wrong type")]
    UnexpectedObject { what: &'static str, id: u32 },
}

/// Result alias used throughout the crate.
pub type Result<T, E = SimError> = std::result::Result<T, E>;
