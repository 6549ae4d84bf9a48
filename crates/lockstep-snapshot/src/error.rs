//! Error types for snapshot and restore passes.
//!
//! Every variant is fatal for the session that raised it: nothing is retried
//! or recovered locally, and the caller must discard the partially written
//! buffer or the partially restored population.

use lockstep_stream::StreamError;

use crate::ids::{EventId, ObjectId};

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Coarse classification of a [`SnapshotError`].
///
/// Callers decide user-facing behaviour by kind: a `Format` or
/// `SafetyCodeMismatch` usually means a corrupt save file, a `CountMismatch`
/// means the simulation itself is out of sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or garbled header, unsupported version, an unreadable field,
    /// or payloads nested past the configured depth.
    Format,
    /// A type tag outside the closed set of constructible shapes.
    UnknownTypeTag,
    /// A reconstructed object or event failed its checksum.
    SafetyCodeMismatch,
    /// Serialized and live populations disagree.
    CountMismatch,
    /// An id outside the allocated range, a dangling reference, or an object
    /// left half-constructed.
    RegistryInvariant,
    /// The pass could not be started, e.g. its thread failed to spawn.
    Resource,
}

/// Which population a count or checksum refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Object,
    Event,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Object => f.write_str("object"),
            RecordKind::Event => f.write_str("event"),
        }
    }
}

// ---------------------------------------------------------------------------
// SnapshotError
// ---------------------------------------------------------------------------

/// Errors produced while writing or reading a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The stream does not start with the snapshot magic.
    #[error("invalid file format: expected magic {expected:?}, found {found:?}")]
    BadMagic {
        expected: [u8; 4],
        found: [u8; 4],
    },

    /// The stored format version is not one this build can read.
    #[error("unsupported snapshot format version {found} (supported: {min}..={max})")]
    UnsupportedVersion { found: u32, min: u32, max: u32 },

    /// A primitive could not be read from the stream.
    #[error("unreadable snapshot data: {0}")]
    Stream(#[from] StreamError),

    /// An object type tag that no constructor exists for.
    #[error("invalid object type tag {tag} for {id} found")]
    UnknownTypeTag { tag: u16, id: u32 },

    /// A fog-of-war tag outside the closed variant set.
    #[error("invalid fog-of-war object type tag {0}")]
    UnknownFowType(u8),

    /// The checksum after a reconstructed object or event is wrong.
    #[error("invalid safety code after loading {kind} {id}: expected {expected:#06x}, found {found:#06x}")]
    SafetyCodeMismatch {
        kind: RecordKind,
        id: u32,
        expected: u16,
        found: u16,
    },

    /// Population counts disagree at the end of a pass.
    #[error("{kind} count mismatch: expected {expected}, got {actual}")]
    CountMismatch {
        kind: RecordKind,
        expected: u32,
        actual: u32,
    },

    /// An id read from the stream lies above the allocated ceiling.
    #[error("{kind} id {id} is out of range. Maximum allowed value: {ceiling}")]
    IdOutOfRange {
        kind: RecordKind,
        id: u32,
        ceiling: u32,
    },

    /// A collaborator referenced an object that is not in the live population.
    #[error("reference to {0} which is not in the live population")]
    DanglingObject(ObjectId),

    /// A collaborator referenced an event that is not scheduled.
    #[error("reference to {0} which is not scheduled")]
    DanglingEvent(EventId),

    /// The read pass ended with objects whose payload was never completed.
    #[error("{count} objects were still under construction when the session closed")]
    PendingObjects { count: usize },

    /// More payloads were open at once than the session allows.
    #[error("{kind} {id} nests deeper than {limit} levels")]
    NestingTooDeep {
        kind: RecordKind,
        id: u32,
        limit: usize,
    },

    /// The thread running the pass could not be spawned.
    #[error("failed to start snapshot thread: {0}")]
    SpawnThread(#[source] std::io::Error),
}

impl SnapshotError {
    /// The coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SnapshotError::BadMagic { .. }
            | SnapshotError::UnsupportedVersion { .. }
            | SnapshotError::Stream(_)
            | SnapshotError::NestingTooDeep { .. } => ErrorKind::Format,
            SnapshotError::UnknownTypeTag { .. } | SnapshotError::UnknownFowType(_) => {
                ErrorKind::UnknownTypeTag
            }
            SnapshotError::SafetyCodeMismatch { .. } => ErrorKind::SafetyCodeMismatch,
            SnapshotError::CountMismatch { .. } => ErrorKind::CountMismatch,
            SnapshotError::IdOutOfRange { .. }
            | SnapshotError::DanglingObject(_)
            | SnapshotError::DanglingEvent(_)
            | SnapshotError::PendingObjects { .. } => ErrorKind::RegistryInvariant,
            SnapshotError::SpawnThread(_) => ErrorKind::Resource,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = SnapshotError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_errors_are_format_errors() {
        let err: SnapshotError = StreamError::UnexpectedEof {
            offset: 10,
            needed: 4,
            remaining: 1,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(err.to_string().contains("offset 10"));
    }

    #[test]
    fn safety_code_message_is_hex() {
        let err = SnapshotError::SafetyCodeMismatch {
            kind: RecordKind::Object,
            id: 7,
            expected: 0xffc8,
            found: 0x0001,
        };
        assert_eq!(
            err.to_string(),
            "invalid safety code after loading object 7: expected 0xffc8, found 0x0001"
        );
        assert_eq!(err.kind(), ErrorKind::SafetyCodeMismatch);
    }

    #[test]
    fn kinds_cover_registry_violations() {
        let err = SnapshotError::IdOutOfRange {
            kind: RecordKind::Event,
            id: 90,
            ceiling: 12,
        };
        assert_eq!(err.kind(), ErrorKind::RegistryInvariant);
        assert_eq!(
            SnapshotError::PendingObjects { count: 2 }.kind(),
            ErrorKind::RegistryInvariant
        );
    }

    #[test]
    fn deep_nesting_is_a_format_error() {
        let err = SnapshotError::NestingTooDeep {
            kind: RecordKind::Object,
            id: 4001,
            limit: 4000,
        };
        assert_eq!(err.kind(), ErrorKind::Format);
        assert_eq!(err.to_string(), "object 4001 nests deeper than 4000 levels");
    }
}
