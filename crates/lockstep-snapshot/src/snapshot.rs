//! Whole-simulation snapshot and restore.
//!
//! [`make_snapshot`] and [`read_snapshot`] drive one session over the
//! simulation's collaborators in a fixed order and reconcile the population
//! counts at the end. The collaborators are reached through two traits:
//! [`SnapshotSource`] on the write side and [`SnapshotTarget`] on the read
//! side.
//!
//! # Layout
//!
//! ```text
//! magic "VER\0" | version u32 | expected object count u32
//! world | event manager | [economy handler] | player 0 .. player n-1
//! ```
//!
//! The expected object count is the live count at the start of the write
//! pass, including one for the implicit null object.
//!
//! # Format versions
//!
//! | Version | Change |
//! |---|---|
//! | 1 | Initial layout. Container sizes and string lengths are fixed `u32`. |
//! | 2 | Container sizes and string lengths are variable-width. |
//! | 3 | Map decoration objects carry a scheduled event reference. |
//! | 4 | Goods carried by figures are an explicit optional instead of a `0xFF` sentinel. |

use lockstep_stream::StreamReader;
use serde::{Deserialize, Serialize};

use crate::config::SnapshotConfig;
use crate::error::{RecordKind, Result, SnapshotError};
use crate::factory::ObjectFactory;
use crate::ids::ObjectId;
use crate::object::{EventLookup, ObjectLookup};
use crate::object_type::ObjectType;
use crate::registry::RestoredPopulation;
use crate::session::{ReadSession, WriteSession};

/// First four bytes of every snapshot.
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"VER\0";

/// Format version written by this build.
pub const CURRENT_FORMAT_VERSION: u32 = 4;

/// Oldest format version this build can read.
pub const MIN_FORMAT_VERSION: u32 = 1;

/// Stack size of the thread a write or read pass runs on.
///
/// Payloads nest one level per link of a reference chain (flag, road, flag,
/// ...), and the caller's stack is not known. With
/// [`DEFAULT_MAX_DEPTH`](crate::config::DEFAULT_MAX_DEPTH) levels this leaves
/// over 12 KiB per level.
pub const PASS_STACK_SIZE: usize = 128 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// The simulation as seen by a write pass.
pub trait SnapshotSource {
    /// The live object population.
    fn objects(&self) -> &dyn ObjectLookup;

    /// The event scheduler.
    fn events(&self) -> &dyn EventLookup;

    /// Live objects plus one for the null object.
    fn live_object_count(&self) -> u32;

    /// Number of scheduled events.
    fn active_event_count(&self) -> u32;

    /// Whether the economy-mode handler is part of the snapshot.
    fn economy_mode(&self) -> bool;

    /// The economy-mode handler, if one exists.
    fn economy_handler(&self) -> Option<ObjectId>;

    fn player_count(&self) -> usize;

    fn serialize_world(&self, session: &mut WriteSession<'_>) -> Result<()>;

    /// Write the scheduler's state, including every active event.
    fn serialize_events(&self, session: &mut WriteSession<'_>) -> Result<()>;

    fn serialize_player(&self, index: usize, session: &mut WriteSession<'_>) -> Result<()>;
}

/// The simulation as seen by a read pass.
///
/// `deserialize_*` calls store ids only; the objects themselves arrive in
/// [`adopt`](Self::adopt) once the whole stream has been read.
pub trait SnapshotTarget {
    /// Whether an economy-mode handler follows the event manager.
    fn economy_mode(&self) -> bool;

    fn player_count(&self) -> usize;

    /// Read the world. Also restores the id ceilings into the session.
    fn deserialize_world(&mut self, session: &mut ReadSession<'_>) -> Result<()>;

    fn deserialize_events(&mut self, session: &mut ReadSession<'_>) -> Result<()>;

    fn set_economy_handler(&mut self, handler: Option<ObjectId>);

    fn deserialize_player(&mut self, index: usize, session: &mut ReadSession<'_>) -> Result<()>;

    /// Take ownership of every reconstructed object and event.
    fn adopt(&mut self, population: RestoredPopulation) -> Result<()>;

    /// Live objects plus one for the null object, after [`adopt`](Self::adopt).
    fn live_object_count(&self) -> u32;

    /// Scheduled events, after [`adopt`](Self::adopt).
    fn active_event_count(&self) -> u32;
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Header fields of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub format_version: u32,
    /// Live object count at capture, including the null object.
    pub expected_objects: u32,
}

/// An encoded simulation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    bytes: Vec<u8>,
    header: SnapshotHeader,
    written_objects: u32,
    written_events: u32,
}

impl Snapshot {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn header(&self) -> SnapshotHeader {
        self.header
    }

    /// Encoded size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// BLAKE3 hex digest (64 lowercase hex chars) of the encoded bytes.
    ///
    /// Two simulations in lockstep produce identical snapshots, so equal
    /// hashes are the cheap way to compare peers.
    pub fn state_hash(&self) -> String {
        state_hash(&self.bytes)
    }

    /// Diagnostics for logs and tooling.
    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            format_version: self.header.format_version,
            expected_objects: self.header.expected_objects,
            objects: self.written_objects,
            events: self.written_events,
            bytes: self.bytes.len(),
            state_hash: self.state_hash(),
        }
    }
}

/// BLAKE3 hex digest of an encoded snapshot.
pub fn state_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Serializable overview of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub format_version: u32,
    pub expected_objects: u32,
    /// Objects written in full.
    pub objects: u32,
    /// Events written in full.
    pub events: u32,
    pub bytes: usize,
    pub state_hash: String,
}

impl SnapshotSummary {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Validate magic and version and read the expected object count, without
/// restoring anything.
pub fn peek_header(bytes: &[u8]) -> Result<SnapshotHeader> {
    let mut input = StreamReader::new(bytes);
    let format_version = crate::session::read_header(&mut input)?;
    let expected_objects = input.pop_u32()?;
    Ok(SnapshotHeader {
        format_version,
        expected_objects,
    })
}

// ---------------------------------------------------------------------------
// Write pass
// ---------------------------------------------------------------------------

/// Encode the complete state of `source`.
///
/// Fails with [`SnapshotError::CountMismatch`] if the collaborators did not
/// write every live object and every active event exactly once.
pub fn make_snapshot<S>(source: &S, config: &SnapshotConfig) -> Result<Snapshot>
where
    S: SnapshotSource + Sync + ?Sized,
{
    on_pass_thread("snapshot-write", || write_pass(source, config))
}

fn write_pass<S>(source: &S, config: &SnapshotConfig) -> Result<Snapshot>
where
    S: SnapshotSource + ?Sized,
{
    let mut session = WriteSession::begin(source.objects(), source.events(), config);

    let expected_objects = source.live_object_count();
    session.push_u32(expected_objects);

    source.serialize_world(&mut session)?;
    source.serialize_events(&mut session)?;
    if source.economy_mode() {
        session.put_object_ref(source.economy_handler(), true)?;
    }
    for index in 0..source.player_count() {
        if config.debug_mode {
            tracing::trace!(player = index, offset = session.len(), "start serializing player");
        }
        source.serialize_player(index, &mut session)?;
        if config.debug_mode {
            tracing::trace!(player = index, offset = session.len(), "done serializing player");
        }
    }

    let written_events = session.written_event_count() as u32;
    let active_events = source.active_event_count();
    if written_events != active_events {
        tracing::error!(expected = active_events, written = written_events, "event count mismatch while saving");
        return Err(SnapshotError::CountMismatch {
            kind: RecordKind::Event,
            expected: active_events,
            actual: written_events,
        });
    }
    // Plus one for the null object, which is never written.
    let written_objects = session.written_object_count() as u32;
    if expected_objects != written_objects + 1 {
        tracing::error!(expected = expected_objects, written = written_objects + 1, "object count mismatch while saving");
        return Err(SnapshotError::CountMismatch {
            kind: RecordKind::Object,
            expected: expected_objects,
            actual: written_objects + 1,
        });
    }

    let bytes = session.into_bytes();
    tracing::debug!(
        bytes = bytes.len(),
        objects = written_objects,
        events = written_events,
        "snapshot written"
    );
    Ok(Snapshot {
        bytes,
        header: SnapshotHeader {
            format_version: CURRENT_FORMAT_VERSION,
            expected_objects,
        },
        written_objects,
        written_events,
    })
}

// ---------------------------------------------------------------------------
// Read pass
// ---------------------------------------------------------------------------

/// Restore `target` from `bytes`.
///
/// On error the target may hold a partial state and must be discarded or
/// reset by the caller.
pub fn read_snapshot<T>(
    bytes: &[u8],
    target: &mut T,
    factory: &ObjectFactory,
    config: &SnapshotConfig,
) -> Result<SnapshotHeader>
where
    T: SnapshotTarget + Send + ?Sized,
{
    on_pass_thread("snapshot-read", || read_pass(bytes, target, factory, config))
}

fn read_pass<T>(
    bytes: &[u8],
    target: &mut T,
    factory: &ObjectFactory,
    config: &SnapshotConfig,
) -> Result<SnapshotHeader>
where
    T: SnapshotTarget + ?Sized,
{
    let mut session = ReadSession::begin(bytes, factory, config)?;
    let format_version = session.data_version();
    let expected_objects = session.pop_u32()?;

    target.deserialize_world(&mut session)?;
    target.deserialize_events(&mut session)?;
    if target.economy_mode() {
        let handler = session.get_object_as(ObjectType::EconomyModeHandler)?;
        target.set_economy_handler(handler);
    }
    for index in 0..target.player_count() {
        if config.debug_mode {
            tracing::trace!(player = index, offset = session.position(), "start loading player");
        }
        target.deserialize_player(index, &mut session)?;
        if config.debug_mode {
            tracing::trace!(player = index, offset = session.position(), "done loading player");
        }
    }

    if !session.is_exhausted() {
        tracing::warn!(offset = session.position(), total = bytes.len(), "trailing bytes after snapshot");
    }
    let read_objects = session.read_object_count() as u32;
    let read_events = session.read_event_count() as u32;
    target.adopt(session.finish()?)?;

    let active_events = target.active_event_count();
    if read_events != active_events {
        tracing::error!(expected = active_events, read = read_events, "event count mismatch while loading");
        return Err(SnapshotError::CountMismatch {
            kind: RecordKind::Event,
            expected: active_events,
            actual: read_events,
        });
    }
    let live_objects = target.live_object_count();
    if expected_objects != live_objects {
        tracing::error!(expected = expected_objects, existing = live_objects, "object count mismatch while loading");
        return Err(SnapshotError::CountMismatch {
            kind: RecordKind::Object,
            expected: expected_objects,
            actual: live_objects,
        });
    }
    if expected_objects != read_objects + 1 {
        tracing::error!(expected = expected_objects, read = read_objects + 1, "object count mismatch while loading");
        return Err(SnapshotError::CountMismatch {
            kind: RecordKind::Object,
            expected: expected_objects,
            actual: read_objects + 1,
        });
    }

    tracing::debug!(
        version = format_version,
        objects = read_objects,
        events = read_events,
        "snapshot restored"
    );
    Ok(SnapshotHeader {
        format_version,
        expected_objects,
    })
}

// ---------------------------------------------------------------------------
// Pass thread
// ---------------------------------------------------------------------------

/// Run `pass` on a scoped thread with [`PASS_STACK_SIZE`] bytes of stack.
///
/// The caller's tracing dispatcher and current span carry over, and a panic
/// inside the pass resumes on the calling thread.
fn on_pass_thread<R, F>(name: &str, pass: F) -> Result<R>
where
    R: Send,
    F: FnOnce() -> Result<R> + Send,
{
    let dispatch = tracing::dispatcher::get_default(|current| current.clone());
    let span = tracing::Span::current();
    std::thread::scope(|scope| {
        let handle = std::thread::Builder::new()
            .name(name.to_owned())
            .stack_size(PASS_STACK_SIZE)
            .spawn_scoped(scope, move || {
                tracing::dispatcher::with_default(&dispatch, || span.in_scope(pass))
            })
            .map_err(SnapshotError::SpawnThread)?;
        match handle.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    })
}
