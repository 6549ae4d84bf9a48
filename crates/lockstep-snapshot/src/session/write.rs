//! The serialize side of a session.

use lockstep_stream::{StreamWriter, WireEnum};

use crate::config::SnapshotConfig;
use crate::error::{RecordKind, Result, SnapshotError};
use crate::event::GameEvent;
use crate::fow::FowObject;
use crate::ids::{EventId, ObjectId};
use crate::object::{EventLookup, GameObject, ObjectLookup};
use crate::registry::WriteRegistry;
use crate::snapshot::{CURRENT_FORMAT_VERSION, SNAPSHOT_MAGIC};

use super::read::nesting_too_deep;
use super::{event_safety_code, object_safety_code};

/// One serialize pass.
///
/// Created by [`begin`](Self::begin), which writes the snapshot header.
/// Collaborators push their state through it; [`into_bytes`](Self::into_bytes)
/// consumes the session and returns the finished buffer. Always writes the
/// current format version.
pub struct WriteSession<'a> {
    out: StreamWriter,
    objects: &'a dyn ObjectLookup,
    events: &'a dyn EventLookup,
    registry: WriteRegistry,
    object_ceiling: u32,
    event_ceiling: u32,
    debug_mode: bool,
    depth: usize,
    max_depth: usize,
}

impl<'a> WriteSession<'a> {
    /// Start a pass: reset the registry and write magic and version.
    ///
    /// The id ceilings are captured now; objects allocated after this point
    /// are not part of the snapshot.
    pub fn begin(
        objects: &'a dyn ObjectLookup,
        events: &'a dyn EventLookup,
        config: &SnapshotConfig,
    ) -> Self {
        let mut out = StreamWriter::new();
        out.push_raw(&SNAPSHOT_MAGIC);
        out.push_u32(CURRENT_FORMAT_VERSION);
        Self {
            out,
            objects,
            events,
            registry: WriteRegistry::new(),
            object_ceiling: objects.object_id_ceiling(),
            event_ceiling: events.event_id_ceiling(),
            debug_mode: config.debug_mode,
            depth: 0,
            max_depth: config.max_depth,
        }
    }

    /// A session without header, for encoding standalone payloads.
    pub fn headerless(
        objects: &'a dyn ObjectLookup,
        events: &'a dyn EventLookup,
        config: &SnapshotConfig,
    ) -> Self {
        Self {
            out: StreamWriter::new(),
            objects,
            events,
            registry: WriteRegistry::new(),
            object_ceiling: objects.object_id_ceiling(),
            event_ceiling: events.event_id_ceiling(),
            debug_mode: config.debug_mode,
            depth: 0,
            max_depth: config.max_depth,
        }
    }

    /// Format version being written.
    pub fn data_version(&self) -> u32 {
        CURRENT_FORMAT_VERSION
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// The bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        self.out.as_bytes()
    }

    /// Number of distinct objects whose payload has been written.
    pub fn written_object_count(&self) -> usize {
        self.registry.object_count()
    }

    /// Number of distinct events whose payload has been written.
    pub fn written_event_count(&self) -> usize {
        self.registry.event_count()
    }

    /// Object id ceiling captured at [`begin`](Self::begin).
    pub fn object_id_ceiling(&self) -> u32 {
        self.object_ceiling
    }

    /// Event id ceiling captured at [`begin`](Self::begin).
    pub fn event_id_ceiling(&self) -> u32 {
        self.event_ceiling
    }

    /// Consume the session and return the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.out.into_bytes()
    }

    // -----------------------------------------------------------------------
    // Primitives
    // -----------------------------------------------------------------------

    pub fn push_u8(&mut self, value: u8) {
        self.out.push_u8(value);
    }

    pub fn push_u16(&mut self, value: u16) {
        self.out.push_u16(value);
    }

    pub fn push_u32(&mut self, value: u32) {
        self.out.push_u32(value);
    }

    pub fn push_i32(&mut self, value: i32) {
        self.out.push_i32(value);
    }

    pub fn push_bool(&mut self, value: bool) {
        self.out.push_bool(value);
    }

    pub fn push_raw(&mut self, data: &[u8]) {
        self.out.push_raw(data);
    }

    pub fn push_string(&mut self, value: &str) {
        self.out.push_string(value);
    }

    /// Number of elements of a container that follows.
    pub fn push_container_size(&mut self, len: usize) {
        debug_assert!(len <= u32::MAX as usize, "container of {len} elements");
        self.out.push_var_size(len as u32);
    }

    pub fn push_enum8<E: WireEnum>(&mut self, value: E) {
        self.out.push_enum8(value);
    }

    pub fn push_enum16<E: WireEnum>(&mut self, value: E) {
        self.out.push_enum16(value);
    }

    // -----------------------------------------------------------------------
    // Entity channel
    // -----------------------------------------------------------------------

    /// Write an object reference, and the object itself on first sight.
    ///
    /// With `known_type` the reader already knows the shape from context and
    /// the tag is omitted.
    pub fn put_object(&mut self, object: Option<&dyn GameObject>, known_type: bool) -> Result<()> {
        let Some(object) = object else {
            self.out.push_u32(0);
            return Ok(());
        };
        let id = object.id();
        if self.substitute_out_of_range(id) {
            return Ok(());
        }

        self.out.push_u32(id.get());
        if self.registry.is_object_written(id) {
            if self.debug_mode {
                tracing::trace!(%id, "saved known object");
            }
            return Ok(());
        }
        self.enter_payload(RecordKind::Object, id.get())?;
        self.registry.mark_object_written(id);

        let object_type = object.object_type();
        if !known_type {
            self.out.push_enum16(object_type);
        }
        if self.debug_mode {
            self.trace_offset("start serializing object", id.get());
        }
        let written = object.serialize(self);
        self.depth -= 1;
        written?;
        if self.debug_mode {
            self.trace_offset("done serializing object", id.get());
        }
        self.out.push_u16(object_safety_code(object_type, id));
        Ok(())
    }

    /// Write a reference held by id, resolving it against the live
    /// population.
    ///
    /// An id that resolves to nothing is a [`SnapshotError::DanglingObject`].
    pub fn put_object_ref(&mut self, id: Option<ObjectId>, known_type: bool) -> Result<()> {
        let Some(id) = id else {
            self.out.push_u32(0);
            return Ok(());
        };
        if self.substitute_out_of_range(id) {
            return Ok(());
        }
        let objects = self.objects;
        let object = objects
            .object(id)
            .ok_or(SnapshotError::DanglingObject(id))?;
        self.put_object(Some(object), known_type)
    }

    /// Write each reference of a list, prefixed by its length.
    pub fn put_object_refs(&mut self, ids: &[ObjectId], known_type: bool) -> Result<()> {
        self.push_container_size(ids.len());
        for &id in ids {
            self.put_object_ref(Some(id), known_type)?;
        }
        Ok(())
    }

    /// Ids above the ceiling are written as null; the save goes on.
    fn substitute_out_of_range(&mut self, id: ObjectId) -> bool {
        if id.get() <= self.object_ceiling {
            return false;
        }
        tracing::warn!(
            %id,
            ceiling = self.object_ceiling,
            "object id out of range while saving, writing null reference instead"
        );
        self.out.push_u32(0);
        true
    }

    // -----------------------------------------------------------------------
    // Event channel
    // -----------------------------------------------------------------------

    /// Write an event reference, and the event itself on first sight.
    pub fn put_event(&mut self, event: Option<&GameEvent>) -> Result<()> {
        let Some(event) = event else {
            self.out.push_u32(0);
            return Ok(());
        };
        let id = event.id;
        debug_assert!(
            id.get() <= self.event_ceiling,
            "{id} above the event id ceiling {}",
            self.event_ceiling
        );

        self.out.push_u32(id.get());
        if self.registry.is_event_written(id) {
            return Ok(());
        }
        self.enter_payload(RecordKind::Event, id.get())?;
        self.registry.mark_event_written(id);

        if self.debug_mode {
            self.trace_offset("start serializing event", id.get());
        }
        let written = event.serialize(self);
        self.depth -= 1;
        written?;
        if self.debug_mode {
            self.trace_offset("done serializing event", id.get());
        }
        self.out.push_u16(event_safety_code(id));
        Ok(())
    }

    /// Write an event held by id, resolving it against the scheduler.
    pub fn put_event_ref(&mut self, id: Option<EventId>) -> Result<()> {
        let Some(id) = id else {
            self.out.push_u32(0);
            return Ok(());
        };
        let events = self.events;
        let event = events.event(id).ok_or(SnapshotError::DanglingEvent(id))?;
        self.put_event(Some(event))
    }

    // -----------------------------------------------------------------------
    // Nesting
    // -----------------------------------------------------------------------

    /// Open one more payload, failing once `max_depth` payloads are open.
    /// Uses the same limit as the read side, so whatever saves also loads.
    fn enter_payload(&mut self, kind: RecordKind, id: u32) -> Result<()> {
        if self.depth >= self.max_depth {
            return Err(nesting_too_deep(kind, id, self.max_depth));
        }
        self.depth += 1;
        Ok(())
    }

    /// Payloads currently open.
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline(never)]
    fn trace_offset(&self, message: &'static str, id: u32) {
        tracing::trace!(id, depth = self.depth, offset = self.out.len(), "{message}");
    }

    // -----------------------------------------------------------------------
    // Fog-of-war channel
    // -----------------------------------------------------------------------

    /// Write a fog-of-war memory: a one byte tag, then the variant fields.
    pub fn put_fow(&mut self, fow: Option<&FowObject>) {
        let Some(fow) = fow else {
            self.out.push_u8(0);
            return;
        };
        self.out.push_enum8(fow.fow_type());
        match *fow {
            FowObject::Building { building, nation } => {
                self.out.push_u8(building);
                self.out.push_u8(nation);
            }
            FowObject::BuildingSite {
                planing,
                building,
                nation,
                build_progress,
            } => {
                self.out.push_bool(planing);
                self.out.push_u8(building);
                self.out.push_u8(nation);
                self.out.push_u8(build_progress);
            }
            FowObject::Flag { player, flag_type } => {
                self.out.push_u8(player);
                self.out.push_u8(flag_type);
            }
            FowObject::Tree { tree_type, size } => {
                self.out.push_u8(tree_type);
                self.out.push_u8(size);
            }
            FowObject::Granite {
                granite_type,
                state,
            } => {
                self.out.push_u8(granite_type);
                self.out.push_u8(state);
            }
        }
    }
}

impl std::fmt::Debug for WriteSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteSession")
            .field("len", &self.out.len())
            .field("written_objects", &self.registry.object_count())
            .field("written_events", &self.registry.event_count())
            .field("object_ceiling", &self.object_ceiling)
            .field("event_ceiling", &self.event_ceiling)
            .finish()
    }
}
