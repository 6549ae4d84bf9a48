//! The deserialize side of a session.

use lockstep_stream::{StreamReader, WireEnum};

use crate::config::SnapshotConfig;
use crate::error::{RecordKind, Result, SnapshotError};
use crate::event::GameEvent;
use crate::factory::ObjectFactory;
use crate::fow::{FowObject, FowType};
use crate::ids::{EventId, ObjectId};
use crate::object::GameObject;
use crate::object_type::ObjectType;
use crate::registry::{ReadRegistry, RestoredPopulation};
use crate::snapshot::{CURRENT_FORMAT_VERSION, MIN_FORMAT_VERSION, SNAPSHOT_MAGIC};

use super::{event_safety_code, object_safety_code};

/// One deserialize pass.
///
/// Created by [`begin`](Self::begin), which validates the header.
/// Collaborators pop their state through it; [`finish`](Self::finish)
/// consumes the session and hands back everything it reconstructed.
///
/// Reads branch on [`data_version`](Self::data_version) for fields whose
/// layout changed between format versions.
pub struct ReadSession<'a> {
    input: StreamReader<'a>,
    factory: &'a ObjectFactory,
    registry: ReadRegistry,
    version: u32,
    object_ceiling: Option<u32>,
    event_ceiling: Option<u32>,
    debug_mode: bool,
    depth: usize,
    max_depth: usize,
}

impl<'a> ReadSession<'a> {
    /// Start a pass: check the magic and the format version.
    pub fn begin(
        bytes: &'a [u8],
        factory: &'a ObjectFactory,
        config: &SnapshotConfig,
    ) -> Result<Self> {
        let mut input = StreamReader::new(bytes);
        let version = read_header(&mut input)?;
        Ok(Self::from_reader(input, factory, version, config))
    }

    /// A session over a headerless payload encoded at `version`.
    ///
    /// # Panics
    ///
    /// Panics if `version` is outside the supported range.
    pub fn with_version(
        bytes: &'a [u8],
        factory: &'a ObjectFactory,
        version: u32,
        config: &SnapshotConfig,
    ) -> Self {
        assert!(
            (MIN_FORMAT_VERSION..=CURRENT_FORMAT_VERSION).contains(&version),
            "format version {version} is not supported"
        );
        Self::from_reader(StreamReader::new(bytes), factory, version, config)
    }

    fn from_reader(
        input: StreamReader<'a>,
        factory: &'a ObjectFactory,
        version: u32,
        config: &SnapshotConfig,
    ) -> Self {
        Self {
            input,
            factory,
            registry: ReadRegistry::new(),
            version,
            object_ceiling: None,
            event_ceiling: None,
            debug_mode: config.debug_mode,
            depth: 0,
            max_depth: config.max_depth,
        }
    }

    /// Format version of the data being read.
    pub fn data_version(&self) -> u32 {
        self.version
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    /// Read offset into the input.
    pub fn position(&self) -> usize {
        self.input.position()
    }

    /// Returns `true` once every input byte has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.input.is_exhausted()
    }

    /// Set the object id ceiling restored from the stream. Until it is set,
    /// object ids are not range checked.
    pub fn set_object_id_ceiling(&mut self, ceiling: u32) {
        self.object_ceiling = Some(ceiling);
    }

    /// Set the event id ceiling restored from the stream.
    pub fn set_event_id_ceiling(&mut self, ceiling: u32) {
        self.event_ceiling = Some(ceiling);
    }

    pub fn object_id_ceiling(&self) -> Option<u32> {
        self.object_ceiling
    }

    pub fn event_id_ceiling(&self) -> Option<u32> {
        self.event_ceiling
    }

    /// Number of distinct objects read so far.
    pub fn read_object_count(&self) -> usize {
        self.registry.object_count()
    }

    /// Number of distinct events read so far.
    pub fn read_event_count(&self) -> usize {
        self.registry.event_count()
    }

    /// A fully reconstructed object. Objects whose payload is still being
    /// read (cycle partners up the call stack) are not returned.
    pub fn object(&self, id: ObjectId) -> Option<&dyn GameObject> {
        self.registry.lookup_object(id)
    }

    /// Typed access to a fully reconstructed object.
    pub fn object_as<T: GameObject>(&self, id: ObjectId) -> Option<&T> {
        self.object(id).and_then(|o| o.downcast_ref::<T>())
    }

    /// The tag of a reconstructed or pending object.
    pub fn object_type(&self, id: ObjectId) -> Option<ObjectType> {
        self.registry.object_type(id)
    }

    /// A fully reconstructed event.
    pub fn event(&self, id: EventId) -> Option<&GameEvent> {
        self.registry.lookup_event(id)
    }

    /// Close the session and hand over the reconstructed population.
    pub fn finish(self) -> Result<RestoredPopulation> {
        self.registry.into_population()
    }

    // -----------------------------------------------------------------------
    // Primitives
    // -----------------------------------------------------------------------

    pub fn pop_u8(&mut self) -> Result<u8> {
        Ok(self.input.pop_u8()?)
    }

    pub fn pop_u16(&mut self) -> Result<u16> {
        Ok(self.input.pop_u16()?)
    }

    pub fn pop_u32(&mut self) -> Result<u32> {
        Ok(self.input.pop_u32()?)
    }

    pub fn pop_i32(&mut self) -> Result<i32> {
        Ok(self.input.pop_i32()?)
    }

    pub fn pop_bool(&mut self) -> Result<bool> {
        Ok(self.input.pop_bool()?)
    }

    pub fn pop_raw(&mut self, len: usize) -> Result<&'a [u8]> {
        Ok(self.input.pop_raw(len)?)
    }

    pub fn pop_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        Ok(self.input.pop_array::<N>()?)
    }

    /// Read a string. Version 1 used a fixed `u32` length prefix.
    pub fn pop_string(&mut self) -> Result<String> {
        if self.version >= 2 {
            Ok(self.input.pop_string()?)
        } else {
            Ok(self.input.pop_long_string()?)
        }
    }

    /// Read a container length. Version 1 used a fixed `u32`.
    pub fn pop_container_size(&mut self) -> Result<usize> {
        let len = if self.version >= 2 {
            self.input.pop_var_size()?
        } else {
            self.input.pop_u32()?
        };
        Ok(len as usize)
    }

    pub fn pop_enum8<E: WireEnum>(&mut self) -> Result<E> {
        Ok(self.input.pop_enum8()?)
    }

    pub fn pop_enum16<E: WireEnum>(&mut self) -> Result<E> {
        Ok(self.input.pop_enum16()?)
    }

    // -----------------------------------------------------------------------
    // Entity channel
    // -----------------------------------------------------------------------

    /// Read an object reference whose tag is in the stream.
    ///
    /// Returns the id of the referenced object, constructing it first if
    /// this is the first reference. `None` is the null reference.
    pub fn get_object(&mut self) -> Result<Option<ObjectId>> {
        self.read_object(None)
    }

    /// Read an object reference written with a known type (no tag).
    pub fn get_object_as(&mut self, object_type: ObjectType) -> Result<Option<ObjectId>> {
        debug_assert!(
            object_type.is_concrete(),
            "{object_type:?} is not a constructible object type"
        );
        self.read_object(Some(object_type))
    }

    /// Read a length-prefixed list of non-null references.
    pub fn get_objects(&mut self) -> Result<Vec<ObjectId>> {
        let len = self.pop_container_size()?;
        let mut ids = Vec::with_capacity(len.min(self.input.remaining() / 4));
        for _ in 0..len {
            if let Some(id) = self.get_object()? {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    /// Read a length-prefixed list of references of a known type.
    pub fn get_objects_as(&mut self, object_type: ObjectType) -> Result<Vec<ObjectId>> {
        let len = self.pop_container_size()?;
        let mut ids = Vec::with_capacity(len.min(self.input.remaining() / 4));
        for _ in 0..len {
            if let Some(id) = self.get_object_as(object_type)? {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    fn read_object(&mut self, known_type: Option<ObjectType>) -> Result<Option<ObjectId>> {
        let raw = self.input.pop_u32()?;
        let Some(id) = ObjectId::new(raw) else {
            return Ok(None);
        };
        if let Some(ceiling) = self.object_ceiling {
            if raw > ceiling {
                return Err(SnapshotError::IdOutOfRange {
                    kind: RecordKind::Object,
                    id: raw,
                    ceiling,
                });
            }
        }
        if self.registry.contains_object(id) {
            return Ok(Some(id));
        }

        let object_type = match known_type {
            Some(ty) => ty,
            None => {
                let tag = self.input.pop_u16()?;
                ObjectType::from_raw(tag)
                    .filter(|ty| ty.is_concrete())
                    .ok_or(SnapshotError::UnknownTypeTag { tag, id: raw })?
            }
        };

        self.enter_payload(RecordKind::Object, raw)?;
        if self.debug_mode {
            self.trace_offset("start loading object", raw);
        }
        self.registry.reserve_object(id, object_type);
        let loaded = self.load_object(id, object_type);
        self.depth -= 1;
        match loaded {
            Ok(object) => {
                if self.debug_mode {
                    self.trace_offset("done loading object", raw);
                }
                self.registry.record_object(object);
                Ok(Some(id))
            }
            Err(e) => {
                self.registry.discard_object(id);
                Err(e)
            }
        }
    }

    /// Construct one object and check the safety code that follows it.
    #[inline(never)]
    fn load_object(
        &mut self,
        id: ObjectId,
        object_type: ObjectType,
    ) -> Result<Box<dyn GameObject>> {
        let factory = self.factory;
        let object = factory.create(self, object_type, id)?;
        let found = self.input.pop_u16()?;
        let expected = object_safety_code(object_type, id);
        if found != expected {
            return Err(safety_code_mismatch(RecordKind::Object, id.get(), expected, found));
        }
        Ok(object)
    }

    // -----------------------------------------------------------------------
    // Event channel
    // -----------------------------------------------------------------------

    /// Read an event reference, constructing the event on first reference.
    pub fn get_event(&mut self) -> Result<Option<EventId>> {
        let raw = self.input.pop_u32()?;
        let Some(id) = EventId::new(raw) else {
            return Ok(None);
        };
        if let Some(ceiling) = self.event_ceiling {
            if raw > ceiling {
                return Err(SnapshotError::IdOutOfRange {
                    kind: RecordKind::Event,
                    id: raw,
                    ceiling,
                });
            }
        }
        if self.registry.contains_event(id) {
            return Ok(Some(id));
        }

        self.enter_payload(RecordKind::Event, raw)?;
        if self.debug_mode {
            self.trace_offset("start loading event", raw);
        }
        self.registry.reserve_event(id);
        let loaded = self.load_event(id);
        self.depth -= 1;
        match loaded {
            Ok(event) => {
                self.registry.record_event(event);
                Ok(Some(id))
            }
            Err(e) => {
                self.registry.discard_event(id);
                Err(e)
            }
        }
    }

    #[inline(never)]
    fn load_event(&mut self, id: EventId) -> Result<GameEvent> {
        let event = GameEvent::deserialize(self, id)?;
        let found = self.input.pop_u16()?;
        let expected = event_safety_code(id);
        if found != expected {
            return Err(safety_code_mismatch(RecordKind::Event, id.get(), expected, found));
        }
        Ok(event)
    }

    // -----------------------------------------------------------------------
    // Nesting
    // -----------------------------------------------------------------------

    /// Open one more payload, failing once `max_depth` payloads are open.
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
        tracing::trace!(id, depth = self.depth, offset = self.input.position(), "{message}");
    }

    // -----------------------------------------------------------------------
    // Fog-of-war channel
    // -----------------------------------------------------------------------

    /// Read a fog-of-war memory; tag `0` is an empty memory.
    pub fn get_fow(&mut self) -> Result<Option<FowObject>> {
        let tag = self.input.pop_u8()?;
        let fow_type =
            FowType::from_raw(u16::from(tag)).ok_or(SnapshotError::UnknownFowType(tag))?;
        let fow = match fow_type {
            FowType::Nothing => return Ok(None),
            FowType::Building => FowObject::Building {
                building: self.pop_u8()?,
                nation: self.pop_u8()?,
            },
            FowType::BuildingSite => FowObject::BuildingSite {
                planing: self.pop_bool()?,
                building: self.pop_u8()?,
                nation: self.pop_u8()?,
                build_progress: self.pop_u8()?,
            },
            FowType::Flag => FowObject::Flag {
                player: self.pop_u8()?,
                flag_type: self.pop_u8()?,
            },
            FowType::Tree => FowObject::Tree {
                tree_type: self.pop_u8()?,
                size: self.pop_u8()?,
            },
            FowType::Granite => FowObject::Granite {
                granite_type: self.pop_u8()?,
                state: self.pop_u8()?,
            },
        };
        Ok(Some(fow))
    }
}

impl std::fmt::Debug for ReadSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadSession")
            .field("version", &self.version)
            .field("position", &self.input.position())
            .field("read_objects", &self.registry.object_count())
            .field("read_events", &self.registry.event_count())
            .finish()
    }
}

#[cold]
#[inline(never)]
fn safety_code_mismatch(kind: RecordKind, id: u32, expected: u16, found: u16) -> SnapshotError {
    tracing::error!(%kind, id, expected, found, "safety code mismatch after loading");
    SnapshotError::SafetyCodeMismatch {
        kind,
        id,
        expected,
        found,
    }
}

#[cold]
#[inline(never)]
pub(crate) fn nesting_too_deep(kind: RecordKind, id: u32, limit: usize) -> SnapshotError {
    tracing::error!(%kind, id, limit, "payloads nested too deep");
    SnapshotError::NestingTooDeep { kind, id, limit }
}

/// Check the magic and return the format version.
pub(crate) fn read_header(input: &mut StreamReader<'_>) -> Result<u32> {
    let found = input.pop_array::<4>()?;
    if found != SNAPSHOT_MAGIC {
        return Err(SnapshotError::BadMagic {
            expected: SNAPSHOT_MAGIC,
            found,
        });
    }
    let version = input.pop_u32()?;
    if !(MIN_FORMAT_VERSION..=CURRENT_FORMAT_VERSION).contains(&version) {
        return Err(SnapshotError::UnsupportedVersion {
            found: version,
            min: MIN_FORMAT_VERSION,
            max: CURRENT_FORMAT_VERSION,
        });
    }
    Ok(version)
}
