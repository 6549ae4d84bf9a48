//! Lockstep Snapshot -- reference-preserving object graph serialization.
//!
//! This crate turns a population of interlinked, runtime-polymorphic
//! simulation objects and their scheduled events into a single linear byte
//! stream, and rebuilds an identical graph from it. Shared references,
//! cycles and forward references survive the round trip: every object is
//! written in full the first time it is reached and by id afterwards, and on
//! read every object is registered before its own payload is decoded.
//!
//! Objects live in an id-keyed arena ([`ObjectPool`]) and refer to each
//! other only through [`ObjectId`]s. Concrete shapes implement
//! [`GameObject`] and [`FromSession`] and are registered with an
//! [`ObjectFactory`] under their [`ObjectType`] tag.
//!
//! # Quick Start
//!
//! ```
//! use std::any::Any;
//!
//! use lockstep_snapshot::prelude::*;
//!
//! #[derive(Debug)]
//! struct Beacon {
//!     id: ObjectId,
//!     partner: Option<ObjectId>,
//! }
//!
//! impl GameObject for Beacon {
//!     fn id(&self) -> ObjectId { self.id }
//!     fn object_type(&self) -> ObjectType { ObjectType::Sign }
//!     fn serialize(&self, session: &mut WriteSession<'_>) -> lockstep_snapshot::Result<()> {
//!         session.put_object_ref(self.partner, false)
//!     }
//!     fn as_any(&self) -> &dyn Any { self }
//!     fn as_any_mut(&mut self) -> &mut dyn Any { self }
//! }
//!
//! impl FromSession for Beacon {
//!     fn from_session(
//!         session: &mut ReadSession<'_>,
//!         id: ObjectId,
//!         _object_type: ObjectType,
//!     ) -> lockstep_snapshot::Result<Self> {
//!         Ok(Beacon { id, partner: session.get_object()? })
//!     }
//! }
//!
//! // Two beacons pointing at each other.
//! let mut pool = ObjectPool::new();
//! let a = pool.allocate_id();
//! let b = pool.allocate_id();
//! pool.insert(Box::new(Beacon { id: a, partner: Some(b) }));
//! pool.insert(Box::new(Beacon { id: b, partner: Some(a) }));
//!
//! let events = NoEvents;
//! let config = SnapshotConfig::default();
//! let mut out = WriteSession::headerless(&pool, &events, &config);
//! out.put_object_ref(Some(a), false).unwrap();
//! let bytes = out.into_bytes();
//!
//! let mut factory = ObjectFactory::new();
//! factory.register::<Beacon>(ObjectType::Sign);
//! let mut input = ReadSession::with_version(&bytes, &factory, CURRENT_FORMAT_VERSION, &config);
//! assert_eq!(input.get_object().unwrap(), Some(a));
//! let restored = input.finish().unwrap();
//!
//! assert_eq!(restored.objects.len(), 2);
//! let b_again = restored.objects[1].downcast_ref::<Beacon>().unwrap();
//! assert_eq!(b_again.partner, Some(a));
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod event;
pub mod factory;
pub mod fow;
pub mod ids;
pub mod object;
pub mod object_type;
pub mod registry;
pub mod session;
pub mod snapshot;

pub use lockstep_stream;

pub use config::{SnapshotConfig, DEFAULT_MAX_DEPTH};
pub use error::{ErrorKind, RecordKind, Result, SnapshotError};
pub use event::GameEvent;
pub use factory::{Constructor, ObjectFactory};
pub use fow::{FowObject, FowType};
pub use ids::{EventId, IdCounter, ObjectId};
pub use object::{EventLookup, FromSession, GameObject, NoEvents, ObjectLookup, ObjectPool};
pub use object_type::ObjectType;
pub use registry::RestoredPopulation;
pub use session::{ReadSession, WriteSession};
pub use snapshot::{
    make_snapshot, peek_header, read_snapshot, state_hash, Snapshot, SnapshotHeader,
    SnapshotSource, SnapshotSummary, SnapshotTarget, CURRENT_FORMAT_VERSION, MIN_FORMAT_VERSION,
    PASS_STACK_SIZE, SNAPSHOT_MAGIC,
};

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::config::SnapshotConfig;
    pub use crate::error::{ErrorKind, SnapshotError};
    pub use crate::event::GameEvent;
    pub use crate::factory::ObjectFactory;
    pub use crate::fow::FowObject;
    pub use crate::ids::{EventId, IdCounter, ObjectId};
    pub use crate::object::{
        EventLookup, FromSession, GameObject, NoEvents, ObjectLookup, ObjectPool,
    };
    pub use crate::object_type::ObjectType;
    pub use crate::registry::RestoredPopulation;
    pub use crate::session::{ReadSession, WriteSession};
    pub use crate::snapshot::{
        make_snapshot, peek_header, read_snapshot, Snapshot, SnapshotHeader, SnapshotSource,
        SnapshotTarget, CURRENT_FORMAT_VERSION,
    };
}
