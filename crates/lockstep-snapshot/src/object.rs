//! The collaborator contract for polymorphic simulation objects, and the
//! id-keyed arena that holds the live population.
//!
//! Objects never hold pointers to each other. Every cross-object reference
//! is an [`ObjectId`] resolved through an [`ObjectLookup`] (on write) or the
//! read registry (on restore), which is what makes cyclic and forward
//! references safe to reconstruct.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;
use crate::event::GameEvent;
use crate::ids::{EventId, IdCounter, ObjectId};
use crate::object_type::ObjectType;
use crate::session::{ReadSession, WriteSession};

// ---------------------------------------------------------------------------
// GameObject
// ---------------------------------------------------------------------------

/// A uniquely identified, polymorphic simulation object.
///
/// `serialize` pushes the object's payload (everything except id, tag and
/// safety code, which the entity channel handles). The matching
/// [`FromSession::from_session`] must pop exactly the same bytes in the same
/// order.
///
/// Objects are plain data: snapshot passes run on their own thread, so every
/// object is `Send + Sync`.
pub trait GameObject: Any + Send + Sync + fmt::Debug {
    fn id(&self) -> ObjectId;

    fn object_type(&self) -> ObjectType;

    /// Push this object's payload.
    fn serialize(&self, session: &mut WriteSession<'_>) -> Result<()>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<'a> dyn GameObject + 'a {
    /// Downcast to a concrete object type.
    pub fn downcast_ref<T: GameObject>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcast to a concrete object type, mutably.
    pub fn downcast_mut<T: GameObject>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// Reconstruction half of the object contract.
///
/// Implemented by every concrete object type that is registered with the
/// [`ObjectFactory`](crate::factory::ObjectFactory). `object_type` is the tag
/// the factory dispatched on, so one Rust type may serve several tags.
pub trait FromSession: GameObject + Sized {
    fn from_session(
        session: &mut ReadSession<'_>,
        id: ObjectId,
        object_type: ObjectType,
    ) -> Result<Self>;
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// Resolves object ids against the live population during a write pass.
pub trait ObjectLookup {
    fn object(&self, id: ObjectId) -> Option<&dyn GameObject>;

    /// Highest object id ever allocated.
    fn object_id_ceiling(&self) -> u32;
}

/// Resolves event ids against the scheduler during a write pass.
pub trait EventLookup {
    fn event(&self, id: EventId) -> Option<&GameEvent>;

    /// Highest event id ever allocated.
    fn event_id_ceiling(&self) -> u32;
}

/// A scheduler that never allocated an event, for passes over object-only
/// payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoEvents;

impl EventLookup for NoEvents {
    fn event(&self, _id: EventId) -> Option<&GameEvent> {
        None
    }

    fn event_id_ceiling(&self) -> u32 {
        0
    }
}

// ---------------------------------------------------------------------------
// ObjectPool
// ---------------------------------------------------------------------------

/// Id-keyed arena owning every live simulation object.
///
/// The pool also owns the [`IdCounter`] for objects, so allocation and
/// ownership live in the same simulation context instead of in globals.
/// Iteration is in id order, which keeps snapshot output deterministic.
#[derive(Debug, Default)]
pub struct ObjectPool {
    ids: IdCounter,
    objects: BTreeMap<ObjectId, Box<dyn GameObject>>,
}

impl ObjectPool {
    /// An empty pool whose first id will be `1`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next id. The caller builds the object and
    /// [`insert`](Self::insert)s it.
    pub fn allocate_id(&mut self) -> ObjectId {
        self.ids.next_object()
    }

    /// Allocate an id, build the object with it, and store it.
    pub fn spawn<T, F>(&mut self, build: F) -> ObjectId
    where
        T: GameObject,
        F: FnOnce(ObjectId) -> T,
    {
        let id = self.allocate_id();
        let object = build(id);
        debug_assert_eq!(object.id(), id, "object built with a foreign id");
        self.objects.insert(id, Box::new(object));
        id
    }

    /// Store an object under its own id.
    ///
    /// Returns the object previously stored under that id, which indicates a
    /// collaborator bug (ids are never reused).
    pub fn insert(&mut self, object: Box<dyn GameObject>) -> Option<Box<dyn GameObject>> {
        let id = object.id();
        debug_assert!(
            id.get() <= self.ids.ceiling(),
            "{id} inserted above the id ceiling {}",
            self.ids.ceiling()
        );
        self.objects.insert(id, object)
    }

    /// Destroy an object.
    pub fn remove(&mut self, id: ObjectId) -> Option<Box<dyn GameObject>> {
        self.objects.remove(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&dyn GameObject> {
        self.objects.get(&id).map(|b| b.as_ref())
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut (dyn GameObject + 'static)> {
        self.objects.get_mut(&id).map(|b| b.as_mut())
    }

    /// Typed access to an object.
    pub fn get_as<T: GameObject>(&self, id: ObjectId) -> Option<&T> {
        self.get(id).and_then(|o| o.downcast_ref::<T>())
    }

    /// Typed mutable access to an object.
    pub fn get_as_mut<T: GameObject>(&mut self, id: ObjectId) -> Option<&mut T> {
        self.get_mut(id).and_then(|o| o.downcast_mut::<T>())
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Live object count as used by the snapshot consistency check: stored
    /// objects plus one for the implicit null object.
    pub fn live_count(&self) -> u32 {
        self.objects.len() as u32 + 1
    }

    /// Highest id ever allocated from this pool.
    pub fn id_ceiling(&self) -> u32 {
        self.ids.ceiling()
    }

    /// Restore the allocation ceiling, e.g. while reading a snapshot.
    pub fn restore_id_ceiling(&mut self, ceiling: u32) {
        self.ids.restore(ceiling);
    }

    /// Iterate objects in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &dyn GameObject)> {
        self.objects.iter().map(|(id, o)| (*id, o.as_ref()))
    }

    /// Drop every object and reset the id counter.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.ids = IdCounter::new();
    }
}

impl ObjectLookup for ObjectPool {
    fn object(&self, id: ObjectId) -> Option<&dyn GameObject> {
        self.get(id)
    }

    fn object_id_ceiling(&self) -> u32 {
        self.ids.ceiling()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Marker {
        id: ObjectId,
        label: &'static str,
    }

    impl GameObject for Marker {
        fn id(&self) -> ObjectId {
            self.id
        }

        fn object_type(&self) -> ObjectType {
            ObjectType::Sign
        }

        fn serialize(&self, _session: &mut WriteSession<'_>) -> Result<()> {
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn spawn_allocates_monotonic_ids() {
        let mut pool = ObjectPool::new();
        let a = pool.spawn(|id| Marker { id, label: "a" });
        let b = pool.spawn(|id| Marker { id, label: "b" });
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.live_count(), 3);
        assert_eq!(pool.id_ceiling(), 2);
    }

    #[test]
    fn removal_never_recycles_ids() {
        let mut pool = ObjectPool::new();
        let a = pool.spawn(|id| Marker { id, label: "a" });
        assert!(pool.remove(a).is_some());
        let b = pool.spawn(|id| Marker { id, label: "b" });
        assert_ne!(a, b);
        assert!(!pool.contains(a));
    }

    #[test]
    fn typed_access() {
        let mut pool = ObjectPool::new();
        let a = pool.spawn(|id| Marker { id, label: "a" });
        assert_eq!(pool.get_as::<Marker>(a).map(|m| m.label), Some("a"));
        pool.get_as_mut::<Marker>(a).unwrap().label = "renamed";
        assert_eq!(pool.get_as::<Marker>(a).unwrap().label, "renamed");
        assert_eq!(pool.object(a).unwrap().object_type(), ObjectType::Sign);
    }

    #[test]
    fn no_events_resolves_nothing() {
        let id = EventId::new(1).unwrap();
        assert!(NoEvents.event(id).is_none());
        assert_eq!(NoEvents.event_id_ceiling(), 0);
    }

    #[test]
    fn iteration_is_in_id_order() {
        let mut pool = ObjectPool::new();
        let ids: Vec<ObjectId> = (0..5).map(|_| pool.spawn(|id| Marker { id, label: "" })).collect();
        let seen: Vec<ObjectId> = pool.iter().map(|(id, _)| id).collect();
        assert_eq!(seen, ids);
    }
}
