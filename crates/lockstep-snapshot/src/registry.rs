//! Per-session reference registries.
//!
//! The write registry remembers which object and event ids already had their
//! full payload emitted, so every later reference costs only the id. The
//! read registry maps ids to reconstructed objects and events; it also holds
//! objects whose header has been read but whose payload is still being
//! decoded further up the call stack, which is what lets a cycle A -> B -> A
//! resolve to A instead of reading A a second time.
//!
//! Both registries live exactly as long as one session. Id `0` cannot reach
//! them: the non-zero id types rule it out.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Result, SnapshotError};
use crate::event::GameEvent;
use crate::ids::{EventId, ObjectId};
use crate::object::GameObject;
use crate::object_type::ObjectType;

// ---------------------------------------------------------------------------
// WriteRegistry
// ---------------------------------------------------------------------------

/// Write-once bookkeeping for a serialize pass.
#[derive(Debug, Default)]
pub struct WriteRegistry {
    objects: BTreeSet<ObjectId>,
    events: BTreeSet<EventId>,
}

impl WriteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the payload of `id` has been emitted.
    ///
    /// Marking an id twice means a collaborator serialized the same owned
    /// object through two paths; that is a bug, not a data error.
    pub fn mark_object_written(&mut self, id: ObjectId) {
        let fresh = self.objects.insert(id);
        debug_assert!(fresh, "{id} marked as written twice");
    }

    pub fn is_object_written(&self, id: ObjectId) -> bool {
        self.objects.contains(&id)
    }

    pub fn mark_event_written(&mut self, id: EventId) {
        let fresh = self.events.insert(id);
        debug_assert!(fresh, "{id} marked as written twice");
    }

    pub fn is_event_written(&self, id: EventId) -> bool {
        self.events.contains(&id)
    }

    /// Number of distinct objects written so far.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of distinct events written so far.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.events.clear();
    }
}

// ---------------------------------------------------------------------------
// ReadRegistry
// ---------------------------------------------------------------------------

/// Registry entry for an object on the read side.
#[derive(Debug)]
enum ObjectSlot {
    /// Header registered, payload still being read.
    Pending(ObjectType),
    Ready(Box<dyn GameObject>),
}

/// Registry entry for an event on the read side.
#[derive(Debug)]
enum EventSlot {
    Pending,
    Ready(GameEvent),
}

/// Id -> reconstructed object/event map for a restore pass.
#[derive(Debug, Default)]
pub struct ReadRegistry {
    objects: BTreeMap<ObjectId, ObjectSlot>,
    events: BTreeMap<EventId, EventSlot>,
}

impl ReadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object header before its payload is read.
    pub fn reserve_object(&mut self, id: ObjectId, object_type: ObjectType) {
        let previous = self.objects.insert(id, ObjectSlot::Pending(object_type));
        debug_assert!(previous.is_none(), "{id} reserved twice");
    }

    /// Store the finished object, replacing its pending reservation.
    pub fn record_object(&mut self, object: Box<dyn GameObject>) {
        let id = object.id();
        let previous = self.objects.insert(id, ObjectSlot::Ready(object));
        debug_assert!(
            matches!(previous, None | Some(ObjectSlot::Pending(_))),
            "{id} recorded twice"
        );
    }

    /// Drop a reservation after the payload failed to load.
    pub fn discard_object(&mut self, id: ObjectId) {
        self.objects.remove(&id);
    }

    /// Returns `true` if `id` is reserved or finished.
    pub fn contains_object(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// The finished object for `id`. Pending objects are not returned.
    pub fn lookup_object(&self, id: ObjectId) -> Option<&dyn GameObject> {
        match self.objects.get(&id)? {
            ObjectSlot::Ready(object) => Some(object.as_ref()),
            ObjectSlot::Pending(_) => None,
        }
    }

    /// The tag of a reserved or finished object.
    pub fn object_type(&self, id: ObjectId) -> Option<ObjectType> {
        match self.objects.get(&id)? {
            ObjectSlot::Ready(object) => Some(object.object_type()),
            ObjectSlot::Pending(ty) => Some(*ty),
        }
    }

    pub fn reserve_event(&mut self, id: EventId) {
        let previous = self.events.insert(id, EventSlot::Pending);
        debug_assert!(previous.is_none(), "{id} reserved twice");
    }

    pub fn record_event(&mut self, event: GameEvent) {
        let id = event.id;
        let previous = self.events.insert(id, EventSlot::Ready(event));
        debug_assert!(
            matches!(previous, None | Some(EventSlot::Pending)),
            "{id} recorded twice"
        );
    }

    pub fn discard_event(&mut self, id: EventId) {
        self.events.remove(&id);
    }

    pub fn contains_event(&self, id: EventId) -> bool {
        self.events.contains_key(&id)
    }

    pub fn lookup_event(&self, id: EventId) -> Option<&GameEvent> {
        match self.events.get(&id)? {
            EventSlot::Ready(event) => Some(event),
            EventSlot::Pending => None,
        }
    }

    /// Number of objects read (pending ones included).
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of events read (pending ones included).
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Hand the reconstructed population to the caller.
    ///
    /// Fails if any object or event is still pending, which can only happen
    /// if a payload read was abandoned without propagating its error.
    pub fn into_population(self) -> Result<RestoredPopulation> {
        let mut objects = Vec::with_capacity(self.objects.len());
        let mut pending = 0usize;
        for slot in self.objects.into_values() {
            match slot {
                ObjectSlot::Ready(object) => objects.push(object),
                ObjectSlot::Pending(_) => pending += 1,
            }
        }
        let mut events = Vec::with_capacity(self.events.len());
        for slot in self.events.into_values() {
            match slot {
                EventSlot::Ready(event) => events.push(event),
                EventSlot::Pending => pending += 1,
            }
        }
        if pending > 0 {
            return Err(SnapshotError::PendingObjects { count: pending });
        }
        Ok(RestoredPopulation { objects, events })
    }
}

// ---------------------------------------------------------------------------
// RestoredPopulation
// ---------------------------------------------------------------------------

/// Everything a restore pass reconstructed, in id order.
///
/// Ownership passes to the simulation, which inserts the objects into its
/// [`ObjectPool`](crate::object::ObjectPool) and the events into its
/// scheduler.
#[derive(Debug, Default)]
pub struct RestoredPopulation {
    pub objects: Vec<Box<dyn GameObject>>,
    pub events: Vec<GameEvent>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(raw: u32) -> ObjectId {
        ObjectId::new(raw).unwrap()
    }

    fn eid(raw: u32) -> EventId {
        EventId::new(raw).unwrap()
    }

    #[test]
    fn write_registry_is_write_once() {
        let mut reg = WriteRegistry::new();
        assert!(!reg.is_object_written(oid(3)));
        reg.mark_object_written(oid(3));
        assert!(reg.is_object_written(oid(3)));
        reg.mark_event_written(eid(3));
        assert!(reg.is_event_written(eid(3)));
        assert_eq!(reg.object_count(), 1);
        assert_eq!(reg.event_count(), 1);
        reg.clear();
        assert!(!reg.is_object_written(oid(3)));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "marked as written twice")]
    fn double_mark_is_a_bug() {
        let mut reg = WriteRegistry::new();
        reg.mark_object_written(oid(3));
        reg.mark_object_written(oid(3));
    }

    #[test]
    fn pending_objects_are_known_but_not_returned() {
        let mut reg = ReadRegistry::new();
        reg.reserve_object(oid(7), ObjectType::Flag);
        assert!(reg.contains_object(oid(7)));
        assert!(reg.lookup_object(oid(7)).is_none());
        assert_eq!(reg.object_type(oid(7)), Some(ObjectType::Flag));
    }

    #[test]
    fn pending_entries_fail_population_handover() {
        let mut reg = ReadRegistry::new();
        reg.reserve_object(oid(7), ObjectType::Flag);
        reg.reserve_event(eid(1));
        let err = reg.into_population().unwrap_err();
        assert!(matches!(err, SnapshotError::PendingObjects { count: 2 }));
    }

    #[test]
    fn events_complete_their_reservation() {
        let mut reg = ReadRegistry::new();
        reg.reserve_event(eid(4));
        assert!(reg.lookup_event(eid(4)).is_none());
        reg.record_event(GameEvent {
            id: eid(4),
            object: None,
            start_gf: 10,
            length: 5,
            kind: 0,
        });
        assert_eq!(reg.lookup_event(eid(4)).map(GameEvent::target_gf), Some(15));
        let population = reg.into_population().unwrap();
        assert_eq!(population.events.len(), 1);
        assert!(population.objects.is_empty());
    }

    #[test]
    fn discarded_reservations_disappear() {
        let mut reg = ReadRegistry::new();
        reg.reserve_object(oid(9), ObjectType::Ware);
        reg.discard_object(oid(9));
        assert!(!reg.contains_object(oid(9)));
        assert_eq!(reg.object_count(), 0);
    }
}
