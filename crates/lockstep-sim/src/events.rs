//! The event scheduler.

use std::collections::BTreeMap;

use lockstep_snapshot::{
    EventId, EventLookup, GameEvent, IdCounter, ObjectId, ReadSession, Result, WriteSession,
};

/// Pending events keyed by id, plus the current game frame.
///
/// Events are iterated in id order, which is also their write order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventManager {
    ids: IdCounter,
    events: BTreeMap<EventId, GameEvent>,
    current_gf: u32,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_gf(&self) -> u32 {
        self.current_gf
    }

    /// Move the clock forward. Events whose target frame has passed stay
    /// pending until their holder cancels them.
    pub fn set_current_gf(&mut self, gf: u32) {
        self.current_gf = gf;
    }

    /// Schedule an event `length` frames from now.
    pub fn schedule(&mut self, object: Option<ObjectId>, length: u32, kind: u32) -> EventId {
        let id = self.ids.next_event();
        self.events.insert(
            id,
            GameEvent {
                id,
                object,
                start_gf: self.current_gf,
                length,
                kind,
            },
        );
        id
    }

    /// Remove an event. The caller clears any reference held by its object.
    pub fn cancel(&mut self, id: EventId) -> Option<GameEvent> {
        self.events.remove(&id)
    }

    pub fn get(&self, id: EventId) -> Option<&GameEvent> {
        self.events.get(&id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.values()
    }

    /// Events due at or before the current frame, in id order.
    pub fn due(&self) -> impl Iterator<Item = &GameEvent> {
        let now = self.current_gf;
        self.events.values().filter(move |e| e.target_gf() <= now)
    }

    pub fn id_ceiling(&self) -> u32 {
        self.ids.ceiling()
    }

    pub(crate) fn restore_id_ceiling(&mut self, ceiling: u32) {
        self.ids.restore(ceiling);
    }

    pub(crate) fn adopt(&mut self, events: Vec<GameEvent>) {
        for event in events {
            let previous = self.events.insert(event.id, event);
            debug_assert!(previous.is_none(), "event restored twice");
        }
    }

    pub(crate) fn write(&self, session: &mut WriteSession<'_>) -> Result<()> {
        session.push_u32(self.current_gf);
        session.push_container_size(self.events.len());
        for event in self.events.values() {
            session.put_event(Some(event))?;
        }
        Ok(())
    }

    /// Read the clock and every event. The events themselves land in the
    /// session registry and arrive through [`adopt`](Self::adopt).
    pub(crate) fn read(&mut self, session: &mut ReadSession<'_>) -> Result<()> {
        self.current_gf = session.pop_u32()?;
        let len = session.pop_container_size()?;
        for _ in 0..len {
            session.get_event()?;
        }
        Ok(())
    }
}

impl EventLookup for EventManager {
    fn event(&self, id: EventId) -> Option<&GameEvent> {
        self.events.get(&id)
    }

    fn event_id_ceiling(&self) -> u32 {
        self.ids.ceiling()
    }
}
