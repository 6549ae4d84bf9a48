//! Object and event identifiers and the per-simulation id counter.
//!
//! Ids are non-zero 32-bit values. The wire value `0` means "no object" and
//! never reaches the registries: it decodes to `None` before any lookup, so
//! the "no operation for id 0" rule is enforced by the type system.

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ObjectId
// ---------------------------------------------------------------------------

/// Identifier of a simulation object. Monotonically assigned, never reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(NonZeroU32);

impl ObjectId {
    /// Interpret a raw wire value; `0` is the null reference.
    #[inline]
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    /// The raw wire value.
    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Wire value of an optional reference (`0` for `None`).
    #[inline]
    pub fn raw_or_null(id: Option<Self>) -> u32 {
        id.map_or(0, Self::get)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.get())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj#{}", self.get())
    }
}

// ---------------------------------------------------------------------------
// EventId
// ---------------------------------------------------------------------------

/// Identifier of a scheduled event. Disjoint from [`ObjectId`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(NonZeroU32);

impl EventId {
    /// Interpret a raw wire value; `0` is the null reference.
    #[inline]
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    /// The raw wire value.
    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Debug for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventId({})", self.get())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ev#{}", self.get())
    }
}

// ---------------------------------------------------------------------------
// IdCounter
// ---------------------------------------------------------------------------

/// Monotonic id source owned by the simulation context.
///
/// The counter remembers the highest id ever handed out (the *ceiling*).
/// Ids are never recycled, so any reference above the ceiling is corrupt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdCounter {
    ceiling: u32,
}

impl IdCounter {
    /// A counter that has not issued any id yet.
    pub fn new() -> Self {
        Self { ceiling: 0 }
    }

    /// Issue the next raw id.
    ///
    /// # Panics
    ///
    /// Panics if the 32-bit id space is exhausted.
    pub fn next_raw(&mut self) -> NonZeroU32 {
        let next = self
            .ceiling
            .checked_add(1)
            .and_then(NonZeroU32::new)
            .unwrap_or_else(|| panic!("id space exhausted after {} allocations", u32::MAX));
        self.ceiling = next.get();
        next
    }

    /// Issue the next object id.
    pub fn next_object(&mut self) -> ObjectId {
        ObjectId(self.next_raw())
    }

    /// Issue the next event id.
    pub fn next_event(&mut self) -> EventId {
        EventId(self.next_raw())
    }

    /// Highest id issued so far (`0` if none).
    #[inline]
    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// Reset the ceiling, e.g. after restoring a snapshot.
    pub fn restore(&mut self, ceiling: u32) {
        self.ceiling = ceiling;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_null() {
        assert_eq!(ObjectId::new(0), None);
        assert_eq!(EventId::new(0), None);
        assert_eq!(ObjectId::raw_or_null(None), 0);
        assert_eq!(ObjectId::raw_or_null(ObjectId::new(9)), 9);
    }

    #[test]
    fn counter_is_monotonic_and_starts_at_one() {
        let mut counter = IdCounter::new();
        let a = counter.next_object();
        let b = counter.next_object();
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
        assert_eq!(counter.ceiling(), 2);
    }

    #[test]
    fn restore_continues_above_ceiling() {
        let mut counter = IdCounter::new();
        counter.restore(41);
        assert_eq!(counter.next_event().get(), 42);
    }

    #[test]
    fn display_formats() {
        let id = ObjectId::new(7).unwrap();
        assert_eq!(id.to_string(), "obj#7");
        assert_eq!(format!("{id:?}"), "ObjectId(7)");
        assert_eq!(EventId::new(3).unwrap().to_string(), "ev#3");
    }
}
