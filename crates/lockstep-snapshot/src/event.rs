//! Scheduled simulation events.
//!
//! All events share one shape, so unlike objects they need no type tag: the
//! event channel constructs a [`GameEvent`] directly.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ids::{EventId, ObjectId};
use crate::session::{ReadSession, WriteSession};

/// A pending event owned by the scheduler.
///
/// The event fires at `start_gf + length` on the object it references. The
/// object is held by id and may be any concrete object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Instance id, unique among events.
    pub id: EventId,
    /// Object the event is delivered to, if it still exists.
    pub object: Option<ObjectId>,
    /// Game frame the event was scheduled at.
    pub start_gf: u32,
    /// Frames until the event fires.
    pub length: u32,
    /// Object-specific event discriminator.
    pub kind: u32,
}

impl GameEvent {
    /// Game frame at which the event fires.
    pub fn target_gf(&self) -> u32 {
        self.start_gf.saturating_add(self.length)
    }

    /// Push the event payload (everything but id and safety code).
    pub fn serialize(&self, session: &mut WriteSession<'_>) -> Result<()> {
        session.put_object_ref(self.object, false)?;
        session.push_u32(self.start_gf);
        session.push_u32(self.length);
        session.push_u32(self.kind);
        Ok(())
    }

    /// Pop the payload written by [`serialize`](Self::serialize).
    pub fn deserialize(session: &mut ReadSession<'_>, id: EventId) -> Result<Self> {
        let object = session.get_object()?;
        let start_gf = session.pop_u32()?;
        let length = session.pop_u32()?;
        let kind = session.pop_u32()?;
        Ok(Self {
            id,
            object,
            start_gf,
            length,
            kind,
        })
    }
}
