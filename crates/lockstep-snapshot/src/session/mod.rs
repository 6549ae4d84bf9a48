//! Serialize and deserialize sessions.
//!
//! A session is one pass over one snapshot. [`WriteSession`] owns the output
//! buffer and the write registry; [`ReadSession`] borrows the input bytes and
//! owns the read registry. The direction lives in the type, so a reader can
//! never be asked to push and a writer can never be asked to pop.
//!
//! Both sessions expose the three channels collaborators talk to:
//!
//! - the **entity channel** (`put_object*` / `get_object*`) for polymorphic,
//!   identified objects, written in full once and by id afterwards;
//! - the **event channel** (`put_event*` / `get_event`) with the same
//!   write-once rule but no type tag;
//! - the **fog-of-war channel** (`put_fow` / `get_fow`) for identity-free
//!   variants that bypass the registries.
//!
//! Plus the primitive pushes and pops of the underlying byte stream.

mod read;
mod write;

pub(crate) use read::read_header;
pub use read::ReadSession;
pub use write::WriteSession;

use crate::ids::{EventId, ObjectId};
use crate::object_type::ObjectType;

/// Checksum written after an object payload: `0xFFFF ^ tag ^ id`, truncated
/// to 16 bits.
pub fn object_safety_code(object_type: ObjectType, id: ObjectId) -> u16 {
    (0xFFFF ^ u32::from(object_type as u16) ^ id.get()) as u16
}

/// Checksum written after an event payload: `0xFFFF ^ id`, truncated to 16
/// bits.
pub fn event_safety_code(id: EventId) -> u16 {
    (0xFFFF ^ id.get()) as u16
}
