use lockstep_snapshot::{
    EventId, FromSession, ObjectId, ObjectType, ReadSession, Result, WriteSession,
};

use super::game_object;
use crate::map::MapPoint;

/// Anything that occupies a map node without being a building or a figure:
/// trees, granite, signs, fires, animals, fights and the like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeObject {
    pub id: ObjectId,
    pub object_type: ObjectType,
    pub pos: MapPoint,
    /// Sub-kind, e.g. the tree species or the animal species.
    pub variant: u16,
    /// Growth stage, remaining granite, fire intensity.
    pub state: u8,
    /// Growth, decay or movement timer. Not stored before format version 3.
    pub event: Option<EventId>,
    /// Soldiers involved. Only fights have any.
    pub participants: Vec<ObjectId>,
}

game_object!(NodeObject);

impl NodeObject {
    pub fn new(id: ObjectId, object_type: ObjectType, pos: MapPoint) -> Self {
        debug_assert!(
            super::NODE_OBJECTS.contains(&object_type),
            "{object_type:?} is not a node object"
        );
        Self {
            id,
            object_type,
            pos,
            variant: 0,
            state: 0,
            event: None,
            participants: Vec::new(),
        }
    }

    fn write(&self, session: &mut WriteSession<'_>) -> Result<()> {
        self.pos.write(session);
        session.push_u16(self.variant);
        session.push_u8(self.state);
        session.put_event_ref(self.event)?;
        if self.object_type == ObjectType::Fighting {
            session.put_object_refs(&self.participants, false)?;
        }
        Ok(())
    }
}

impl FromSession for NodeObject {
    fn from_session(
        session: &mut ReadSession<'_>,
        id: ObjectId,
        object_type: ObjectType,
    ) -> Result<Self> {
        let pos = MapPoint::read(session)?;
        let variant = session.pop_u16()?;
        let state = session.pop_u8()?;
        let event = if session.data_version() >= 3 {
            session.get_event()?
        } else {
            None
        };
        let participants = if object_type == ObjectType::Fighting {
            session.get_objects()?
        } else {
            Vec::new()
        };
        Ok(Self {
            id,
            object_type,
            pos,
            variant,
            state,
            event,
            participants,
        })
    }
}
