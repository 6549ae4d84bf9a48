use lockstep_snapshot::{
    EventId, FromSession, ObjectId, ObjectType, ReadSession, Result, WriteSession,
};

use super::game_object;
use crate::map::MapPoint;

/// A sea ship shuttling wares and figures between harbours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ship {
    pub id: ObjectId,
    pub player: u8,
    pub name: String,
    pub pos: MapPoint,
    /// Harbour flag the ship belongs to.
    pub home_flag: Option<ObjectId>,
    pub cargo: Vec<ObjectId>,
    pub passengers: Vec<ObjectId>,
    /// Arrival or loading timer.
    pub event: Option<EventId>,
}

game_object!(Ship, tag = ObjectType::Ship);

impl Ship {
    pub fn new(id: ObjectId, player: u8, name: impl Into<String>, pos: MapPoint) -> Self {
        Self {
            id,
            player,
            name: name.into(),
            pos,
            home_flag: None,
            cargo: Vec::new(),
            passengers: Vec::new(),
            event: None,
        }
    }

    fn write(&self, session: &mut WriteSession<'_>) -> Result<()> {
        session.push_u8(self.player);
        session.push_string(&self.name);
        self.pos.write(session);
        session.put_object_ref(self.home_flag, true)?;
        session.put_object_refs(&self.cargo, true)?;
        session.put_object_refs(&self.passengers, false)?;
        session.put_event_ref(self.event)
    }
}

impl FromSession for Ship {
    fn from_session(session: &mut ReadSession<'_>, id: ObjectId, _: ObjectType) -> Result<Self> {
        Ok(Self {
            id,
            player: session.pop_u8()?,
            name: session.pop_string()?,
            pos: MapPoint::read(session)?,
            home_flag: session.get_object_as(ObjectType::Flag)?,
            cargo: session.get_objects_as(ObjectType::Ware)?,
            passengers: session.get_objects()?,
            event: session.get_event()?,
        })
    }
}
