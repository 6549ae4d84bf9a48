use lockstep_snapshot::{FromSession, ObjectId, ObjectType, ReadSession, Result, WriteSession};

use super::game_object;
use crate::map::MapPoint;

/// A building or ship under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructionSite {
    pub id: ObjectId,
    pub object_type: ObjectType,
    pub player: u8,
    pub pos: MapPoint,
    /// Raw tag of the building being built. Ship sites leave it at zero.
    pub building: u16,
    /// Build progress in percent.
    pub progress: u8,
    /// Access flag. Ship sites sit on the shore without one.
    pub flag: Option<ObjectId>,
    /// Materials ordered and on their way.
    pub ordered: Vec<ObjectId>,
    pub builder: Option<ObjectId>,
}

game_object!(ConstructionSite);

impl ConstructionSite {
    pub fn new(id: ObjectId, object_type: ObjectType, player: u8, pos: MapPoint) -> Self {
        debug_assert!(super::SITES.contains(&object_type), "{object_type:?} is not a site");
        Self {
            id,
            object_type,
            player,
            pos,
            building: 0,
            progress: 0,
            flag: None,
            ordered: Vec::new(),
            builder: None,
        }
    }

    fn write(&self, session: &mut WriteSession<'_>) -> Result<()> {
        session.push_u8(self.player);
        self.pos.write(session);
        session.push_u16(self.building);
        session.push_u8(self.progress);
        session.put_object_ref(self.flag, true)?;
        session.put_object_refs(&self.ordered, true)?;
        session.put_object_ref(self.builder, false)
    }
}

impl FromSession for ConstructionSite {
    fn from_session(
        session: &mut ReadSession<'_>,
        id: ObjectId,
        object_type: ObjectType,
    ) -> Result<Self> {
        Ok(Self {
            id,
            object_type,
            player: session.pop_u8()?,
            pos: MapPoint::read(session)?,
            building: session.pop_u16()?,
            progress: session.pop_u8()?,
            flag: session.get_object_as(ObjectType::Flag)?,
            ordered: session.get_objects_as(ObjectType::Ware)?,
            builder: session.get_object()?,
        })
    }
}
