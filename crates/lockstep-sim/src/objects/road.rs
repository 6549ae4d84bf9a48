use lockstep_snapshot::{FromSession, ObjectId, ObjectType, ReadSession, Result, WriteSession};

use super::game_object;
use crate::map::Direction;

/// A road between two flags, walked by up to two carriers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoadSegment {
    pub id: ObjectId,
    pub road_type: u8,
    /// Start and end flag.
    pub flags: [Option<ObjectId>; 2],
    /// Steps from the start flag to the end flag.
    pub route: Vec<Direction>,
    /// Regular carrier and donkey.
    pub carriers: [Option<ObjectId>; 2],
}

game_object!(RoadSegment, tag = ObjectType::RoadSegment);

impl RoadSegment {
    pub fn new(id: ObjectId, from: ObjectId, to: ObjectId, route: Vec<Direction>) -> Self {
        Self {
            id,
            road_type: 0,
            flags: [Some(from), Some(to)],
            route,
            carriers: [None; 2],
        }
    }

    fn write(&self, session: &mut WriteSession<'_>) -> Result<()> {
        session.push_u8(self.road_type);
        for &flag in &self.flags {
            session.put_object_ref(flag, true)?;
        }
        session.push_container_size(self.route.len());
        for &dir in &self.route {
            session.push_enum8(dir);
        }
        for &carrier in &self.carriers {
            session.put_object_ref(carrier, false)?;
        }
        Ok(())
    }
}

impl FromSession for RoadSegment {
    fn from_session(session: &mut ReadSession<'_>, id: ObjectId, _: ObjectType) -> Result<Self> {
        let road_type = session.pop_u8()?;
        let flags = [
            session.get_object_as(ObjectType::Flag)?,
            session.get_object_as(ObjectType::Flag)?,
        ];
        let len = session.pop_container_size()?;
        let route = (0..len)
            .map(|_| session.pop_enum8::<Direction>())
            .collect::<Result<Vec<_>>>()?;
        let carriers = [session.get_object()?, session.get_object()?];
        Ok(Self {
            id,
            road_type,
            flags,
            route,
            carriers,
        })
    }
}
