use lockstep_snapshot::{FromSession, ObjectId, ObjectType, ReadSession, Result, WriteSession};

use super::game_object;
use crate::map::{Direction, MapPoint};

/// A road junction. Roads start and end at flags, wares wait on them, and a
/// building or harbour may be attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    pub id: ObjectId,
    pub player: u8,
    pub pos: MapPoint,
    pub flag_type: u8,
    /// Road leaving in each direction, indexed by [`Direction`].
    pub routes: [Option<ObjectId>; 6],
    /// Wares waiting to be picked up.
    pub wares: Vec<ObjectId>,
    /// Building attached to the north-west side.
    pub building: Option<ObjectId>,
    /// Ship currently landing at this flag's harbour.
    pub landing_ship: Option<ObjectId>,
}

game_object!(Flag, tag = ObjectType::Flag);

impl Flag {
    pub fn new(id: ObjectId, player: u8, pos: MapPoint) -> Self {
        Self {
            id,
            player,
            pos,
            flag_type: 0,
            routes: [None; 6],
            wares: Vec::new(),
            building: None,
            landing_ship: None,
        }
    }

    pub fn route(&self, dir: Direction) -> Option<ObjectId> {
        self.routes[dir as usize]
    }

    fn write(&self, session: &mut WriteSession<'_>) -> Result<()> {
        self.pos.write(session);
        session.push_u8(self.player);
        session.push_u8(self.flag_type);
        for &road in &self.routes {
            session.put_object_ref(road, true)?;
        }
        session.put_object_refs(&self.wares, true)?;
        session.put_object_ref(self.building, false)?;
        session.put_object_ref(self.landing_ship, true)
    }
}

impl FromSession for Flag {
    fn from_session(session: &mut ReadSession<'_>, id: ObjectId, _: ObjectType) -> Result<Self> {
        let pos = MapPoint::read(session)?;
        let player = session.pop_u8()?;
        let flag_type = session.pop_u8()?;
        let mut routes = [None; 6];
        for road in &mut routes {
            *road = session.get_object_as(ObjectType::RoadSegment)?;
        }
        Ok(Self {
            id,
            player,
            pos,
            flag_type,
            routes,
            wares: session.get_objects_as(ObjectType::Ware)?,
            building: session.get_object()?,
            landing_ship: session.get_object_as(ObjectType::Ship)?,
        })
    }
}
