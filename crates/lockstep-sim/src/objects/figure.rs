use lockstep_snapshot::{
    EventId, FromSession, ObjectId, ObjectType, ReadSession, Result, WriteSession,
};
use lockstep_stream::{StreamError, WireEnum};

use super::game_object;
use crate::map::{Good, MapPoint};

/// Carried-good byte meaning "empty handed" before format version 4.
const LEGACY_NO_GOOD: u8 = 0xFF;

/// Combat values of the soldier professions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SoldierStats {
    pub rank: u8,
    pub hitpoints: u8,
}

/// A walking figure of any profession.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Figure {
    pub id: ObjectId,
    pub object_type: ObjectType,
    pub player: u8,
    pub pos: MapPoint,
    pub job_state: u8,
    /// Workplace or warehouse the figure belongs to.
    pub home: Option<ObjectId>,
    /// Road a carrier is assigned to. Always `None` for other professions.
    pub road: Option<ObjectId>,
    pub carried: Option<Good>,
    /// Walking or working timer.
    pub event: Option<EventId>,
    /// Present exactly for the soldier professions.
    pub soldier: Option<SoldierStats>,
}

game_object!(Figure);

impl Figure {
    pub fn new(id: ObjectId, object_type: ObjectType, player: u8, pos: MapPoint) -> Self {
        debug_assert!(object_type.is_figure(), "{object_type:?} is not a figure");
        Self {
            id,
            object_type,
            player,
            pos,
            job_state: 0,
            home: None,
            road: None,
            carried: None,
            event: None,
            soldier: Self::is_soldier(object_type).then(SoldierStats::default),
        }
    }

    pub fn is_soldier(object_type: ObjectType) -> bool {
        matches!(
            object_type,
            ObjectType::AggressiveDefender
                | ObjectType::Attacker
                | ObjectType::Defender
                | ObjectType::PassiveSoldier
        )
    }

    fn write(&self, session: &mut WriteSession<'_>) -> Result<()> {
        session.push_u8(self.player);
        self.pos.write(session);
        session.push_u8(self.job_state);
        session.put_object_ref(self.home, false)?;
        if self.object_type == ObjectType::Carrier {
            session.put_object_ref(self.road, true)?;
        }
        session.push_bool(self.carried.is_some());
        if let Some(good) = self.carried {
            session.push_enum8(good);
        }
        session.put_event_ref(self.event)?;
        if Self::is_soldier(self.object_type) {
            let stats = self.soldier.unwrap_or_default();
            session.push_u8(stats.rank);
            session.push_u8(stats.hitpoints);
        }
        Ok(())
    }

    fn read_carried(session: &mut ReadSession<'_>) -> Result<Option<Good>> {
        if session.data_version() >= 4 {
            return Ok(if session.pop_bool()? {
                Some(session.pop_enum8()?)
            } else {
                None
            });
        }
        match session.pop_u8()? {
            LEGACY_NO_GOOD => Ok(None),
            raw => Good::from_raw(u16::from(raw)).map(Some).ok_or_else(|| {
                StreamError::OutOfRange {
                    value: u64::from(raw),
                    max: u64::from(Good::MAX_RAW),
                }
                .into()
            }),
        }
    }
}

impl FromSession for Figure {
    fn from_session(
        session: &mut ReadSession<'_>,
        id: ObjectId,
        object_type: ObjectType,
    ) -> Result<Self> {
        let player = session.pop_u8()?;
        let pos = MapPoint::read(session)?;
        let job_state = session.pop_u8()?;
        let home = session.get_object()?;
        let road = if object_type == ObjectType::Carrier {
            session.get_object_as(ObjectType::RoadSegment)?
        } else {
            None
        };
        let carried = Self::read_carried(session)?;
        let event = session.get_event()?;
        let soldier = if Self::is_soldier(object_type) {
            Some(SoldierStats {
                rank: session.pop_u8()?,
                hitpoints: session.pop_u8()?,
            })
        } else {
            None
        };
        Ok(Self {
            id,
            object_type,
            player,
            pos,
            job_state,
            home,
            road,
            carried,
            event,
            soldier,
        })
    }
}
