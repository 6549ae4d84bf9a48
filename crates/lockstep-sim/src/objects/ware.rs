use lockstep_snapshot::{FromSession, ObjectId, ObjectType, ReadSession, Result, WriteSession};

use super::game_object;
use crate::map::{Direction, Good};

/// A single good in transit or in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ware {
    pub id: ObjectId,
    pub good: Good,
    pub player: u8,
    /// Where the ware currently is: a flag, a building, a ship or the
    /// figure carrying it.
    pub location: Option<ObjectId>,
    /// Building the ware is headed for.
    pub goal: Option<ObjectId>,
    /// Direction of the next road to take from the current flag.
    pub next_dir: Option<Direction>,
}

game_object!(Ware, tag = ObjectType::Ware);

impl Ware {
    pub fn new(id: ObjectId, good: Good, player: u8, location: Option<ObjectId>) -> Self {
        Self {
            id,
            good,
            player,
            location,
            goal: None,
            next_dir: None,
        }
    }

    fn write(&self, session: &mut WriteSession<'_>) -> Result<()> {
        session.push_enum8(self.good);
        session.push_u8(self.player);
        session.put_object_ref(self.location, false)?;
        session.put_object_ref(self.goal, false)?;
        session.push_bool(self.next_dir.is_some());
        if let Some(dir) = self.next_dir {
            session.push_enum8(dir);
        }
        Ok(())
    }
}

impl FromSession for Ware {
    fn from_session(session: &mut ReadSession<'_>, id: ObjectId, _: ObjectType) -> Result<Self> {
        let good = session.pop_enum8()?;
        let player = session.pop_u8()?;
        let location = session.get_object()?;
        let goal = session.get_object()?;
        let next_dir = if session.pop_bool()? {
            Some(session.pop_enum8()?)
        } else {
            None
        };
        Ok(Self {
            id,
            good,
            player,
            location,
            goal,
            next_dir,
        })
    }
}
