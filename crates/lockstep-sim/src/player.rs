//! Per-player state.

use lockstep_snapshot::{ObjectId, ObjectType, ReadSession, Result, WriteSession};

use crate::map::Good;

/// What a player owns. Objects are listed here in addition to wherever they
/// sit on the map, so each player's economy can be walked without scanning
/// the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub defeated: bool,
    pub buildings: Vec<ObjectId>,
    pub sites: Vec<ObjectId>,
    pub flags: Vec<ObjectId>,
    pub roads: Vec<ObjectId>,
    pub ships: Vec<ObjectId>,
    /// Total goods in all warehouses.
    pub inventory: [u32; Good::COUNT],
}

impl Default for Player {
    fn default() -> Self {
        Self {
            defeated: false,
            buildings: Vec::new(),
            sites: Vec::new(),
            flags: Vec::new(),
            roads: Vec::new(),
            ships: Vec::new(),
            inventory: [0; Good::COUNT],
        }
    }
}

impl Player {
    pub(crate) fn write(&self, session: &mut WriteSession<'_>) -> Result<()> {
        session.push_bool(self.defeated);
        session.put_object_refs(&self.buildings, false)?;
        session.put_object_refs(&self.sites, false)?;
        session.put_object_refs(&self.flags, true)?;
        session.put_object_refs(&self.roads, true)?;
        session.put_object_refs(&self.ships, true)?;
        for &amount in &self.inventory {
            session.push_u32(amount);
        }
        Ok(())
    }

    pub(crate) fn read(session: &mut ReadSession<'_>) -> Result<Self> {
        let mut player = Self {
            defeated: session.pop_bool()?,
            buildings: session.get_objects()?,
            sites: session.get_objects()?,
            flags: session.get_objects_as(ObjectType::Flag)?,
            roads: session.get_objects_as(ObjectType::RoadSegment)?,
            ships: session.get_objects_as(ObjectType::Ship)?,
            ..Self::default()
        };
        for amount in &mut player.inventory {
            *amount = session.pop_u32()?;
        }
        Ok(player)
    }
}
