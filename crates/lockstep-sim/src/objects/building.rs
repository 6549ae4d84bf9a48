use lockstep_snapshot::{
    EventId, FromSession, ObjectId, ObjectType, ReadSession, Result, WriteSession,
};

use super::game_object;
use crate::map::{Good, MapPoint};

/// A finished building: any of the player buildings, or the ruin a
/// destroyed warehouse leaves behind while its inhabitants flee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Building {
    pub id: ObjectId,
    pub object_type: ObjectType,
    pub player: u8,
    pub nation: u8,
    pub pos: MapPoint,
    /// Flag in front of the door. Ruins have none.
    pub flag: Option<ObjectId>,
    pub workers: Vec<ObjectId>,
    /// Wares delivered but not yet consumed.
    pub wares: Vec<ObjectId>,
    /// Production or eviction timer.
    pub event: Option<EventId>,
    /// Inventory per [`Good`]. Only warehouses keep one.
    pub stock: Vec<u32>,
}

game_object!(Building);

impl Building {
    pub fn new(id: ObjectId, object_type: ObjectType, player: u8, pos: MapPoint) -> Self {
        debug_assert!(
            object_type.is_building() || object_type == ObjectType::BurnedWarehouse,
            "{object_type:?} is not a building"
        );
        let stock = if Self::keeps_stock(object_type) {
            vec![0; Good::COUNT]
        } else {
            Vec::new()
        };
        Self {
            id,
            object_type,
            player,
            nation: 0,
            pos,
            flag: None,
            workers: Vec::new(),
            wares: Vec::new(),
            event: None,
            stock,
        }
    }

    /// Whether buildings of this type carry an inventory.
    pub fn keeps_stock(object_type: ObjectType) -> bool {
        matches!(
            object_type,
            ObjectType::Headquarters
                | ObjectType::Storehouse
                | ObjectType::HarborBuilding
                | ObjectType::BurnedWarehouse
        )
    }

    fn write(&self, session: &mut WriteSession<'_>) -> Result<()> {
        session.push_u8(self.player);
        session.push_u8(self.nation);
        self.pos.write(session);
        session.put_object_ref(self.flag, true)?;
        session.put_object_refs(&self.workers, false)?;
        session.put_object_refs(&self.wares, true)?;
        session.put_event_ref(self.event)?;
        if Self::keeps_stock(self.object_type) {
            debug_assert_eq!(self.stock.len(), Good::COUNT);
            for &amount in &self.stock {
                session.push_u32(amount);
            }
        }
        Ok(())
    }
}

impl FromSession for Building {
    fn from_session(
        session: &mut ReadSession<'_>,
        id: ObjectId,
        object_type: ObjectType,
    ) -> Result<Self> {
        let player = session.pop_u8()?;
        let nation = session.pop_u8()?;
        let pos = MapPoint::read(session)?;
        let flag = session.get_object_as(ObjectType::Flag)?;
        let workers = session.get_objects()?;
        let wares = session.get_objects_as(ObjectType::Ware)?;
        let event = session.get_event()?;
        let stock = if Self::keeps_stock(object_type) {
            (0..Good::COUNT)
                .map(|_| session.pop_u32())
                .collect::<Result<Vec<_>>>()?
        } else {
            Vec::new()
        };
        Ok(Self {
            id,
            object_type,
            player,
            nation,
            pos,
            flag,
            workers,
            wares,
            event,
            stock,
        })
    }
}
