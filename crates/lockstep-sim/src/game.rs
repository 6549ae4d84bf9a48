//! The simulation context: object pool, world, scheduler and players.
//!
//! [`Game`] owns everything a snapshot covers and plays both collaborator
//! roles: it is the [`SnapshotSource`] when saving and the
//! [`SnapshotTarget`] when loading.

use lockstep_snapshot::{
    make_snapshot, read_snapshot, EventLookup, GameObject, ObjectId, ObjectLookup, ObjectPool,
    ReadSession, RestoredPopulation, Snapshot, SnapshotConfig, SnapshotSource, SnapshotTarget,
    WriteSession,
};

use crate::error::{Result, SimError};
use crate::events::EventManager;
use crate::objects::{self, Building, ConstructionSite, EconomyHandler};
use crate::player::Player;
use crate::settings::GameSettings;
use crate::world::World;

/// A running match.
#[derive(Debug)]
pub struct Game {
    settings: GameSettings,
    pool: ObjectPool,
    world: World,
    events: EventManager,
    players: Vec<Player>,
    economy_handler: Option<ObjectId>,
}

impl Game {
    /// An empty match: blank map, no objects, no events.
    pub fn new(settings: GameSettings) -> Result<Self> {
        settings.validate().map_err(SimError::InvalidSettings)?;
        let players = usize::from(settings.players);
        Ok(Self {
            world: World::new(settings.map_width, settings.map_height, players),
            pool: ObjectPool::new(),
            events: EventManager::new(),
            players: vec![Player::default(); players],
            economy_handler: None,
            settings,
        })
    }

    /// Restore a match saved with the same settings.
    pub fn load(settings: GameSettings, bytes: &[u8], config: &SnapshotConfig) -> Result<Self> {
        let mut game = Self::new(settings)?;
        let header = read_snapshot(bytes, &mut game, &objects::factory(), config)?;
        game.check_ownership()?;
        tracing::info!(
            version = header.format_version,
            objects = game.pool.len(),
            events = game.events.len(),
            "game loaded"
        );
        Ok(game)
    }

    /// Encode the complete match state.
    pub fn save(&self, config: &SnapshotConfig) -> Result<Snapshot> {
        Ok(make_snapshot(self, config)?)
    }

    /// BLAKE3 hash of the current state, for comparing peers.
    pub fn state_hash(&self) -> Result<String> {
        Ok(self.save(&SnapshotConfig::default())?.state_hash())
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn pool(&self) -> &ObjectPool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut ObjectPool {
        &mut self.pool
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn events(&self) -> &EventManager {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventManager {
        &mut self.events
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player_mut(&mut self, index: usize) -> &mut Player {
        &mut self.players[index]
    }

    pub fn economy_mode(&self) -> bool {
        self.settings.economy_mode()
    }

    pub fn economy_handler(&self) -> Option<&EconomyHandler> {
        self.economy_handler
            .and_then(|id| self.pool.get_as::<EconomyHandler>(id))
    }

    pub fn set_economy_handler(&mut self, handler: Option<ObjectId>) {
        self.economy_handler = handler;
    }

    /// Typed access to any object.
    pub fn object<T: GameObject>(&self, id: ObjectId) -> Option<&T> {
        self.pool.get_as::<T>(id)
    }

    /// Player lists are read without a known type, so a stream that is
    /// well formed but inconsistent can put the wrong shape into them.
    fn check_ownership(&self) -> Result<()> {
        for player in &self.players {
            for &id in &player.buildings {
                if self.pool.get_as::<Building>(id).is_none() {
                    return Err(SimError::UnexpectedObject {
                        what: "building",
                        id: id.get(),
                    });
                }
            }
            for &id in &player.sites {
                if self.pool.get_as::<ConstructionSite>(id).is_none() {
                    return Err(SimError::UnexpectedObject {
                        what: "construction site",
                        id: id.get(),
                    });
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Snapshot collaborators
// ---------------------------------------------------------------------------

impl SnapshotSource for Game {
    fn objects(&self) -> &dyn ObjectLookup {
        &self.pool
    }

    fn events(&self) -> &dyn EventLookup {
        &self.events
    }

    fn live_object_count(&self) -> u32 {
        self.pool.live_count()
    }

    fn active_event_count(&self) -> u32 {
        self.events.len() as u32
    }

    fn economy_mode(&self) -> bool {
        self.settings.economy_mode()
    }

    fn economy_handler(&self) -> Option<ObjectId> {
        self.economy_handler
    }

    fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Both id ceilings lead the world so that every later reference can be
    /// range-checked on load.
    fn serialize_world(&self, session: &mut WriteSession<'_>) -> lockstep_snapshot::Result<()> {
        let (objects, events) = (session.object_id_ceiling(), session.event_id_ceiling());
        session.push_u32(objects);
        session.push_u32(events);
        self.world.write(session)
    }

    fn serialize_events(&self, session: &mut WriteSession<'_>) -> lockstep_snapshot::Result<()> {
        self.events.write(session)
    }

    fn serialize_player(
        &self,
        index: usize,
        session: &mut WriteSession<'_>,
    ) -> lockstep_snapshot::Result<()> {
        self.players[index].write(session)
    }
}

impl SnapshotTarget for Game {
    fn economy_mode(&self) -> bool {
        self.settings.economy_mode()
    }

    fn player_count(&self) -> usize {
        self.players.len()
    }

    fn deserialize_world(&mut self, session: &mut ReadSession<'_>) -> lockstep_snapshot::Result<()> {
        let object_ceiling = session.pop_u32()?;
        let event_ceiling = session.pop_u32()?;
        session.set_object_id_ceiling(object_ceiling);
        session.set_event_id_ceiling(event_ceiling);
        self.pool.restore_id_ceiling(object_ceiling);
        self.events.restore_id_ceiling(event_ceiling);
        self.world.read(session)
    }

    fn deserialize_events(&mut self, session: &mut ReadSession<'_>) -> lockstep_snapshot::Result<()> {
        self.events.read(session)
    }

    fn set_economy_handler(&mut self, handler: Option<ObjectId>) {
        self.economy_handler = handler;
    }

    fn deserialize_player(
        &mut self,
        index: usize,
        session: &mut ReadSession<'_>,
    ) -> lockstep_snapshot::Result<()> {
        self.players[index] = Player::read(session)?;
        Ok(())
    }

    fn adopt(&mut self, population: RestoredPopulation) -> lockstep_snapshot::Result<()> {
        for object in population.objects {
            let previous = self.pool.insert(object);
            debug_assert!(previous.is_none(), "object restored over a live one");
        }
        self.events.adopt(population.events);
        Ok(())
    }

    fn live_object_count(&self) -> u32 {
        self.pool.live_count()
    }

    fn active_event_count(&self) -> u32 {
        self.events.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MapPoint;
    use crate::objects::Flag;
    use crate::settings::Objective;

    fn small() -> GameSettings {
        GameSettings {
            players: 1,
            map_width: 4,
            map_height: 4,
            ..GameSettings::default()
        }
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let settings = GameSettings {
            players: 9,
            ..GameSettings::default()
        };
        assert!(matches!(Game::new(settings), Err(SimError::InvalidSettings(_))));
    }

    #[test]
    fn empty_game_round_trips() {
        let game = Game::new(small()).unwrap();
        let snapshot = game.save(&SnapshotConfig::default()).unwrap();
        assert_eq!(snapshot.header().expected_objects, 1);
        let loaded = Game::load(small(), snapshot.bytes(), &SnapshotConfig::default()).unwrap();
        assert!(loaded.pool().is_empty());
        assert_eq!(loaded.state_hash().unwrap(), game.state_hash().unwrap());
    }

    #[test]
    fn flag_on_the_map_survives() {
        let mut game = Game::new(small()).unwrap();
        let pos = MapPoint::new(2, 1);
        let flag = game.pool_mut().spawn(|id| Flag::new(id, 0, pos));
        game.world_mut().node_mut(pos).obj = Some(flag);
        game.player_mut(0).flags.push(flag);

        let bytes = game.save(&SnapshotConfig::default()).unwrap().into_bytes();
        let loaded = Game::load(small(), &bytes, &SnapshotConfig::default()).unwrap();
        assert_eq!(loaded.world().node(pos).obj, Some(flag));
        assert_eq!(loaded.object::<Flag>(flag), game.object::<Flag>(flag));
    }

    #[test]
    fn a_flag_listed_as_building_is_rejected() {
        let mut game = Game::new(small()).unwrap();
        let flag = game.pool_mut().spawn(|id| Flag::new(id, 0, MapPoint::new(0, 0)));
        game.player_mut(0).buildings.push(flag);
        let bytes = game.save(&SnapshotConfig::default()).unwrap().into_bytes();
        let err = Game::load(small(), &bytes, &SnapshotConfig::default()).unwrap_err();
        assert!(matches!(err, SimError::UnexpectedObject { what: "building", .. }));
    }

    #[test]
    fn economy_mode_requires_matching_settings() {
        let settings = GameSettings {
            objective: Objective::EconomyMode,
            ..small()
        };
        let mut game = Game::new(settings.clone()).unwrap();
        let handler = game
            .pool_mut()
            .spawn(|id| EconomyHandler::new(id, 5000, vec![crate::map::Good::Gold], 1));
        game.set_economy_handler(Some(handler));
        let bytes = game.save(&SnapshotConfig::default()).unwrap().into_bytes();

        let loaded = Game::load(settings, &bytes, &SnapshotConfig::default()).unwrap();
        assert_eq!(loaded.economy_handler().map(|h| h.end_gf), Some(5000));
    }
}
