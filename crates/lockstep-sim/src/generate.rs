//! Deterministic random populations.
//!
//! [`generate`] fills a fresh [`Game`] with an economy per player and a
//! scattering of map decorations, using every object shape the simulation
//! knows. The same settings, population and seed always produce the same
//! game, and therefore the same snapshot bytes.

use lockstep_snapshot::{EventId, FowObject, ObjectId, ObjectType};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::game::Game;
use crate::map::{Direction, Good, MapPoint};
use crate::objects::{
    Building, ConstructionSite, EconomyHandler, Figure, Flag, NodeObject, RoadSegment, Ship,
    SoldierStats, Ware, NODE_OBJECTS,
};
use crate::settings::GameSettings;

/// How much to put on the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Population {
    /// Flags per player, chained by roads. Each flag gets a building or a
    /// construction site.
    pub flags_per_player: usize,
    /// Trees, granite, animals and other decorations.
    pub decorations: usize,
    pub ships_per_player: usize,
}

impl Default for Population {
    fn default() -> Self {
        Self {
            flags_per_player: 6,
            decorations: 40,
            ships_per_player: 1,
        }
    }
}

/// Generate a game with the default [`Population`].
pub fn generate(settings: GameSettings, seed: u64) -> Result<Game> {
    generate_with(settings, &Population::default(), seed)
}

/// Generate a game. Placement stops early when the map is full.
pub fn generate_with(settings: GameSettings, population: &Population, seed: u64) -> Result<Game> {
    let game = Game::new(settings)?;
    let mut gen = Generator {
        rng: Pcg64Mcg::seed_from_u64(seed),
        game,
    };
    gen.game.events_mut().set_current_gf(gen.rng.gen_range(0..10_000));
    let players = gen.game.players().len();
    for player in 0..players {
        gen.economy(player as u8, population);
    }
    for _ in 0..population.decorations {
        gen.decoration();
    }
    gen.catapult_stones();
    gen.fog_of_war();
    if gen.game.economy_mode() {
        gen.economy_handler(players);
    }
    tracing::debug!(
        seed,
        objects = gen.game.pool().len(),
        events = gen.game.events().len(),
        "population generated"
    );
    Ok(gen.game)
}

struct Generator {
    rng: Pcg64Mcg,
    game: Game,
}

impl Generator {
    fn free_point(&mut self) -> Option<MapPoint> {
        let (width, height) = (self.game.world().width(), self.game.world().height());
        for _ in 0..64 {
            let pt = MapPoint::new(self.rng.gen_range(0..width), self.rng.gen_range(0..height));
            if self.game.world().node(pt).obj.is_none() {
                return Some(pt);
            }
        }
        None
    }

    fn place(&mut self, pt: MapPoint, id: ObjectId) {
        self.game.world_mut().node_mut(pt).obj = Some(id);
    }

    /// Give `object` a timer in about half of the cases.
    fn maybe_timer(&mut self, object: ObjectId) -> Option<EventId> {
        if !self.rng.gen_bool(0.5) {
            return None;
        }
        let length = self.rng.gen_range(1..500);
        let kind = self.rng.gen_range(0..4);
        Some(self.game.events_mut().schedule(Some(object), length, kind))
    }

    fn random_good(&mut self) -> Good {
        Good::ALL[self.rng.gen_range(0..Good::COUNT)]
    }

    fn ware(&mut self, player: u8, location: ObjectId) -> ObjectId {
        let good = self.random_good();
        let next_dir = self
            .rng
            .gen_bool(0.5)
            .then(|| Direction::ALL[self.rng.gen_range(0..6)]);
        self.game.pool_mut().spawn(|id| Ware {
            next_dir,
            ..Ware::new(id, good, player, Some(location))
        })
    }

    fn figure(&mut self, object_type: ObjectType, player: u8, pos: MapPoint, home: Option<ObjectId>) -> ObjectId {
        let carried = self.rng.gen_bool(0.3).then(|| self.random_good());
        let job_state = self.rng.gen_range(0..8);
        let id = self.game.pool_mut().spawn(|id| Figure {
            home,
            carried,
            job_state,
            ..Figure::new(id, object_type, player, pos)
        });
        if Figure::is_soldier(object_type) {
            let stats = SoldierStats {
                rank: self.rng.gen_range(0..5),
                hitpoints: self.rng.gen_range(1..=10),
            };
            self.figure_mut(id).soldier = Some(stats);
        }
        let event = self.maybe_timer(id);
        self.figure_mut(id).event = event;
        self.game.world_mut().node_mut(pos).figures.push(id);
        id
    }

    fn figure_mut(&mut self, id: ObjectId) -> &mut Figure {
        self.game
            .pool_mut()
            .get_as_mut::<Figure>(id)
            .unwrap_or_else(|| unreachable!("{id} was spawned as a figure"))
    }

    /// A chain of flags joined by roads, each flag serving a building or a
    /// construction site, with the headquarters at the first flag.
    fn economy(&mut self, player: u8, population: &Population) {
        let mut flags = Vec::new();
        for _ in 0..population.flags_per_player {
            let Some(pt) = self.free_point() else { break };
            let flag = self.game.pool_mut().spawn(|id| Flag::new(id, player, pt));
            self.place(pt, flag);
            flags.push((flag, pt));
        }

        for pair in flags.windows(2) {
            let [(from, from_pt), (to, _)] = [pair[0], pair[1]];
            self.road(player, from, from_pt, to);
        }

        for (index, &(flag, flag_pt)) in flags.iter().enumerate() {
            let ware_count = self.rng.gen_range(0..3);
            let wares: Vec<ObjectId> = (0..ware_count).map(|_| self.ware(player, flag)).collect();
            self.flag_mut(flag).wares = wares;

            let Some(pt) = self.free_point() else { continue };
            if index == 0 {
                self.building(player, ObjectType::Headquarters, pt, flag, flag_pt);
            } else if self.rng.gen_bool(0.25) {
                self.site(player, pt, flag);
            } else {
                let kind = *ObjectType::BUILDINGS[1..]
                    .choose(&mut self.rng)
                    .unwrap_or(&ObjectType::UsualBuilding);
                let building = self.building(player, kind, pt, flag, flag_pt);
                if kind == ObjectType::HarborBuilding {
                    for _ in 0..population.ships_per_player {
                        self.ship(player, flag, building);
                    }
                }
            }
        }
        let player = usize::from(player);
        self.game.player_mut(player).flags = flags.into_iter().map(|(flag, _)| flag).collect();
        for amount in &mut self.game.player_mut(player).inventory {
            *amount = self.rng.gen_range(0..100);
        }
    }

    fn flag_mut(&mut self, id: ObjectId) -> &mut Flag {
        self.game
            .pool_mut()
            .get_as_mut::<Flag>(id)
            .unwrap_or_else(|| unreachable!("{id} was spawned as a flag"))
    }

    fn road(&mut self, player: u8, from: ObjectId, from_pt: MapPoint, to: ObjectId) {
        let steps = self.rng.gen_range(1..5);
        let route: Vec<Direction> = (0..steps)
            .map(|_| Direction::ALL[self.rng.gen_range(0..6)])
            .collect();
        let first = route[0];
        let back = route[route.len() - 1].opposite();
        let road = self
            .game
            .pool_mut()
            .spawn(|id| RoadSegment::new(id, from, to, route));
        let carrier = self.figure(ObjectType::Carrier, player, from_pt, Some(from));
        self.figure_mut(carrier).road = Some(road);
        if let Some(segment) = self.game.pool_mut().get_as_mut::<RoadSegment>(road) {
            segment.carriers[0] = Some(carrier);
        }
        // Loops back onto an already used direction are fine for a snapshot.
        self.flag_mut(from).routes[first as usize] = Some(road);
        self.flag_mut(to).routes[back as usize] = Some(road);
        self.game.player_mut(usize::from(player)).roads.push(road);
    }

    fn building(
        &mut self,
        player: u8,
        kind: ObjectType,
        pt: MapPoint,
        flag: ObjectId,
        flag_pt: MapPoint,
    ) -> ObjectId {
        let nation = self.rng.gen_range(0..4);
        let id = self.game.pool_mut().spawn(|id| Building {
            nation,
            flag: Some(flag),
            ..Building::new(id, kind, player, pt)
        });
        self.place(pt, id);
        self.flag_mut(flag).building = Some(id);

        let worker_kinds: &[ObjectType] = if kind == ObjectType::MilitaryBuilding {
            &ObjectType::FIGURES[..4]
        } else {
            &ObjectType::FIGURES[4..]
        };
        let workers: Vec<ObjectId> = (0..self.rng.gen_range(0..3))
            .filter_map(|_| worker_kinds.choose(&mut self.rng).copied())
            .collect::<Vec<_>>()
            .into_iter()
            .map(|ty| self.figure(ty, player, flag_pt, Some(id)))
            .collect();
        let wares: Vec<ObjectId> = (0..self.rng.gen_range(0..2)).map(|_| self.ware(player, id)).collect();
        let event = self.maybe_timer(id);
        let stock: Vec<u32> = if Building::keeps_stock(kind) {
            (0..Good::COUNT).map(|_| self.rng.gen_range(0..50)).collect()
        } else {
            Vec::new()
        };
        if let Some(building) = self.game.pool_mut().get_as_mut::<Building>(id) {
            building.workers = workers;
            building.wares = wares;
            building.event = event;
            building.stock = stock;
        }
        self.game.player_mut(usize::from(player)).buildings.push(id);
        id
    }

    fn site(&mut self, player: u8, pt: MapPoint, flag: ObjectId) {
        let building = ObjectType::BUILDINGS[self.rng.gen_range(1..ObjectType::BUILDINGS.len())] as u16;
        let progress = self.rng.gen_range(0..100);
        let id = self.game.pool_mut().spawn(|id| ConstructionSite {
            building,
            progress,
            flag: Some(flag),
            ..ConstructionSite::new(id, ObjectType::BuildingSite, player, pt)
        });
        self.place(pt, id);
        self.flag_mut(flag).building = Some(id);
        let ordered: Vec<ObjectId> = (0..self.rng.gen_range(0..3)).map(|_| self.ware(player, flag)).collect();
        let builder = self.figure(ObjectType::Builder, player, pt, Some(id));
        if let Some(site) = self.game.pool_mut().get_as_mut::<ConstructionSite>(id) {
            site.ordered = ordered;
            site.builder = Some(builder);
        }
        self.game.player_mut(usize::from(player)).sites.push(id);

        // A ship under construction on the shore next to it.
        if self.rng.gen_bool(0.3) {
            if let Some(shore) = self.free_point() {
                let ship_site = self.game.pool_mut().spawn(|id| {
                    ConstructionSite::new(id, ObjectType::ShipBuildingSite, player, shore)
                });
                self.place(shore, ship_site);
                self.game.player_mut(usize::from(player)).sites.push(ship_site);
            }
        }
    }

    fn ship(&mut self, player: u8, harbor_flag: ObjectId, harbor: ObjectId) {
        let (width, height) = (self.game.world().width(), self.game.world().height());
        let pos = MapPoint::new(self.rng.gen_range(0..width), self.rng.gen_range(0..height));
        let name = format!("Ship {}", self.rng.gen_range(1..1000));
        let id = self.game.pool_mut().spawn(|id| Ship {
            home_flag: Some(harbor_flag),
            ..Ship::new(id, player, name, pos)
        });
        let cargo: Vec<ObjectId> = (0..self.rng.gen_range(0..4)).map(|_| self.ware(player, id)).collect();
        let passengers: Vec<ObjectId> = (0..self.rng.gen_range(0..2))
            .map(|_| self.figure(ObjectType::PassiveWorker, player, pos, Some(harbor)))
            .collect();
        let event = self.maybe_timer(id);
        if let Some(ship) = self.game.pool_mut().get_as_mut::<Ship>(id) {
            ship.cargo = cargo;
            ship.passengers = passengers;
            ship.event = event;
        }
        if self.rng.gen_bool(0.5) {
            self.flag_mut(harbor_flag).landing_ship = Some(id);
        }
        self.game.player_mut(usize::from(player)).ships.push(id);
    }

    fn decoration(&mut self) {
        let Some(pt) = self.free_point() else { return };
        let kinds = &NODE_OBJECTS[..NODE_OBJECTS.len() - 2];
        let kind = kinds[self.rng.gen_range(0..kinds.len())];
        let variant = self.rng.gen_range(0..12);
        let state = self.rng.gen_range(0..6);
        let id = self.game.pool_mut().spawn(|id| NodeObject {
            variant,
            state,
            ..NodeObject::new(id, kind, pt)
        });
        self.place(pt, id);
        if kind == ObjectType::Fighting {
            let players = self.game.players().len() as u8;
            let participants: Vec<ObjectId> = (0..2)
                .map(|side| self.figure(ObjectType::Attacker, side % players, pt, None))
                .collect();
            if let Some(fight) = self.game.pool_mut().get_as_mut::<NodeObject>(id) {
                fight.participants = participants;
            }
        }
        let event = self.maybe_timer(id);
        if let Some(object) = self.game.pool_mut().get_as_mut::<NodeObject>(id) {
            object.event = event;
        }
    }

    /// Stones in flight and charburner piles, which the decoration pass
    /// leaves out.
    fn catapult_stones(&mut self) {
        let (width, height) = (self.game.world().width(), self.game.world().height());
        for _ in 0..self.rng.gen_range(0..3) {
            let pos = MapPoint::new(self.rng.gen_range(0..width), self.rng.gen_range(0..height));
            let stone = self
                .game
                .pool_mut()
                .spawn(|id| NodeObject::new(id, ObjectType::CatapultStone, pos));
            let event = self.maybe_timer(stone);
            if let Some(object) = self.game.pool_mut().get_as_mut::<NodeObject>(stone) {
                object.event = event;
            }
            self.game.world_mut().catapult_stones.push(stone);
        }
        if let Some(pt) = self.free_point() {
            let pile = self
                .game
                .pool_mut()
                .spawn(|id| NodeObject::new(id, ObjectType::CharburnerPile, pt));
            self.place(pt, pile);
        }
    }

    /// Every player remembers a few nodes as they once were.
    fn fog_of_war(&mut self) {
        let points: Vec<MapPoint> = self.game.world().points().collect();
        let players = self.game.players().len();
        for pt in points {
            for player in 0..players {
                if !self.rng.gen_bool(0.05) {
                    continue;
                }
                let object = match self.rng.gen_range(0..6) {
                    0 => None,
                    1 => Some(FowObject::Building {
                        building: self.rng.gen_range(1..7),
                        nation: self.rng.gen_range(0..4),
                    }),
                    2 => Some(FowObject::BuildingSite {
                        planing: self.rng.gen_bool(0.5),
                        building: self.rng.gen_range(1..7),
                        nation: self.rng.gen_range(0..4),
                        build_progress: self.rng.gen_range(0..100),
                    }),
                    3 => Some(FowObject::Flag {
                        player: self.rng.gen_range(0..8),
                        flag_type: self.rng.gen_range(0..3),
                    }),
                    4 => Some(FowObject::Tree {
                        tree_type: self.rng.gen_range(0..9),
                        size: self.rng.gen_range(0..4),
                    }),
                    _ => Some(FowObject::Granite {
                        granite_type: self.rng.gen_range(0..2),
                        state: self.rng.gen_range(0..6),
                    }),
                };
                let last_seen_gf = self.rng.gen_range(1..10_000);
                let memory = &mut self.game.world_mut().node_mut(pt).fow[player];
                memory.last_seen_gf = last_seen_gf;
                memory.object = object;
            }
        }
    }

    fn economy_handler(&mut self, players: usize) {
        let mut goods: Vec<Good> = Good::ALL.to_vec();
        goods.shuffle(&mut self.rng);
        goods.truncate(3);
        let end_gf = self.rng.gen_range(10_000..100_000);
        let id = self
            .game
            .pool_mut()
            .spawn(|id| EconomyHandler::new(id, end_gf, goods, players));
        let amounts: Vec<Vec<u32>> = (0..players)
            .map(|_| (0..3).map(|_| self.rng.gen_range(0..200)).collect())
            .collect();
        let current = self.game.events().current_gf();
        let event = self
            .game
            .events_mut()
            .schedule(Some(id), end_gf.saturating_sub(current), 0);
        if let Some(handler) = self.game.pool_mut().get_as_mut::<EconomyHandler>(id) {
            handler.amounts = amounts;
            handler.event = Some(event);
        }
        self.game.set_economy_handler(Some(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Objective;

    #[test]
    fn same_seed_same_game() {
        let a = generate(GameSettings::default(), 7).unwrap();
        let b = generate(GameSettings::default(), 7).unwrap();
        assert_eq!(a.state_hash().unwrap(), b.state_hash().unwrap());
    }

    #[test]
    fn different_seeds_differ() {
        let a = generate(GameSettings::default(), 1).unwrap();
        let b = generate(GameSettings::default(), 2).unwrap();
        assert_ne!(a.state_hash().unwrap(), b.state_hash().unwrap());
    }

    #[test]
    fn economy_mode_adds_the_handler() {
        let settings = GameSettings {
            objective: Objective::EconomyMode,
            ..GameSettings::default()
        };
        let game = generate(settings, 3).unwrap();
        let handler = game.economy_handler().unwrap();
        assert_eq!(handler.goods.len(), 3);
        assert_eq!(handler.amounts.len(), 2);
        assert!(handler.event.is_some());
    }

    #[test]
    fn every_player_gets_a_headquarters() {
        let game = generate(GameSettings::default(), 11).unwrap();
        for player in game.players() {
            let hq = player.buildings[0];
            let building = game.object::<Building>(hq).unwrap();
            assert_eq!(building.object_type, ObjectType::Headquarters);
            assert_eq!(building.stock.len(), Good::COUNT);
        }
    }
}
