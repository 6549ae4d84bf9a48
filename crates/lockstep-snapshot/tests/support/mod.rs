//! Minimal collaborator model shared by the integration tests.

#![allow(dead_code)]

use std::any::Any;
use std::collections::BTreeMap;

use lockstep_snapshot::prelude::*;
use lockstep_snapshot::{RestoredPopulation, Result};

// -- test object -------------------------------------------------------------

/// A generic graph node usable under several tags.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: ObjectId,
    pub object_type: ObjectType,
    pub label: String,
    pub links: Vec<ObjectId>,
    pub next: Option<ObjectId>,
    pub event: Option<EventId>,
}

impl Node {
    pub fn new(id: ObjectId, object_type: ObjectType, label: &str) -> Self {
        Self {
            id,
            object_type,
            label: label.to_owned(),
            links: Vec::new(),
            next: None,
            event: None,
        }
    }
}

impl GameObject for Node {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn object_type(&self) -> ObjectType {
        self.object_type
    }

    fn serialize(&self, session: &mut WriteSession<'_>) -> Result<()> {
        session.push_string(&self.label);
        session.put_object_refs(&self.links, false)?;
        session.put_object_ref(self.next, false)?;
        session.put_event_ref(self.event)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl FromSession for Node {
    fn from_session(
        session: &mut ReadSession<'_>,
        id: ObjectId,
        object_type: ObjectType,
    ) -> Result<Self> {
        Ok(Self {
            id,
            object_type,
            label: session.pop_string()?,
            links: session.get_objects()?,
            next: session.get_object()?,
            event: session.get_event()?,
        })
    }
}

pub const NODE_TAGS: &[ObjectType] = &[
    ObjectType::Sign,
    ObjectType::Tree,
    ObjectType::Granite,
    ObjectType::Skeleton,
    ObjectType::EconomyModeHandler,
];

pub fn factory() -> ObjectFactory {
    let mut factory = ObjectFactory::new();
    factory.register_all::<Node>(NODE_TAGS);
    factory
}

// -- test simulation ---------------------------------------------------------

/// Pool + scheduler + a root list standing in for the world grid.
#[derive(Debug, Default)]
pub struct TestSim {
    pub pool: ObjectPool,
    pub events: BTreeMap<EventId, GameEvent>,
    pub event_ids: IdCounter,
    pub roots: Vec<Option<ObjectId>>,
    pub economy_mode: bool,
    pub economy_handler: Option<ObjectId>,
    pub players: Vec<Option<ObjectId>>,
}

impl TestSim {
    pub fn new(players: usize, economy_mode: bool) -> Self {
        Self {
            players: vec![None; players],
            economy_mode,
            ..Self::default()
        }
    }

    /// An empty simulation with the same settings, ready to be restored into.
    pub fn blank_like(&self) -> Self {
        Self::new(self.players.len(), self.economy_mode)
    }

    pub fn spawn(&mut self, object_type: ObjectType, label: &str) -> ObjectId {
        self.pool.spawn(|id| Node::new(id, object_type, label))
    }

    pub fn node(&self, id: ObjectId) -> &Node {
        self.pool.get_as::<Node>(id).unwrap()
    }

    pub fn node_mut(&mut self, id: ObjectId) -> &mut Node {
        self.pool.get_as_mut::<Node>(id).unwrap()
    }

    pub fn schedule(&mut self, object: Option<ObjectId>, start_gf: u32, length: u32) -> EventId {
        let id = self.event_ids.next_event();
        self.events.insert(
            id,
            GameEvent {
                id,
                object,
                start_gf,
                length,
                kind: 1,
            },
        );
        id
    }

    /// All nodes in id order, for whole-graph comparison.
    pub fn nodes(&self) -> Vec<Node> {
        self.pool
            .iter()
            .map(|(_, o)| o.downcast_ref::<Node>().unwrap().clone())
            .collect()
    }
}

impl SnapshotSource for TestSim {
    fn objects(&self) -> &dyn ObjectLookup {
        &self.pool
    }

    fn events(&self) -> &dyn EventLookup {
        self
    }

    fn live_object_count(&self) -> u32 {
        self.pool.live_count()
    }

    fn active_event_count(&self) -> u32 {
        self.events.len() as u32
    }

    fn economy_mode(&self) -> bool {
        self.economy_mode
    }

    fn economy_handler(&self) -> Option<ObjectId> {
        self.economy_handler
    }

    fn player_count(&self) -> usize {
        self.players.len()
    }

    fn serialize_world(&self, session: &mut WriteSession<'_>) -> Result<()> {
        session.push_u32(self.pool.id_ceiling());
        session.push_u32(self.event_ids.ceiling());
        session.push_container_size(self.roots.len());
        for &root in &self.roots {
            session.put_object_ref(root, false)?;
        }
        Ok(())
    }

    fn serialize_events(&self, session: &mut WriteSession<'_>) -> Result<()> {
        session.push_container_size(self.events.len());
        for event in self.events.values() {
            session.put_event(Some(event))?;
        }
        Ok(())
    }

    fn serialize_player(&self, index: usize, session: &mut WriteSession<'_>) -> Result<()> {
        session.put_object_ref(self.players[index], false)
    }
}

impl EventLookup for TestSim {
    fn event(&self, id: EventId) -> Option<&GameEvent> {
        self.events.get(&id)
    }

    fn event_id_ceiling(&self) -> u32 {
        self.event_ids.ceiling()
    }
}

impl SnapshotTarget for TestSim {
    fn economy_mode(&self) -> bool {
        self.economy_mode
    }

    fn player_count(&self) -> usize {
        self.players.len()
    }

    fn deserialize_world(&mut self, session: &mut ReadSession<'_>) -> Result<()> {
        let object_ceiling = session.pop_u32()?;
        let event_ceiling = session.pop_u32()?;
        session.set_object_id_ceiling(object_ceiling);
        session.set_event_id_ceiling(event_ceiling);
        self.pool.restore_id_ceiling(object_ceiling);
        self.event_ids.restore(event_ceiling);
        let len = session.pop_container_size()?;
        self.roots = (0..len)
            .map(|_| session.get_object())
            .collect::<Result<_>>()?;
        Ok(())
    }

    fn deserialize_events(&mut self, session: &mut ReadSession<'_>) -> Result<()> {
        let len = session.pop_container_size()?;
        for _ in 0..len {
            session.get_event()?;
        }
        Ok(())
    }

    fn set_economy_handler(&mut self, handler: Option<ObjectId>) {
        self.economy_handler = handler;
    }

    fn deserialize_player(&mut self, index: usize, session: &mut ReadSession<'_>) -> Result<()> {
        self.players[index] = session.get_object()?;
        Ok(())
    }

    fn adopt(&mut self, population: RestoredPopulation) -> Result<()> {
        for object in population.objects {
            self.pool.insert(object);
        }
        for event in population.events {
            self.events.insert(event.id, event);
        }
        Ok(())
    }

    fn live_object_count(&self) -> u32 {
        self.pool.live_count()
    }

    fn active_event_count(&self) -> u32 {
        self.events.len() as u32
    }
}

// -- fixtures ----------------------------------------------------------------

/// Three roots sharing a hub, a two-node cycle, a self loop, and an event
/// that points back at the node holding it.
pub fn sample_sim() -> TestSim {
    let mut sim = TestSim::new(2, false);
    let hub = sim.spawn(ObjectType::Sign, "hub");
    let a = sim.spawn(ObjectType::Tree, "a");
    let b = sim.spawn(ObjectType::Granite, "b");
    let selfish = sim.spawn(ObjectType::Skeleton, "self");
    let timed = sim.spawn(ObjectType::Tree, "timed");

    sim.node_mut(a).next = Some(b);
    sim.node_mut(b).next = Some(a);
    sim.node_mut(a).links = vec![hub];
    sim.node_mut(b).links = vec![hub, hub];
    sim.node_mut(selfish).next = Some(selfish);

    let ev = sim.schedule(Some(timed), 100, 20);
    sim.node_mut(timed).event = Some(ev);
    sim.schedule(None, 5, 1);

    sim.roots = vec![Some(a), None, Some(selfish), Some(hub)];
    sim.players = vec![Some(timed), Some(b)];
    sim
}

/// Snapshot `sim`, restore it into a blank twin, and return the twin.
pub fn round_trip(sim: &TestSim) -> TestSim {
    let config = SnapshotConfig::default();
    let snapshot = make_snapshot(sim, &config).unwrap();
    let mut restored = sim.blank_like();
    read_snapshot(snapshot.bytes(), &mut restored, &factory(), &config).unwrap();
    restored
}
