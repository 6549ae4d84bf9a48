//! The map grid and what each player remembers of it.

use lockstep_snapshot::{FowObject, ObjectId, ObjectType, ReadSession, Result, WriteSession};

use crate::map::MapPoint;

// ---------------------------------------------------------------------------
// Fog of war
// ---------------------------------------------------------------------------

/// What one player remembers about one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FowMemory {
    /// Frame of the last sighting, `0` if never seen.
    pub last_seen_gf: u32,
    pub object: Option<FowObject>,
}

impl FowMemory {
    fn write(&self, session: &mut WriteSession<'_>) {
        session.push_u32(self.last_seen_gf);
        session.put_fow(self.object.as_ref());
    }

    fn read(session: &mut ReadSession<'_>) -> Result<Self> {
        Ok(Self {
            last_seen_gf: session.pop_u32()?,
            object: session.get_fow()?,
        })
    }
}

// ---------------------------------------------------------------------------
// MapNode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapNode {
    /// The flag, building or decoration occupying the node.
    pub obj: Option<ObjectId>,
    /// Figures currently standing on or walking through the node.
    pub figures: Vec<ObjectId>,
    /// One memory per player.
    pub fow: Vec<FowMemory>,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// A wrapping hex map stored row by row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct World {
    width: u16,
    height: u16,
    nodes: Vec<MapNode>,
    /// Stones in flight, which belong to no node.
    pub catapult_stones: Vec<ObjectId>,
}

impl World {
    pub fn new(width: u16, height: u16, players: usize) -> Self {
        let node = MapNode {
            fow: vec![FowMemory::default(); players],
            ..MapNode::default()
        };
        Self {
            width,
            height,
            nodes: vec![node; usize::from(width) * usize::from(height)],
            catapult_stones: Vec::new(),
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    fn index(&self, pt: MapPoint) -> usize {
        debug_assert!(pt.x < self.width && pt.y < self.height, "{pt:?} is off the map");
        usize::from(pt.y) * usize::from(self.width) + usize::from(pt.x)
    }

    pub fn node(&self, pt: MapPoint) -> &MapNode {
        &self.nodes[self.index(pt)]
    }

    pub fn node_mut(&mut self, pt: MapPoint) -> &mut MapNode {
        let index = self.index(pt);
        &mut self.nodes[index]
    }

    /// Every point of the map in storage order.
    pub fn points(&self) -> impl Iterator<Item = MapPoint> {
        let (width, height) = (self.width, self.height);
        (0..height).flat_map(move |y| (0..width).map(move |x| MapPoint::new(x, y)))
    }

    pub(crate) fn write(&self, session: &mut WriteSession<'_>) -> Result<()> {
        for node in &self.nodes {
            session.put_object_ref(node.obj, false)?;
            session.put_object_refs(&node.figures, false)?;
            for memory in &node.fow {
                memory.write(session);
            }
        }
        session.put_object_refs(&self.catapult_stones, true)
    }

    pub(crate) fn read(&mut self, session: &mut ReadSession<'_>) -> Result<()> {
        for node in &mut self.nodes {
            node.obj = session.get_object()?;
            node.figures = session.get_objects()?;
            for memory in &mut node.fow {
                *memory = FowMemory::read(session)?;
            }
        }
        self.catapult_stones = session.get_objects_as(ObjectType::CatapultStone)?;
        Ok(())
    }
}
