//! Lockstep Sim -- a reference simulation for the snapshot engine.
//!
//! This crate supplies the collaborators the snapshot engine drives: the
//! concrete object shapes, the map with its fog-of-war memory, the event
//! scheduler, the players and the economy-mode handler. It carries no
//! gameplay beyond what is needed to build, save, load and compare states.
//!
//! # Quick Start
//!
//! ```
//! use lockstep_sim::prelude::*;
//!
//! let settings = GameSettings::default();
//! let game = generate(settings.clone(), 42).unwrap();
//!
//! let snapshot = game.save(&SnapshotConfig::default()).unwrap();
//! let loaded = Game::load(settings, snapshot.bytes(), &SnapshotConfig::default()).unwrap();
//!
//! assert_eq!(loaded.state_hash().unwrap(), snapshot.state_hash());
//! ```

#![deny(unsafe_code)]

pub mod error;
pub mod events;
pub mod game;
pub mod generate;
pub mod map;
pub mod objects;
pub mod player;
pub mod resync;
pub mod settings;
pub mod world;

pub use error::{Result, SimError};
pub use events::EventManager;
pub use game::Game;
pub use generate::{generate, generate_with, Population};
pub use map::{Direction, Good, MapPoint};
pub use player::Player;
pub use resync::{first_divergence, resync_from_peer, PeerSnapshot, ResyncReport};
pub use settings::{GameSettings, Objective};
pub use world::{FowMemory, MapNode, World};

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::error::SimError;
    pub use crate::game::Game;
    pub use crate::generate::{generate, generate_with, Population};
    pub use crate::map::{Direction, Good, MapPoint};
    pub use crate::objects::{
        Building, ConstructionSite, EconomyHandler, Figure, Flag, NodeObject, RoadSegment, Ship,
        Ware,
    };
    pub use crate::resync::{resync_from_peer, PeerSnapshot};
    pub use crate::settings::{GameSettings, Objective};
    pub use lockstep_snapshot::prelude::*;
}
