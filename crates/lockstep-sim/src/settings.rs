//! Game settings shared by every peer of a match.
//!
//! Settings are not part of a snapshot: both sides of a save/load or resync
//! must agree on them beforehand, exactly like the map and player list.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

// ---------------------------------------------------------------------------
// Objective
// ---------------------------------------------------------------------------

/// Win condition of a match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    #[default]
    None,
    Conquer,
    /// Collect the most of a set of goods before a deadline. Adds the
    /// economy-mode handler to the simulation.
    EconomyMode,
}

// ---------------------------------------------------------------------------
// GameSettings
// ---------------------------------------------------------------------------

/// Match configuration.
///
/// ```
/// use lockstep_sim::settings::GameSettings;
///
/// let settings =
///     GameSettings::from_json(r#"{ "players": 3, "objective": "economy_mode" }"#).unwrap();
/// assert_eq!(settings.players, 3);
/// assert!(settings.economy_mode());
/// assert_eq!(settings.map_width, GameSettings::default().map_width);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Number of players, 1 to 8.
    pub players: u8,
    pub objective: Objective,
    /// Map width in nodes. Must be even and non-zero.
    pub map_width: u16,
    /// Map height in nodes. Must be even and non-zero.
    pub map_height: u16,
}

impl Default for GameSettings {
    /// Two players on a 32x32 map, no objective.
    fn default() -> Self {
        Self {
            players: 2,
            objective: Objective::None,
            map_width: 32,
            map_height: 32,
        }
    }
}

impl GameSettings {
    pub fn economy_mode(&self) -> bool {
        self.objective == Objective::EconomyMode
    }

    /// Parse and validate settings from JSON. Missing fields take their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate().map_err(SimError::InvalidSettings)?;
        Ok(settings)
    }

    /// Check the ranges documented on each field.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(1..=8).contains(&self.players) {
            return Err(format!("player count {} outside 1..=8", self.players));
        }
        for (name, len) in [("width", self.map_width), ("height", self.map_height)] {
            if len == 0 || len % 2 != 0 {
                return Err(format!("map {name} {len} must be even and non-zero"));
            }
        }
        Ok(())
    }
}
