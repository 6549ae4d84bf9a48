//! Fog-of-war memory objects.
//!
//! A [`FowObject`] records how a map node last looked to a player who can no
//! longer see it. These snapshots are identity-free: nothing references
//! them, so they bypass the registries entirely and are written as a one
//! byte tag followed by the variant's fields.

use lockstep_stream::WireEnum;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// FowType
// ---------------------------------------------------------------------------

/// Wire tag of a fog-of-war object. `Nothing` encodes an empty memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FowType {
    Nothing = 0,
    Building = 1,
    BuildingSite = 2,
    Flag = 3,
    Tree = 4,
    Granite = 5,
}

impl WireEnum for FowType {
    const MAX_RAW: u16 = FowType::Granite as u16;

    fn to_raw(self) -> u16 {
        self as u16
    }

    fn from_raw(raw: u16) -> Option<Self> {
        Some(match raw {
            0 => FowType::Nothing,
            1 => FowType::Building,
            2 => FowType::BuildingSite,
            3 => FowType::Flag,
            4 => FowType::Tree,
            5 => FowType::Granite,
            _ => return None,
        })
    }
}

// ---------------------------------------------------------------------------
// FowObject
// ---------------------------------------------------------------------------

/// Remembered appearance of a map node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FowObject {
    Building {
        building: u8,
        nation: u8,
    },
    BuildingSite {
        planing: bool,
        building: u8,
        nation: u8,
        build_progress: u8,
    },
    Flag {
        player: u8,
        flag_type: u8,
    },
    Tree {
        tree_type: u8,
        size: u8,
    },
    Granite {
        granite_type: u8,
        state: u8,
    },
}

impl FowObject {
    pub fn fow_type(&self) -> FowType {
        match self {
            FowObject::Building { .. } => FowType::Building,
            FowObject::BuildingSite { .. } => FowType::BuildingSite,
            FowObject::Flag { .. } => FowType::Flag,
            FowObject::Tree { .. } => FowType::Tree,
            FowObject::Granite { .. } => FowType::Granite,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for raw in 0..=FowType::MAX_RAW {
            let ty = FowType::from_raw(raw).unwrap();
            assert_eq!(ty.to_raw(), raw);
        }
        assert_eq!(FowType::from_raw(6), None);
    }

    #[test]
    fn variant_reports_its_tag() {
        let tree = FowObject::Tree {
            tree_type: 2,
            size: 3,
        };
        assert_eq!(tree.fow_type(), FowType::Tree);
    }
}
