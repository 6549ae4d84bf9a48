//! The closed set of object type tags.
//!
//! Every polymorphic simulation object carries an [`ObjectType`]. The tag is
//! written as a `u16` in front of an object's payload whenever the reader
//! cannot know the type from context, and it selects the constructor in the
//! [`ObjectFactory`](crate::factory::ObjectFactory).
//!
//! Two values are sentinels and never name a constructible object:
//! [`ObjectType::Nothing`] (raw `0`) and [`ObjectType::Unknown`] ("read the
//! tag from the stream").

use std::fmt;

use lockstep_stream::WireEnum;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ObjectType
// ---------------------------------------------------------------------------

/// Discriminant of a simulation object shape.
///
/// Raw values are contiguous and part of the wire format: never reorder,
/// only append before [`ObjectType::Unknown`] together with a format
/// version bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u16)]
pub enum ObjectType {
    Nothing = 0,

    // Buildings
    Headquarters = 1,
    MilitaryBuilding = 2,
    Storehouse = 3,
    UsualBuilding = 4,
    Shipyard = 5,
    HarborBuilding = 6,

    // Figures
    AggressiveDefender = 7,
    Attacker = 8,
    Defender = 9,
    PassiveSoldier = 10,
    PassiveWorker = 11,
    Wellguy = 12,
    Carrier = 13,
    Woodcutter = 14,
    Fisher = 15,
    Forester = 16,
    Carpenter = 17,
    Stonemason = 18,
    Hunter = 19,
    Farmer = 20,
    Miller = 21,
    Baker = 22,
    Butcher = 23,
    Miner = 24,
    Brewer = 25,
    PigBreeder = 26,
    DonkeyBreeder = 27,
    IronFounder = 28,
    Minter = 29,
    Metalworker = 30,
    Armorer = 31,
    Builder = 32,
    Planer = 33,
    Geologist = 34,
    Shipwright = 35,
    FreeScout = 36,
    LookoutScout = 37,
    WarehouseWorker = 38,
    CatapultMan = 39,
    Charburner = 40,
    TradeDonkey = 41,
    TradeLeader = 42,

    // Map objects
    Extension = 43,
    BuildingSite = 44,
    EnvObject = 45,
    Fire = 46,
    BurnedWarehouse = 47,
    Flag = 48,
    Grainfield = 49,
    Granite = 50,
    Sign = 51,
    Skeleton = 52,
    StaticObject = 53,
    DisappearingEnvObject = 54,
    Tree = 55,
    Animal = 56,
    Fighting = 57,

    // Transport, logistics and economy
    RoadSegment = 58,
    Ware = 59,
    CatapultStone = 60,
    Ship = 61,
    ShipBuildingSite = 62,
    CharburnerPile = 63,
    EconomyModeHandler = 64,

    Unknown = 65,
}

use ObjectType as T;

/// All tags in raw-value order; `ALL[raw]` has discriminant `raw`.
const ALL: [ObjectType; 66] = [
    T::Nothing,
    T::Headquarters,
    T::MilitaryBuilding,
    T::Storehouse,
    T::UsualBuilding,
    T::Shipyard,
    T::HarborBuilding,
    T::AggressiveDefender,
    T::Attacker,
    T::Defender,
    T::PassiveSoldier,
    T::PassiveWorker,
    T::Wellguy,
    T::Carrier,
    T::Woodcutter,
    T::Fisher,
    T::Forester,
    T::Carpenter,
    T::Stonemason,
    T::Hunter,
    T::Farmer,
    T::Miller,
    T::Baker,
    T::Butcher,
    T::Miner,
    T::Brewer,
    T::PigBreeder,
    T::DonkeyBreeder,
    T::IronFounder,
    T::Minter,
    T::Metalworker,
    T::Armorer,
    T::Builder,
    T::Planer,
    T::Geologist,
    T::Shipwright,
    T::FreeScout,
    T::LookoutScout,
    T::WarehouseWorker,
    T::CatapultMan,
    T::Charburner,
    T::TradeDonkey,
    T::TradeLeader,
    T::Extension,
    T::BuildingSite,
    T::EnvObject,
    T::Fire,
    T::BurnedWarehouse,
    T::Flag,
    T::Grainfield,
    T::Granite,
    T::Sign,
    T::Skeleton,
    T::StaticObject,
    T::DisappearingEnvObject,
    T::Tree,
    T::Animal,
    T::Fighting,
    T::RoadSegment,
    T::Ware,
    T::CatapultStone,
    T::Ship,
    T::ShipBuildingSite,
    T::CharburnerPile,
    T::EconomyModeHandler,
    T::Unknown,
];

impl ObjectType {
    /// Buildings owned by a player and attached to a flag.
    pub const BUILDINGS: &'static [ObjectType] = &[
        T::Headquarters,
        T::MilitaryBuilding,
        T::Storehouse,
        T::UsualBuilding,
        T::Shipyard,
        T::HarborBuilding,
    ];

    /// Walking figures, one tag per profession.
    pub const FIGURES: &'static [ObjectType] = &[
        T::AggressiveDefender,
        T::Attacker,
        T::Defender,
        T::PassiveSoldier,
        T::PassiveWorker,
        T::Wellguy,
        T::Carrier,
        T::Woodcutter,
        T::Fisher,
        T::Forester,
        T::Carpenter,
        T::Stonemason,
        T::Hunter,
        T::Farmer,
        T::Miller,
        T::Baker,
        T::Butcher,
        T::Miner,
        T::Brewer,
        T::PigBreeder,
        T::DonkeyBreeder,
        T::IronFounder,
        T::Minter,
        T::Metalworker,
        T::Armorer,
        T::Builder,
        T::Planer,
        T::Geologist,
        T::Shipwright,
        T::FreeScout,
        T::LookoutScout,
        T::WarehouseWorker,
        T::CatapultMan,
        T::Charburner,
        T::TradeDonkey,
        T::TradeLeader,
    ];

    /// Every constructible tag, i.e. everything except the two sentinels.
    pub fn concrete() -> &'static [ObjectType] {
        &ALL[1..ALL.len() - 1]
    }

    /// Returns `false` for [`Nothing`](Self::Nothing) and
    /// [`Unknown`](Self::Unknown).
    #[inline]
    pub fn is_concrete(self) -> bool {
        !matches!(self, T::Nothing | T::Unknown)
    }

    #[inline]
    pub fn is_building(self) -> bool {
        Self::BUILDINGS.contains(&self)
    }

    #[inline]
    pub fn is_figure(self) -> bool {
        Self::FIGURES.contains(&self)
    }
}

impl WireEnum for ObjectType {
    const MAX_RAW: u16 = T::Unknown as u16;

    #[inline]
    fn to_raw(self) -> u16 {
        self as u16
    }

    #[inline]
    fn from_raw(raw: u16) -> Option<Self> {
        ALL.get(usize::from(raw)).copied()
    }
}

impl ObjectType {
    /// Short human-readable name, used in logs and error messages.
    pub fn label(self) -> &'static str {
        match self {
            T::Nothing => "nothing",
            T::Headquarters => "headquarters",
            T::MilitaryBuilding => "military building",
            T::Storehouse => "storehouse",
            T::UsualBuilding => "workshop",
            T::Shipyard => "shipyard",
            T::HarborBuilding => "harbor",
            T::AggressiveDefender => "aggressive defender",
            T::Attacker => "attacker",
            T::Defender => "defender",
            T::PassiveSoldier => "soldier",
            T::PassiveWorker => "idle worker",
            T::Wellguy => "well digger",
            T::Carrier => "carrier",
            T::Woodcutter => "woodcutter",
            T::Fisher => "fisher",
            T::Forester => "forester",
            T::Carpenter => "carpenter",
            T::Stonemason => "stonemason",
            T::Hunter => "hunter",
            T::Farmer => "farmer",
            T::Miller => "miller",
            T::Baker => "baker",
            T::Butcher => "butcher",
            T::Miner => "miner",
            T::Brewer => "brewer",
            T::PigBreeder => "pig breeder",
            T::DonkeyBreeder => "donkey breeder",
            T::IronFounder => "iron founder",
            T::Minter => "minter",
            T::Metalworker => "metalworker",
            T::Armorer => "armorer",
            T::Builder => "builder",
            T::Planer => "planer",
            T::Geologist => "geologist",
            T::Shipwright => "shipwright",
            T::FreeScout => "scout",
            T::LookoutScout => "lookout scout",
            T::WarehouseWorker => "warehouse worker",
            T::CatapultMan => "catapult operator",
            T::Charburner => "charburner",
            T::TradeDonkey => "trade donkey",
            T::TradeLeader => "trade leader",
            T::Extension => "building extension",
            T::BuildingSite => "building site",
            T::EnvObject => "environment object",
            T::Fire => "fire",
            T::BurnedWarehouse => "burned warehouse",
            T::Flag => "flag",
            T::Grainfield => "grainfield",
            T::Granite => "granite",
            T::Sign => "sign",
            T::Skeleton => "skeleton",
            T::StaticObject => "static object",
            T::DisappearingEnvObject => "vanishing environment object",
            T::Tree => "tree",
            T::Animal => "animal",
            T::Fighting => "fight",
            T::RoadSegment => "road segment",
            T::Ware => "ware",
            T::CatapultStone => "catapult stone",
            T::Ship => "ship",
            T::ShipBuildingSite => "ship building site",
            T::CharburnerPile => "charburner pile",
            T::EconomyModeHandler => "economy mode handler",
            T::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_discriminants() {
        for (raw, ty) in ALL.iter().enumerate() {
            assert_eq!(ty.to_raw() as usize, raw, "{ty:?} is out of place");
            assert_eq!(ObjectType::from_raw(raw as u16), Some(*ty));
        }
        assert_eq!(ObjectType::from_raw(ObjectType::MAX_RAW + 1), None);
    }

    #[test]
    fn sentinels_are_not_concrete() {
        assert!(!ObjectType::Nothing.is_concrete());
        assert!(!ObjectType::Unknown.is_concrete());
        assert_eq!(ObjectType::concrete().len(), 64);
        assert!(ObjectType::concrete().iter().all(|t| t.is_concrete()));
    }

    #[test]
    fn categories_are_disjoint() {
        for ty in ObjectType::BUILDINGS {
            assert!(ty.is_building());
            assert!(!ty.is_figure());
        }
        assert_eq!(ObjectType::FIGURES.len(), 36);
        assert!(ObjectType::Carrier.is_figure());
        assert!(!ObjectType::Flag.is_building());
    }

    #[test]
    fn formatting() {
        assert_eq!(ObjectType::Ship.to_string(), "ship");
        assert_eq!(format!("{:?}", ObjectType::Ship), "Ship");
    }
}
