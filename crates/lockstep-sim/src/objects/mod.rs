//! The simulation's object shapes.
//!
//! The 64 concrete tags are served by a handful of Rust types. Each type
//! stores the tag it was created with, so one constructor covers every
//! profession of a figure or every kind of building, and the factory table
//! built by [`register_all`] maps each tag to the type that owns it.

mod building;
mod economy;
mod figure;
mod flag;
mod node_object;
mod road;
mod ship;
mod site;
mod ware;

pub use building::Building;
pub use economy::EconomyHandler;
pub use figure::{Figure, SoldierStats};
pub use flag::Flag;
pub use node_object::NodeObject;
pub use road::RoadSegment;
pub use ship::Ship;
pub use site::ConstructionSite;
pub use ware::Ware;

use lockstep_snapshot::{ObjectFactory, ObjectType};

/// Implements [`GameObject`](lockstep_snapshot::GameObject) by delegating the
/// payload to the type's inherent `write` method.
///
/// The one-argument form reads the tag from an `object_type` field; the
/// `tag = ...` form is for types bound to a single tag.
macro_rules! game_object {
    (@impl $ty:ty, $tag_of:expr) => {
        impl lockstep_snapshot::GameObject for $ty {
            fn id(&self) -> lockstep_snapshot::ObjectId {
                self.id
            }

            fn object_type(&self) -> lockstep_snapshot::ObjectType {
                ($tag_of)(self)
            }

            fn serialize(
                &self,
                session: &mut lockstep_snapshot::WriteSession<'_>,
            ) -> lockstep_snapshot::Result<()> {
                self.write(session)
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
                self
            }
        }
    };
    ($ty:ty, tag = $tag:expr) => {
        $crate::objects::game_object!(@impl $ty, |_this: &$ty| $tag);
    };
    ($ty:ty) => {
        $crate::objects::game_object!(@impl $ty, |this: &$ty| this.object_type);
    };
}
pub(crate) use game_object;

/// Map decoration tags served by [`NodeObject`].
pub const NODE_OBJECTS: &[ObjectType] = &[
    ObjectType::Extension,
    ObjectType::EnvObject,
    ObjectType::Fire,
    ObjectType::Grainfield,
    ObjectType::Granite,
    ObjectType::Sign,
    ObjectType::Skeleton,
    ObjectType::StaticObject,
    ObjectType::DisappearingEnvObject,
    ObjectType::Tree,
    ObjectType::Animal,
    ObjectType::Fighting,
    ObjectType::CatapultStone,
    ObjectType::CharburnerPile,
];

/// Construction sites served by [`ConstructionSite`].
pub const SITES: &[ObjectType] = &[ObjectType::BuildingSite, ObjectType::ShipBuildingSite];

/// Register a constructor for every concrete tag.
pub fn register_all(factory: &mut ObjectFactory) {
    factory
        .register_all::<Building>(ObjectType::BUILDINGS)
        .register::<Building>(ObjectType::BurnedWarehouse)
        .register_all::<Figure>(ObjectType::FIGURES)
        .register_all::<ConstructionSite>(SITES)
        .register_all::<NodeObject>(NODE_OBJECTS)
        .register::<Flag>(ObjectType::Flag)
        .register::<RoadSegment>(ObjectType::RoadSegment)
        .register::<Ware>(ObjectType::Ware)
        .register::<Ship>(ObjectType::Ship)
        .register::<EconomyHandler>(ObjectType::EconomyModeHandler);
}

/// A factory that knows every object shape of the simulation.
pub fn factory() -> ObjectFactory {
    let mut factory = ObjectFactory::new();
    register_all(&mut factory);
    factory
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_concrete_tag_has_a_constructor() {
        let factory = factory();
        for &ty in ObjectType::concrete() {
            assert!(factory.is_registered(ty), "{ty:?} has no constructor");
        }
        assert_eq!(factory.len(), ObjectType::concrete().len());
        assert!(!factory.is_registered(ObjectType::Nothing));
        assert!(!factory.is_registered(ObjectType::Unknown));
    }
}
