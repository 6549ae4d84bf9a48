//! Polymorphic object construction from a type tag.
//!
//! The factory is a table from [`ObjectType`] to a constructor function.
//! Adding a shape means adding a tag and registering its constructor; there
//! is no central match to edit. The set of tags stays closed: anything that
//! is not a registered concrete tag is rejected.

use std::collections::HashMap;

use crate::error::{Result, SnapshotError};
use crate::ids::ObjectId;
use crate::object::{FromSession, GameObject};
use crate::object_type::ObjectType;
use crate::session::ReadSession;

/// Builds an object of the given tag by reading its payload from the session.
pub type Constructor =
    fn(&mut ReadSession<'_>, ObjectId, ObjectType) -> Result<Box<dyn GameObject>>;

fn construct<T: FromSession>(
    session: &mut ReadSession<'_>,
    id: ObjectId,
    object_type: ObjectType,
) -> Result<Box<dyn GameObject>> {
    Ok(Box::new(T::from_session(session, id, object_type)?))
}

// ---------------------------------------------------------------------------
// ObjectFactory
// ---------------------------------------------------------------------------

/// Table of constructors keyed by object type tag.
#[derive(Debug, Default, Clone)]
pub struct ObjectFactory {
    constructors: HashMap<ObjectType, Constructor>,
}

impl ObjectFactory {
    /// An empty factory; every tag is unknown until registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` as the shape for `object_type`.
    ///
    /// # Panics
    ///
    /// Panics if `object_type` is a sentinel or already registered.
    pub fn register<T: FromSession>(&mut self, object_type: ObjectType) -> &mut Self {
        self.register_fn(object_type, construct::<T>)
    }

    /// Register `T` for every tag in `object_types`.
    pub fn register_all<T: FromSession>(&mut self, object_types: &[ObjectType]) -> &mut Self {
        for &ty in object_types {
            self.register_fn(ty, construct::<T>);
        }
        self
    }

    /// Register a raw constructor function.
    pub fn register_fn(&mut self, object_type: ObjectType, constructor: Constructor) -> &mut Self {
        assert!(
            object_type.is_concrete(),
            "cannot register a constructor for the {object_type:?} sentinel"
        );
        let previous = self.constructors.insert(object_type, constructor);
        assert!(
            previous.is_none(),
            "constructor for {object_type:?} registered twice"
        );
        self
    }

    pub fn is_registered(&self, object_type: ObjectType) -> bool {
        self.constructors.contains_key(&object_type)
    }

    /// Number of registered tags.
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Construct an object of `object_type`, reading its payload from
    /// `session`.
    ///
    /// Sentinels and unregistered tags fail with
    /// [`SnapshotError::UnknownTypeTag`].
    pub fn create(
        &self,
        session: &mut ReadSession<'_>,
        object_type: ObjectType,
        id: ObjectId,
    ) -> Result<Box<dyn GameObject>> {
        let constructor = self.constructors.get(&object_type).ok_or_else(|| {
            tracing::error!(%id, ?object_type, "no constructor for object type");
            SnapshotError::UnknownTypeTag {
                tag: object_type as u16,
                id: id.get(),
            }
        })?;
        let object = constructor(session, id, object_type)?;
        debug_assert_eq!(object.id(), id, "constructor for {object_type:?} changed the id");
        debug_assert_eq!(
            object.object_type(),
            object_type,
            "constructor for {object_type:?} built a different shape"
        );
        Ok(object)
    }
}
