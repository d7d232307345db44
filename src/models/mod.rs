//! Persisted entities of the catalog.
//!
//! Every entity carries a generated `id` plus `created_at`/`updated_at`
//! timestamps. [`Entity`] is the type-erased form the storage engines work
//! with; it serializes with a `__class__` discriminator so the file engine can
//! round-trip the whole object graph through a single JSON document.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

mod amenity;
mod city;
mod place;
mod review;
mod state;
mod user;

pub use amenity::Amenity;
pub use city::City;
pub use place::Place;
pub use review::Review;
pub use state::State;
pub use user::User;

/// The class of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Amenity,
    City,
    Place,
    Review,
    State,
    User,
}

impl Kind {
    pub const ALL: [Kind; 6] = [Kind::Amenity, Kind::City, Kind::Place, Kind::Review, Kind::State, Kind::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Amenity => "Amenity",
            Kind::City => "City",
            Kind::Place => "Place",
            Kind::Review => "Review",
            Kind::State => "State",
            Kind::User => "User",
        }
    }

    /// Name used by `/stats`.
    pub fn plural(&self) -> &'static str {
        match self {
            Kind::Amenity => "amenities",
            Kind::City => "cities",
            Kind::Place => "places",
            Kind::Review => "reviews",
            Kind::State => "states",
            Kind::User => "users",
        }
    }

    pub fn parse(s: &str) -> Option<Kind> {
        Kind::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// Storage key of an object of this class.
    pub fn key(&self, id: &str) -> String {
        format!("{}.{}", self.as_str(), id)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any persisted entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__class__")]
pub enum Entity {
    Amenity(Amenity),
    City(City),
    Place(Place),
    Review(Review),
    State(State),
    User(User),
}

impl Entity {
    pub fn kind(&self) -> Kind {
        match self {
            Entity::Amenity(_) => Kind::Amenity,
            Entity::City(_) => Kind::City,
            Entity::Place(_) => Kind::Place,
            Entity::Review(_) => Kind::Review,
            Entity::State(_) => Kind::State,
            Entity::User(_) => Kind::User,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Entity::Amenity(o) => &o.id,
            Entity::City(o) => &o.id,
            Entity::Place(o) => &o.id,
            Entity::Review(o) => &o.id,
            Entity::State(o) => &o.id,
            Entity::User(o) => &o.id,
        }
    }

    pub fn key(&self) -> String {
        self.kind().key(self.id())
    }

    /// Public JSON representation: everything but the user password.
    pub fn to_dict(&self) -> Result<Value, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            map.remove("password");
        }
        Ok(value)
    }
}

/// Implemented by every concrete entity type.
pub trait Model:
    Clone + Into<Entity> + TryFrom<Entity, Error = Entity> + Send + Sync + 'static
{
    const KIND: Kind;

    fn id(&self) -> &str;

    /// Refreshes `updated_at`.
    fn touch(&mut self);

    fn to_dict(&self) -> Result<Value, serde_json::Error> {
        let entity: Entity = self.clone().into();
        entity.to_dict()
    }
}

macro_rules! impl_model {
    ($ty:ident) => {
        impl From<$ty> for Entity {
            fn from(obj: $ty) -> Self {
                Entity::$ty(obj)
            }
        }

        impl TryFrom<Entity> for $ty {
            type Error = Entity;

            fn try_from(entity: Entity) -> Result<Self, Self::Error> {
                match entity {
                    Entity::$ty(obj) => Ok(obj),
                    other => Err(other),
                }
            }
        }

        impl Model for $ty {
            const KIND: Kind = Kind::$ty;

            fn id(&self) -> &str {
                &self.id
            }

            fn touch(&mut self) {
                self.updated_at = chrono::Utc::now();
            }
        }
    };
}

impl_model!(Amenity);
impl_model!(City);
impl_model!(Place);
impl_model!(Review);
impl_model!(State);
impl_model!(User);

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
