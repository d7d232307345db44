//! Request bodies.
//!
//! Create requests carry every settable field as an `Option` so a missing
//! mandatory field can be reported by name. Update requests only contain the
//! fields a client may change: identifiers, foreign keys and timestamps are
//! not part of them and are therefore dropped silently.

use serde::Deserialize;

use crate::error::{validation::require, validation::validate_non_negative, AppResult};
use crate::models::{Amenity, City, Place, Review, State, User};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateState {
    pub name: Option<String>,
}

impl CreateState {
    pub fn into_model(self) -> AppResult<State> {
        Ok(State::new(require(self.name, "name")?))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateState {
    pub name: Option<String>,
}

impl UpdateState {
    pub fn apply(self, state: &mut State) {
        if let Some(name) = self.name {
            state.name = name;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCity {
    pub name: Option<String>,
}

impl CreateCity {
    pub fn into_model(self, state_id: &str) -> AppResult<City> {
        Ok(City::new(state_id, require(self.name, "name")?))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCity {
    pub name: Option<String>,
}

impl UpdateCity {
    pub fn apply(self, city: &mut City) {
        if let Some(name) = self.name {
            city.name = name;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAmenity {
    pub name: Option<String>,
}

impl CreateAmenity {
    pub fn into_model(self) -> AppResult<Amenity> {
        Ok(Amenity::new(require(self.name, "name")?))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAmenity {
    pub name: Option<String>,
}

impl UpdateAmenity {
    pub fn apply(self, amenity: &mut Amenity) {
        if let Some(name) = self.name {
            amenity.name = name;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUser {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl CreateUser {
    pub fn into_model(self) -> AppResult<User> {
        let email = require(self.email, "email")?;
        let password = require(self.password, "password")?;
        let mut user = User::new(email, password);
        user.first_name = self.first_name.unwrap_or_default();
        user.last_name = self.last_name.unwrap_or_default();
        Ok(user)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UpdateUser {
    pub fn apply(self, user: &mut User) {
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(password) = self.password {
            user.password = password;
        }
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePlace {
    pub user_id: Option<String>,
    pub name: Option<String>,
    #[serde(flatten)]
    pub details: PlaceDetails,
}

/// Descriptive place fields shared by create and update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceDetails {
    pub description: Option<String>,
    pub number_rooms: Option<i64>,
    pub number_bathrooms: Option<i64>,
    pub max_guest: Option<i64>,
    pub price_by_night: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl PlaceDetails {
    pub fn validate(&self) -> AppResult<()> {
        validate_non_negative(self.number_rooms, "number_rooms")?;
        validate_non_negative(self.number_bathrooms, "number_bathrooms")?;
        validate_non_negative(self.max_guest, "max_guest")?;
        validate_non_negative(self.price_by_night, "price_by_night")
    }

    fn apply(self, place: &mut Place) {
        if let Some(v) = self.description {
            place.description = v;
        }
        if let Some(v) = self.number_rooms {
            place.number_rooms = v;
        }
        if let Some(v) = self.number_bathrooms {
            place.number_bathrooms = v;
        }
        if let Some(v) = self.max_guest {
            place.max_guest = v;
        }
        if let Some(v) = self.price_by_night {
            place.price_by_night = v;
        }
        if let Some(v) = self.latitude {
            place.latitude = v;
        }
        if let Some(v) = self.longitude {
            place.longitude = v;
        }
    }
}

impl CreatePlace {
    pub fn into_model(self, city_id: &str, user_id: &str) -> AppResult<Place> {
        let name = require(self.name, "name")?;
        self.details.validate()?;
        let mut place = Place::new(city_id, user_id, name);
        self.details.apply(&mut place);
        Ok(place)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePlace {
    pub name: Option<String>,
    #[serde(flatten)]
    pub details: PlaceDetails,
}

impl UpdatePlace {
    pub fn apply(self, place: &mut Place) -> AppResult<()> {
        self.details.validate()?;
        if let Some(name) = self.name {
            place.name = name;
        }
        self.details.apply(place);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateReview {
    pub user_id: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReview {
    pub text: Option<String>,
}

impl UpdateReview {
    pub fn apply(self, review: &mut Review) {
        if let Some(text) = self.text {
            review.text = text;
        }
    }
}
