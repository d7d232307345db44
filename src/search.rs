//! Place search.
//!
//! The filter works on plain slices so it is independent of the storage
//! engine. An empty or absent list never excludes anything.

use std::collections::HashSet;

use serde::Deserialize;

use crate::models::{Amenity, City, Place};

/// Body of `POST /places_search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlacesSearchRequest {
    #[serde(default)]
    pub states: Option<Vec<String>>,
    #[serde(default)]
    pub cities: Option<Vec<String>>,
    #[serde(default)]
    pub amenities: Option<Vec<String>>,
}

impl PlacesSearchRequest {
    fn states(&self) -> &[String] {
        self.states.as_deref().unwrap_or_default()
    }

    fn cities(&self) -> &[String] {
        self.cities.as_deref().unwrap_or_default()
    }

    fn amenities(&self) -> &[String] {
        self.amenities.as_deref().unwrap_or_default()
    }

    /// True when no list narrows the result.
    pub fn is_unfiltered(&self) -> bool {
        self.states().is_empty() && self.cities().is_empty() && self.amenities().is_empty()
    }
}

/// Ids of the cities selected by the `states` and `cities` lists.
///
/// Requested city ids that name no existing city are dropped.
pub fn location_city_ids(req: &PlacesSearchRequest, cities: &[City]) -> HashSet<String> {
    let states: HashSet<&str> = req.states().iter().map(String::as_str).collect();
    let requested: HashSet<&str> = req.cities().iter().map(String::as_str).collect();

    cities
        .iter()
        .filter(|c| states.contains(c.state_id.as_str()) || requested.contains(c.id.as_str()))
        .map(|c| c.id.clone())
        .collect()
}

/// Applies the search to `places`, preserving their order.
///
/// 1. When the `states` and `cities` lists select at least one existing city,
///    keep places located in the selected cities.
/// 2. With a non-empty `amenities` list, keep places linked to every requested
///    amenity that exists. Unknown amenity ids are ignored.
pub fn filter_places(
    req: &PlacesSearchRequest,
    places: Vec<Place>,
    cities: &[City],
    amenities: &[Amenity],
) -> Vec<Place> {
    if req.is_unfiltered() {
        return places;
    }

    let mut result = places;

    // Location ids that resolve to no city do not narrow the result
    let city_ids = location_city_ids(req, cities);
    if !city_ids.is_empty() {
        result.retain(|p| city_ids.contains(&p.city_id));
    }

    if !req.amenities().is_empty() {
        let known: HashSet<&str> = amenities.iter().map(|a| a.id.as_str()).collect();
        let wanted: Vec<&str> =
            req.amenities().iter().map(String::as_str).filter(|id| known.contains(id)).collect();
        result.retain(|p| wanted.iter().all(|id| p.has_amenity(id)));
    }

    result
}
