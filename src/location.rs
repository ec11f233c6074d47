//! Locations picked for either end of a trip, and the location search wire format.

use crate::results::null_as_default;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which end of the trip a selection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Origin,
    Destination,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Origin => "origin",
            Side::Destination => "destination",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point on the map, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and inside the usual latitude/longitude ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Airport,
    City,
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationKind::Airport => f.write_str("airport"),
            LocationKind::City => f.write_str("city"),
        }
    }
}

/// A selected origin or destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Location {
    Airport {
        iata: String,
        name: String,
        city: String,
        lat: f64,
        lng: f64,
    },
    City {
        name: String,
        lat: f64,
        lng: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        country: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        admin_name: Option<String>,
    },
}

impl Location {
    pub fn airport(iata: &str, name: &str, city: &str, lat: f64, lng: f64) -> Self {
        Location::Airport {
            iata: iata.to_uppercase(),
            name: name.to_string(),
            city: city.to_string(),
            lat,
            lng,
        }
    }

    pub fn city(name: &str, lat: f64, lng: f64) -> Self {
        Location::City {
            name: name.to_string(),
            lat,
            lng,
            country: None,
            admin_name: None,
        }
    }

    pub fn kind(&self) -> LocationKind {
        match self {
            Location::Airport { .. } => LocationKind::Airport,
            Location::City { .. } => LocationKind::City,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Location::Airport { name, .. } | Location::City { name, .. } => name,
        }
    }

    pub fn iata(&self) -> Option<&str> {
        match self {
            Location::Airport { iata, .. } => Some(iata),
            Location::City { .. } => None,
        }
    }

    pub fn position(&self) -> LatLng {
        match self {
            Location::Airport { lat, lng, .. } | Location::City { lat, lng, .. } => {
                LatLng::new(*lat, *lng)
            }
        }
    }

    /// Position, if it is usable for a coordinate search or a map marker.
    pub fn coordinates(&self) -> Option<LatLng> {
        Some(self.position()).filter(LatLng::is_valid)
    }

    /// Three-letter code shown on map markers.
    pub fn code(&self) -> String {
        match self {
            Location::Airport { iata, .. } => iata.clone(),
            Location::City { name, .. } => name
                .chars()
                .filter(|c| c.is_alphabetic())
                .take(3)
                .flat_map(char::to_uppercase)
                .collect(),
        }
    }

    /// One-line description used in dropdown rows and summaries.
    pub fn label(&self) -> String {
        match self {
            Location::Airport { iata, name, city, .. } if city.is_empty() => {
                format!("{} - {}", iata, name)
            }
            Location::Airport { iata, name, city, .. } => {
                format!("{} - {} ({})", iata, name, city)
            }
            Location::City {
                name,
                country,
                admin_name,
                ..
            } => [Some(name.as_str()), admin_name.as_deref(), country.as_deref()]
                .into_iter()
                .flatten()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Body of `GET /api/locations/search`.
#[derive(Debug, Deserialize)]
pub struct LocationSearchResponse {
    #[serde(default)]
    pub locations: Vec<RawLocation>,
}

/// One entry as the search API sends it. Longitude arrives as `lng` or `lon`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawLocation {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default)]
    pub iata: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub admin_name: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl RawLocation {
    /// Normalize into a [`Location`]. Entries without coordinates are dropped.
    pub fn into_location(self) -> Option<Location> {
        let lat = self.lat?;
        let lng = self.lng.or(self.lon)?;

        let iata = self
            .iata
            .map(|code| code.trim().to_uppercase())
            .filter(|code| !code.is_empty());

        match iata {
            Some(iata) if self.kind.eq_ignore_ascii_case("airport") => Some(Location::Airport {
                iata,
                name: self.name,
                city: self.city.unwrap_or_default(),
                lat,
                lng,
            }),
            _ => Some(Location::City {
                name: self.name,
                lat,
                lng,
                country: self.country,
                admin_name: self.admin_name,
            }),
        }
    }
}

impl LocationSearchResponse {
    pub fn into_locations(self) -> Vec<Location> {
        self.locations
            .into_iter()
            .filter_map(RawLocation::into_location)
            .collect()
    }
}
