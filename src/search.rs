//! Search form state, query construction and response decoding.

use crate::config::DEFAULT_RADIUS_MILES;
use crate::location::{Location, Side};
use crate::results::FlightOffer;
use crate::FinderError;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, warn};

pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in origin, destination, and departure date.";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Form state of the search panel.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria {
    pub origin: Option<Location>,
    pub destination: Option<Location>,
    pub departure_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    /// Miles around a city origin.
    pub origin_radius: f64,
    /// Miles around a city destination.
    pub destination_radius: f64,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self::with_radius(DEFAULT_RADIUS_MILES)
    }
}

impl SearchCriteria {
    pub fn with_radius(radius_miles: f64) -> Self {
        Self {
            origin: None,
            destination: None,
            departure_date: None,
            return_date: None,
            origin_radius: radius_miles,
            destination_radius: radius_miles,
        }
    }

    pub fn location(&self, side: Side) -> Option<&Location> {
        match side {
            Side::Origin => self.origin.as_ref(),
            Side::Destination => self.destination.as_ref(),
        }
    }

    pub fn set_location(&mut self, side: Side, location: Location) {
        match side {
            Side::Origin => self.origin = Some(location),
            Side::Destination => self.destination = Some(location),
        }
    }

    pub fn radius(&self, side: Side) -> f64 {
        match side {
            Side::Origin => self.origin_radius,
            Side::Destination => self.destination_radius,
        }
    }

    pub fn set_radius(&mut self, side: Side, miles: f64) {
        let miles = if miles.is_finite() { miles.max(0.0) } else { 0.0 };
        match side {
            Side::Origin => self.origin_radius = miles,
            Side::Destination => self.destination_radius = miles,
        }
    }

    /// Whether the search button is enabled.
    pub fn is_complete(&self) -> bool {
        self.origin.is_some() && self.destination.is_some() && self.departure_date.is_some()
    }

    /// Build the query for `GET /api/flights/search`.
    pub fn build_query(&self) -> Result<FlightQuery, FinderError> {
        let (Some(origin), Some(destination), Some(departure)) =
            (&self.origin, &self.destination, self.departure_date)
        else {
            return Err(FinderError::ValidationError(MISSING_FIELDS_MESSAGE.to_string()));
        };

        if let Some(return_date) = self.return_date {
            if return_date < departure {
                return Err(FinderError::ValidationError(
                    "Return date must not be before the departure date.".to_string(),
                ));
            }
        }

        let mut params = Vec::new();
        push_side(&mut params, Side::Origin, origin, self.origin_radius)?;
        push_side(&mut params, Side::Destination, destination, self.destination_radius)?;
        params.push(("departureDate".to_string(), departure.format(DATE_FORMAT).to_string()));
        if let Some(return_date) = self.return_date {
            params.push(("returnDate".to_string(), return_date.format(DATE_FORMAT).to_string()));
        }

        debug!(params = params.len(), "Built flight search query");
        Ok(FlightQuery { params })
    }
}

fn push_side(
    params: &mut Vec<(String, String)>,
    side: Side,
    location: &Location,
    radius: f64,
) -> Result<(), FinderError> {
    let (lat_key, lng_key, radius_key, code_key) = match side {
        Side::Origin => ("originLat", "originLng", "originRadius", "origins"),
        Side::Destination => ("destLat", "destLng", "destinationRadius", "destinations"),
    };

    match location {
        Location::Airport { iata, .. } => {
            params.push((code_key.to_string(), iata.clone()));
        }
        Location::City { name, .. } => {
            let point = location.coordinates().ok_or_else(|| {
                FinderError::ValidationError(format!(
                    "Selected {} city {} has no usable coordinates.",
                    side, name
                ))
            })?;
            params.push((lat_key.to_string(), point.lat.to_string()));
            params.push((lng_key.to_string(), point.lng.to_string()));
            params.push((radius_key.to_string(), radius.to_string()));
        }
    }
    Ok(())
}

/// Query string parameters for one flight search, in send order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightQuery {
    pub params: Vec<(String, String)>,
}

impl FlightQuery {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Decoded result of a flight search call.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Offers(Vec<FlightOffer>),
    /// The API answered with an `error` field.
    ApiError(String),
}

/// Decode a flight search body.
///
/// `flights` or `data` hold the offers; an `error` string is surfaced as is.
/// Any other shape decodes to an empty offer list.
pub fn parse_search_response(body: &Value) -> SearchOutcome {
    let list = body
        .get("flights")
        .filter(|v| v.is_array())
        .or_else(|| body.get("data").filter(|v| v.is_array()));

    if let Some(list) = list {
        return match serde_json::from_value::<Vec<FlightOffer>>(list.clone()) {
            Ok(offers) => SearchOutcome::Offers(offers),
            Err(e) => {
                warn!(error = %e, "Offer list did not match the expected shape");
                SearchOutcome::Offers(Vec::new())
            }
        };
    }

    if let Some(message) = body.get("error").and_then(Value::as_str) {
        return SearchOutcome::ApiError(message.to_string());
    }

    debug!("Search response carried no offer list");
    SearchOutcome::Offers(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn jfk() -> Location {
        Location::airport("JFK", "John F Kennedy Intl", "New York", 40.6413, -73.7781)
    }

    fn lax() -> Location {
        Location::airport("LAX", "Los Angeles Intl", "Los Angeles", 33.9416, -118.4085)
    }

    #[test]
    fn test_airport_mode_query() {
        let criteria = SearchCriteria {
            origin: Some(jfk()),
            destination: Some(lax()),
            departure_date: Some(date("2025-08-15")),
            ..SearchCriteria::default()
        };

        let query = criteria.build_query().unwrap();
        assert_eq!(query.get("origins"), Some("JFK"));
        assert_eq!(query.get("destinations"), Some("LAX"));
        assert_eq!(query.get("departureDate"), Some("2025-08-15"));
        assert!(!query.contains("returnDate"));
        assert!(!query.contains("originLat"));
    }

    #[test]
    fn test_city_side_uses_coordinates_and_radius() {
        let criteria = SearchCriteria {
            origin: Some(Location::city("Paris", 48.8566, 2.3522)),
            destination: Some(lax()),
            departure_date: Some(date("2025-08-15")),
            return_date: Some(date("2025-08-22")),
            origin_radius: 75.0,
            destination_radius: 10.0,
        };

        let query = criteria.build_query().unwrap();
        assert_eq!(query.get("originLat"), Some("48.8566"));
        assert_eq!(query.get("originLng"), Some("2.3522"));
        assert_eq!(query.get("originRadius"), Some("75"));
        assert!(!query.contains("origins"));
        assert_eq!(query.get("destinations"), Some("LAX"));
        assert!(!query.contains("destinationRadius"));
        assert_eq!(query.get("returnDate"), Some("2025-08-22"));
    }

    #[test]
    fn test_destination_city_keys() {
        let criteria = SearchCriteria {
            origin: Some(jfk()),
            destination: Some(Location::city("Tokyo", 35.6762, 139.6503)),
            departure_date: Some(date("2025-09-01")),
            ..SearchCriteria::default()
        };

        let query = criteria.build_query().unwrap();
        assert_eq!(query.get("destLat"), Some("35.6762"));
        assert_eq!(query.get("destLng"), Some("139.6503"));
        assert_eq!(query.get("destinationRadius"), Some("50"));
        assert!(!query.contains("destinations"));
    }

    #[test]
    fn test_missing_fields_rejected() {
        let mut criteria = SearchCriteria::default();
        assert!(!criteria.is_complete());
        let err = assert_err!(criteria.build_query());
        assert_eq!(err.to_string(), MISSING_FIELDS_MESSAGE);

        criteria.origin = Some(jfk());
        criteria.destination = Some(lax());
        assert!(!criteria.is_complete());
        assert_err!(criteria.build_query());

        criteria.departure_date = Some(date("2025-08-15"));
        assert!(criteria.is_complete());
        assert_ok!(criteria.build_query());
    }

    #[test]
    fn test_return_before_departure_rejected() {
        let criteria = SearchCriteria {
            origin: Some(jfk()),
            destination: Some(lax()),
            departure_date: Some(date("2025-08-15")),
            return_date: Some(date("2025-08-10")),
            ..SearchCriteria::default()
        };
        assert!(matches!(criteria.build_query(), Err(FinderError::ValidationError(_))));
    }

    #[test]
    fn test_city_without_coordinates_rejected() {
        let criteria = SearchCriteria {
            origin: Some(Location::city("Atlantis", 120.0, 0.0)),
            destination: Some(lax()),
            departure_date: Some(date("2025-08-15")),
            ..SearchCriteria::default()
        };
        let err = assert_err!(criteria.build_query());
        assert!(err.to_string().contains("Atlantis"));
    }

    #[test]
    fn test_negative_radius_clamped() {
        let mut criteria = SearchCriteria::default();
        criteria.set_radius(Side::Origin, -5.0);
        criteria.set_radius(Side::Destination, 120.0);
        assert_eq!(criteria.radius(Side::Origin), 0.0);
        assert_eq!(criteria.radius(Side::Destination), 120.0);
    }

    #[test]
    fn test_parse_response_shapes() {
        let offer = json!({"price": {"total": "120.00", "currency": "USD"}});

        match parse_search_response(&json!({"flights": [offer.clone()]})) {
            SearchOutcome::Offers(offers) => assert_eq!(offers.len(), 1),
            other => panic!("unexpected outcome: {:?}", other),
        }
        match parse_search_response(&json!({"data": [offer.clone(), offer]})) {
            SearchOutcome::Offers(offers) => assert_eq!(offers.len(), 2),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(
            parse_search_response(&json!({"error": "Upstream quota exceeded"})),
            SearchOutcome::ApiError("Upstream quota exceeded".to_string())
        );
        assert_eq!(
            parse_search_response(&json!({"unexpected": true})),
            SearchOutcome::Offers(Vec::new())
        );
        assert_eq!(
            parse_search_response(&json!({"flights": [1, 2, 3]})),
            SearchOutcome::Offers(Vec::new())
        );
        assert_eq!(parse_search_response(&json!([])), SearchOutcome::Offers(Vec::new()));
    }

    #[test]
    fn test_null_offer_fields_keep_whole_list() {
        let body = json!({"data": [
            {"price": {"total": "100", "currency": null}, "validatingAirlineCodes": null},
            {"price": {"total": "90", "currency": "USD"}}
        ]});

        match parse_search_response(&body) {
            SearchOutcome::Offers(offers) => {
                assert_eq!(offers.len(), 2);
                assert_eq!(offers[0].price.total, Some(100.0));
                assert_eq!(offers[1].price.currency, "USD");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_default_radius_matches_config() {
        let criteria = SearchCriteria::default();
        assert_eq!(criteria.origin_radius, crate::config::DEFAULT_RADIUS_MILES);
        assert_eq!(
            criteria.destination_radius,
            crate::FinderConfig::default().default_radius_miles
        );
    }
}
