//! # Flight Finder
//!
//! Client-side logic for a flight search screen: a location picker (search
//! dropdown with debounced autocomplete, or sample airport pins on a map),
//! a search panel that validates the form and talks to the flight search
//! API, and a results view that sorts, caps and formats the returned offers.
//!
//! The components are plain state machines driven by explicit events, so the
//! same logic powers the bundled CLI and the tests.

pub mod app;
pub mod client;
pub mod config;
pub mod location;
pub mod logging;
pub mod map;
pub mod picker;
pub mod results;
pub mod search;

use thiserror::Error;

// Re-export main types for convenience
pub use app::{Screen, SearchPanel};
pub use client::{ApiClient, FlightSource, LocationSource};
pub use config::FinderConfig;
pub use location::{LatLng, Location, LocationKind, Side};
pub use map::{Camera, MapPicker, MapScene, MapView};
pub use picker::{LocationPicker, PickerState};
pub use results::{format_duration, FlightOffer, ResultsView};
pub use search::{FlightQuery, SearchCriteria, SearchOutcome};

/// Error types for the flight finder library
#[derive(Error, Debug)]
pub enum FinderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The search API answered with an explicit `error` field.
    #[error("{0}")]
    ApiError(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("Invalid date format: {0}")]
    DateParseError(String),

    #[error("No location found for: {0}")]
    LocationNotFound(String),
}

impl FinderError {
    /// Message shown to the user when a flight search fails.
    ///
    /// Transport, status and decoding failures collapse into one generic
    /// message; API and validation messages pass through verbatim.
    pub fn user_message(&self) -> String {
        match self {
            FinderError::ApiError(msg) | FinderError::ValidationError(msg) => msg.clone(),
            FinderError::HttpError(_) | FinderError::JsonError(_) => {
                "Failed to fetch flights. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Search flights once between two already-resolved locations.
///
/// # Example
/// ```no_run
/// use flight_finder::{search_between, ApiClient, FinderConfig, Location};
/// use chrono::NaiveDate;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::new(&FinderConfig::default())?;
/// let jfk = Location::airport("JFK", "John F Kennedy Intl", "New York", 40.6413, -73.7781);
/// let lax = Location::airport("LAX", "Los Angeles Intl", "Los Angeles", 33.9416, -118.4085);
/// let date = NaiveDate::from_ymd_opt(2025, 8, 15).unwrap();
///
/// let offers = search_between(&client, jfk, lax, date).await?;
/// println!("Found {} offers", offers.len());
/// # Ok(())
/// # }
/// ```
pub async fn search_between(
    source: &dyn FlightSource,
    origin: Location,
    destination: Location,
    departure_date: chrono::NaiveDate,
) -> Result<Vec<FlightOffer>, FinderError> {
    let criteria = SearchCriteria {
        origin: Some(origin),
        destination: Some(destination),
        departure_date: Some(departure_date),
        ..SearchCriteria::default()
    };
    let query = criteria.build_query()?;
    match source.search_flights(&query).await? {
        SearchOutcome::Offers(offers) => Ok(results::cheapest(offers, config::DEFAULT_MAX_RESULTS)),
        SearchOutcome::ApiError(msg) => Err(FinderError::ApiError(msg)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_passes_api_error_through() {
        let err = FinderError::ApiError("No flights for that route".to_string());
        assert_eq!(err.user_message(), "No flights for that route");
    }

    #[test]
    fn test_user_message_is_generic_for_decoding_errors() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = FinderError::from(json_err);
        assert_eq!(err.user_message(), "Failed to fetch flights. Please try again.");
    }

    #[test]
    fn test_validation_message_is_verbatim() {
        let err = FinderError::ValidationError(
            "Please fill in origin, destination, and departure date.".into(),
        );
        assert_eq!(err.to_string(), "Please fill in origin, destination, and departure date.");
    }
}
