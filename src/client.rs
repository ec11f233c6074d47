//! HTTP client for the location and flight search API

use crate::config::FinderConfig;
use crate::location::{Location, LocationSearchResponse};
use crate::search::{parse_search_response, FlightQuery, SearchOutcome};
use crate::FinderError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::fmt::Debug;
use tracing::{debug, error, info, instrument};

/// Anything that can answer a free-text location query.
#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    async fn search_locations(&self, keyword: &str) -> Result<Vec<Location>, FinderError>;
}

/// Anything that can run a flight search.
#[async_trait]
pub trait FlightSource: Send + Sync + Debug {
    async fn search_flights(&self, query: &FlightQuery) -> Result<SearchOutcome, FinderError>;
}

/// Client for the backend's `/api/locations` and `/api/flights` endpoints
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: Client,
    locations_url: String,
    flights_url: String,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: &FinderConfig) -> Result<Self, FinderError> {
        debug!(base_url = %config.api_base_url, "Creating new API client");
        let http_client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            http_client,
            locations_url: config.endpoint("/api/locations/search"),
            flights_url: config.endpoint("/api/flights/search"),
        })
    }

    async fn get_json(&self, url: &str, params: &[(String, String)]) -> Result<Value, FinderError> {
        let start_time = std::time::Instant::now();
        let response = self.http_client.get(url).query(params).send().await?;
        let status = response.status();

        info!(
            url = %url,
            status = %status,
            duration_ms = start_time.elapsed().as_millis(),
            "HTTP request completed"
        );

        let response = response.error_for_status().map_err(|e| {
            error!(status = %status, "HTTP request failed");
            e
        })?;

        let body = response.text().await?;
        debug!(body_length = body.len(), "Received response body");
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl LocationSource for ApiClient {
    #[instrument(level = "info", skip(self))]
    async fn search_locations(&self, keyword: &str) -> Result<Vec<Location>, FinderError> {
        let params = [("keyword".to_string(), keyword.to_string())];
        let body = self.get_json(&self.locations_url, &params).await?;
        let response: LocationSearchResponse = serde_json::from_value(body)?;
        let locations = response.into_locations();

        info!(results = locations.len(), "Location search completed");
        Ok(locations)
    }
}

#[async_trait]
impl FlightSource for ApiClient {
    #[instrument(level = "info", skip(self, query), fields(params = query.params.len()))]
    async fn search_flights(&self, query: &FlightQuery) -> Result<SearchOutcome, FinderError> {
        info!("Requesting flight offers");
        let body = self.get_json(&self.flights_url, &query.params).await?;

        let start_parse = std::time::Instant::now();
        let outcome = parse_search_response(&body);
        match &outcome {
            SearchOutcome::Offers(offers) => info!(
                parse_duration_ms = start_parse.elapsed().as_millis(),
                offers_found = offers.len(),
                "Flight search response decoded"
            ),
            SearchOutcome::ApiError(message) => error!(
                error = %message,
                "Flight search API returned an error"
            ),
        }
        Ok(outcome)
    }
}
