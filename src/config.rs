//! Runtime settings shared by the clients and components.

use std::time::Duration;

/// Base URL of the local search backend.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_MIN_QUERY_LEN: usize = 2;
/// Offers kept after sorting by price.
pub const DEFAULT_MAX_RESULTS: usize = 15;
pub const DEFAULT_RADIUS_MILES: f64 = 50.0;

/// Client configuration with the screen's built-in defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct FinderConfig {
    /// Scheme and host of the search API, without the `/api` suffix.
    pub api_base_url: String,
    /// Idle time before a typed query is sent.
    pub debounce: Duration,
    /// Queries shorter than this never hit the network.
    pub min_query_len: usize,
    /// Number of offers kept after sorting by price.
    pub max_results: usize,
    /// Search radius in miles applied to both sides of a fresh form.
    pub default_radius_miles: f64,
    pub user_agent: String,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            debounce: DEFAULT_DEBOUNCE,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            max_results: DEFAULT_MAX_RESULTS,
            default_radius_miles: DEFAULT_RADIUS_MILES,
            user_agent: concat!("flight-finder/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FinderConfig {
    /// Default configuration pointed at another backend.
    pub fn with_api_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    /// Build an endpoint URL, tolerating a trailing slash on the base.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
