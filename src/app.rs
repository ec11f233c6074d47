//! The search screen: form state, the map/results pane switch and submission.

use crate::client::FlightSource;
use crate::config::FinderConfig;
use crate::location::{Location, Side};
use crate::map::{MapPicker, MapView};
use crate::results::{cheapest, FlightOffer, ResultsView};
use crate::search::{FlightQuery, SearchCriteria, SearchOutcome};
use crate::FinderError;
use chrono::NaiveDate;
use tracing::{error, info, instrument, warn};

/// Which pane is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Idle, map visible.
    Map,
    Loading,
    Results,
}

#[derive(Debug)]
pub struct SearchPanel {
    pub criteria: SearchCriteria,
    screen: Screen,
    offers: Vec<FlightOffer>,
    error: Option<String>,
    max_results: usize,
    default_radius: f64,
    map: MapView,
    map_picker: MapPicker,
}

impl SearchPanel {
    pub fn new(config: &FinderConfig) -> Self {
        let mut panel = Self {
            criteria: SearchCriteria::with_radius(config.default_radius_miles),
            screen: Screen::Map,
            offers: Vec::new(),
            error: None,
            max_results: config.max_results,
            default_radius: config.default_radius_miles,
            map: MapView::new(),
            map_picker: MapPicker::new(),
        };
        panel.show_map();
        panel
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn offers(&self) -> &[FlightOffer] {
        &self.offers
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn map(&self) -> &MapView {
        &self.map
    }

    pub fn map_picker_mut(&mut self) -> &mut MapPicker {
        &mut self.map_picker
    }

    /// Search button state.
    pub fn can_submit(&self) -> bool {
        self.screen != Screen::Loading && self.criteria.is_complete()
    }

    pub fn select_location(&mut self, side: Side, location: Location) {
        info!(side = %side, location = %location, "Location set");
        self.criteria.set_location(side, location);
        self.map.render(&self.criteria);
    }

    /// Handle a click on a sample airport pin.
    pub fn click_pin(&mut self, code: &str) -> Option<Side> {
        let side = self.map_picker.click(code, &mut self.criteria)?;
        self.map.render(&self.criteria);
        Some(side)
    }

    pub fn set_radius(&mut self, side: Side, miles: f64) {
        self.criteria.set_radius(side, miles);
        self.map.render(&self.criteria);
    }

    pub fn set_departure_date(&mut self, date: Option<NaiveDate>) {
        self.criteria.departure_date = date;
    }

    pub fn set_return_date(&mut self, date: Option<NaiveDate>) {
        self.criteria.return_date = date;
    }

    /// Validate the form and switch to the loading pane.
    ///
    /// On a validation failure the message replaces any earlier results, nothing
    /// is sent and the screen is left as it was.
    pub fn begin_submit(&mut self) -> Option<FlightQuery> {
        match self.criteria.build_query() {
            Ok(query) => {
                self.error = None;
                self.offers.clear();
                self.screen = Screen::Loading;
                self.map.unmount();
                Some(query)
            }
            Err(e) => {
                warn!(error = %e, "Search blocked by validation");
                self.offers.clear();
                self.error = Some(e.user_message());
                None
            }
        }
    }

    /// Store the outcome of a search started with [`begin_submit`](Self::begin_submit).
    pub fn finish_submit(&mut self, result: Result<SearchOutcome, FinderError>) {
        self.screen = Screen::Results;
        match result {
            Ok(SearchOutcome::Offers(offers)) => {
                let received = offers.len();
                self.offers = cheapest(offers, self.max_results);
                info!(received, shown = self.offers.len(), "Search results stored");
            }
            Ok(SearchOutcome::ApiError(message)) => {
                warn!(error = %message, "Search API reported an error");
                self.offers.clear();
                self.error = Some(message);
            }
            Err(e) => {
                error!(error = %e, "Flight search failed");
                self.offers.clear();
                self.error = Some(e.user_message());
            }
        }
    }

    /// Validate, query `source` and store the result. Returns whether a request was sent.
    #[instrument(level = "info", skip(self, source))]
    pub async fn submit(&mut self, source: &dyn FlightSource) -> bool {
        let Some(query) = self.begin_submit() else {
            return false;
        };
        let result = source.search_flights(&query).await;
        self.finish_submit(result);
        true
    }

    /// Back to the map with a blank form.
    pub fn reset(&mut self) {
        self.criteria = SearchCriteria::with_radius(self.default_radius);
        self.offers.clear();
        self.error = None;
        self.map_picker = MapPicker::new();
        self.map.unmount();
        self.show_map();
        info!("Search reset");
    }

    fn show_map(&mut self) {
        self.screen = Screen::Map;
        self.map.mount();
        self.map.render(&self.criteria);
    }

    /// The results pane, or `None` while the map is showing.
    pub fn results_view(&self) -> Option<ResultsView> {
        match self.screen {
            Screen::Map => None,
            Screen::Loading => Some(ResultsView::Loading),
            Screen::Results => Some(ResultsView::new(false, self.error(), &self.offers)),
        }
    }
}
