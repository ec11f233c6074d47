//! Flight offers as the search API returns them, and their text rendering.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

/// One offer. Every field is optional on the wire, and `null` counts as absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOffer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub itineraries: Vec<Itinerary>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: OfferPrice,
    #[serde(default, deserialize_with = "null_as_default")]
    pub validating_airline_codes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Itinerary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    #[serde(default, deserialize_with = "null_as_default")]
    pub departure: Endpoint,
    #[serde(default, deserialize_with = "null_as_default")]
    pub arrival: Endpoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iata_code: Option<String>,
    /// Local date-time as sent, e.g. `2025-08-15T08:30:00`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OfferPrice {
    /// Total as a number; the API sends either `"123.45"` or `123.45`.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub currency: String,
}

/// Treat an explicit `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|amount| amount.is_finite()))
}

impl FlightOffer {
    fn first_itinerary(&self) -> Option<&Itinerary> {
        self.itineraries.first()
    }

    pub fn departure_code(&self) -> Option<&str> {
        self.first_itinerary()?
            .segments
            .first()?
            .departure
            .iata_code
            .as_deref()
    }

    pub fn arrival_code(&self) -> Option<&str> {
        self.first_itinerary()?
            .segments
            .last()?
            .arrival
            .iata_code
            .as_deref()
    }

    pub fn departure_time(&self) -> Option<&str> {
        self.first_itinerary()?.segments.first()?.departure.at.as_deref()
    }

    /// Validating airline, falling back to the first operating carrier.
    pub fn airline(&self) -> Option<&str> {
        self.validating_airline_codes
            .first()
            .map(String::as_str)
            .or_else(|| self.first_itinerary()?.segments.first()?.carrier_code.as_deref())
    }

    pub fn stops(&self) -> usize {
        self.first_itinerary()
            .map(|it| it.segments.len().saturating_sub(1))
            .unwrap_or(0)
    }

    pub fn duration(&self) -> Option<&str> {
        self.first_itinerary()?.duration.as_deref()
    }

    fn price_order(&self, other: &Self) -> Ordering {
        match (self.price.total, other.price.total) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Sort ascending by price (unpriced offers last) and keep the first `limit`.
pub fn cheapest(mut offers: Vec<FlightOffer>, limit: usize) -> Vec<FlightOffer> {
    offers.sort_by(FlightOffer::price_order);
    offers.truncate(limit);
    offers
}

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?$").expect("valid duration pattern")
    })
}

/// Format an ISO-8601 `PT#H#M` duration as `"2h 30m"`.
///
/// Strings that don't match are returned unchanged.
pub fn format_duration(raw: &str) -> String {
    let Some(captures) = duration_pattern().captures(raw) else {
        return raw.to_string();
    };

    let hours = captures.get(1).map(|m| format!("{}h", m.as_str()));
    let minutes = captures.get(2).map(|m| format!("{}m", m.as_str()));

    match (hours, minutes) {
        (Some(h), Some(m)) => format!("{} {}", h, m),
        (Some(h), None) => h,
        (None, Some(m)) => m,
        (None, None) => raw.to_string(),
    }
}

/// One rendered result row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferRow {
    pub from: String,
    pub to: String,
    pub departs: Option<String>,
    pub duration: Option<String>,
    pub stops: usize,
    pub airline: String,
    pub price: String,
}

impl From<&FlightOffer> for OfferRow {
    fn from(offer: &FlightOffer) -> Self {
        let price = match offer.price.total {
            Some(total) => format!("{} {:.2}", offer.price.currency, total).trim().to_string(),
            None => "N/A".to_string(),
        };

        Self {
            from: offer.departure_code().unwrap_or("N/A").to_string(),
            to: offer.arrival_code().unwrap_or("N/A").to_string(),
            departs: offer.departure_time().map(str::to_string),
            duration: offer.duration().map(format_duration),
            stops: offer.stops(),
            airline: offer.airline().unwrap_or("N/A").to_string(),
            price,
        }
    }
}

impl fmt::Display for OfferRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.from, self.to)?;
        if let Some(departs) = &self.departs {
            write!(f, "  {}", departs)?;
        }
        if let Some(duration) = &self.duration {
            write!(f, "  {}", duration)?;
        }
        let stops = match self.stops {
            0 => "nonstop".to_string(),
            1 => "1 stop".to_string(),
            n => format!("{} stops", n),
        };
        write!(f, "  {}  {}  {}", stops, self.airline, self.price)
    }
}

/// What the results pane shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultsView {
    Loading,
    Empty,
    /// An error message, shown in place of results.
    Error(String),
    Offers(Vec<OfferRow>),
}

impl ResultsView {
    /// Build the pane from the panel's data. Errors take precedence over offers.
    pub fn new(loading: bool, error: Option<&str>, offers: &[FlightOffer]) -> Self {
        if loading {
            return ResultsView::Loading;
        }
        if let Some(message) = error {
            return ResultsView::Error(message.to_string());
        }
        if offers.is_empty() {
            return ResultsView::Empty;
        }
        ResultsView::Offers(offers.iter().map(OfferRow::from).collect())
    }
}

impl fmt::Display for ResultsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultsView::Loading => write!(f, "Loading flights..."),
            ResultsView::Empty => write!(f, "No flights found."),
            ResultsView::Error(message) => write!(f, "{}", message),
            ResultsView::Offers(rows) => {
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{:>2}. {}", i + 1, row)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_RESULTS;
    use serde_json::json;

    fn offer(total: Value) -> FlightOffer {
        serde_json::from_value(json!({
            "itineraries": [{
                "duration": "PT5H10M",
                "segments": [
                    {"departure": {"iataCode": "JFK", "at": "2025-08-15T08:00:00"}, "arrival": {"iataCode": "ORD"}, "carrierCode": "AA", "number": "100"},
                    {"departure": {"iataCode": "ORD"}, "arrival": {"iataCode": "LAX"}, "carrierCode": "AA", "number": "200"}
                ]
            }],
            "price": {"total": total, "currency": "USD"}
        }))
        .unwrap()
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration("PT2H30M"), "2h 30m");
        assert_eq!(format_duration("PT45M"), "45m");
        assert_eq!(format_duration("PT3H"), "3h");
        assert_eq!(format_duration("2 hours"), "2 hours");
        assert_eq!(format_duration("PT"), "PT");
        assert_eq!(format_duration(""), "");
    }

    #[test]
    fn test_lenient_price() {
        assert_eq!(offer(json!("199.99")).price.total, Some(199.99));
        assert_eq!(offer(json!(88)).price.total, Some(88.0));
        assert_eq!(offer(json!("free")).price.total, None);
        assert_eq!(offer(Value::Null).price.total, None);
    }

    #[test]
    fn test_null_fields_decode_as_empty() {
        let offer: FlightOffer = serde_json::from_value(json!({
            "itineraries": [{"duration": null, "segments": null}],
            "price": {"total": "100", "currency": null},
            "validatingAirlineCodes": null
        }))
        .unwrap();

        assert_eq!(offer.price.total, Some(100.0));
        assert!(offer.price.currency.is_empty());
        assert!(offer.validating_airline_codes.is_empty());
        assert!(offer.itineraries[0].segments.is_empty());

        let bare: FlightOffer =
            serde_json::from_value(json!({"price": null, "itineraries": null})).unwrap();
        assert_eq!(bare, FlightOffer::default());
        assert_eq!(OfferRow::from(&offer).price, "100.00");
    }

    #[test]
    fn test_cheapest_sorts_and_caps() {
        let prices = [
            420.0, 99.5, 310.0, 15.0, 250.0, 1200.0, 75.25, 88.0, 430.0, 51.0, 600.0, 19.99,
            333.0, 210.0, 180.0, 140.0, 990.0, 45.0,
        ];
        let mut offers: Vec<FlightOffer> = prices.iter().map(|p| offer(json!(p))).collect();
        offers.push(offer(json!("n/a")));

        let kept = cheapest(offers, DEFAULT_MAX_RESULTS);
        assert_eq!(kept.len(), 15);

        let totals: Vec<f64> = kept.iter().map(|o| o.price.total.unwrap()).collect();
        assert!(totals.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(totals[0], 15.0);
        assert_eq!(totals[14], 430.0);
    }

    #[test]
    fn test_unpriced_offers_sort_last() {
        let kept = cheapest(vec![offer(Value::Null), offer(json!(10))], DEFAULT_MAX_RESULTS);
        assert_eq!(kept[0].price.total, Some(10.0));
        assert_eq!(kept[1].price.total, None);
    }

    #[test]
    fn test_row_rendering() {
        let row = OfferRow::from(&offer(json!("199.9")));
        assert_eq!(row.from, "JFK");
        assert_eq!(row.to, "LAX");
        assert_eq!(row.stops, 1);
        assert_eq!(row.airline, "AA");
        assert_eq!(row.price, "USD 199.90");
        assert_eq!(
            row.to_string(),
            "JFK → LAX  2025-08-15T08:00:00  5h 10m  1 stop  AA  USD 199.90"
        );
    }

    #[test]
    fn test_row_for_bare_offer() {
        let row = OfferRow::from(&FlightOffer::default());
        assert_eq!(row.from, "N/A");
        assert_eq!(row.to, "N/A");
        assert_eq!(row.price, "N/A");
        assert_eq!(row.stops, 0);
    }

    #[test]
    fn test_results_view_states() {
        assert_eq!(ResultsView::new(true, None, &[]).to_string(), "Loading flights...");
        assert_eq!(ResultsView::new(false, None, &[]).to_string(), "No flights found.");
        assert_eq!(
            ResultsView::new(
                false,
                Some("Failed to fetch flights. Please try again."),
                &[offer(json!(1))]
            ),
            ResultsView::Error("Failed to fetch flights. Please try again.".to_string())
        );

        let view = ResultsView::new(false, None, &[offer(json!(1)), offer(json!(2))]);
        let text = view.to_string();
        assert!(text.starts_with(" 1. JFK → LAX"));
        assert_eq!(text.lines().count(), 2);
    }
}
