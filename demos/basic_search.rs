//! Basic flight search example
//!
//! Expects the search backend on http://localhost:5000 (or FLIGHT_FINDER_API_URL).

use chrono::NaiveDate;
use flight_finder::{ApiClient, FinderConfig, Location, SearchPanel, Side};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::var("FLIGHT_FINDER_API_URL") {
        Ok(url) => FinderConfig::with_api_url(url),
        Err(_) => FinderConfig::default(),
    };
    let client = ApiClient::new(&config)?;

    let mut panel = SearchPanel::new(&config);
    panel.click_pin("LAX");
    panel.select_location(Side::Destination, Location::city("New York", 40.7128, -74.0060));
    panel.set_radius(Side::Destination, 40.0);
    panel.set_departure_date(NaiveDate::from_ymd_opt(2025, 8, 15));

    println!(
        "Searching for flights from LAX to anywhere within 40 miles of New York on 2025-08-15..."
    );
    panel.submit(&client).await;

    match panel.error() {
        None => {
            println!("✅ Search completed successfully!");
            println!("Showing the {} cheapest offers", panel.offers().len());
            if let Some(view) = panel.results_view() {
                println!("{}", view);
            }
        }
        Some(message) => {
            eprintln!("❌ {}", message);
            eprintln!("This is expected if the search backend is not running.");
        }
    }

    Ok(())
}
