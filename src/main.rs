//! CLI interface for flight-finder

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use flight_finder::logging::{init_logging, LogFormat};
use flight_finder::map::{MapPicker, MapScene};
use flight_finder::config::DEFAULT_API_URL;
use flight_finder::{
    ApiClient, FinderConfig, FinderError, Location, LocationSource, SearchCriteria, SearchPanel,
    Side,
};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "flight-finder")]
#[command(about = "Find flights between airports or around cities")]
#[command(version)]
pub struct Cli {
    /// Base URL of the search backend
    #[arg(long, global = true, env = "FLIGHT_FINDER_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
    /// Write logs to daily files in this directory instead of stderr
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,
    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Look up airports and cities
    Locations {
        /// Free-text keyword (at least 2 characters)
        keyword: String,
    },
    /// Search for flights
    Search {
        /// Origin airport code or city
        #[arg(short, long)]
        from: String,
        /// Destination airport code or city
        #[arg(short, long)]
        to: String,
        /// Departure date (YYYY-MM-DD)
        #[arg(short, long, value_parser = parse_date)]
        date: NaiveDate,
        /// Return date for round trips (YYYY-MM-DD)
        #[arg(short, long, value_parser = parse_date)]
        return_date: Option<NaiveDate>,
        /// Search radius around a city origin, in miles
        #[arg(long)]
        origin_radius: Option<f64>,
        /// Search radius around a city destination, in miles
        #[arg(long)]
        destination_radius: Option<f64>,
        /// Output file for JSON results
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the map annotations for a selection as JSON
    Map {
        /// Origin airport code or city
        #[arg(short, long)]
        from: Option<String>,
        /// Destination airport code or city
        #[arg(short, long)]
        to: Option<String>,
        #[arg(long)]
        origin_radius: Option<f64>,
        #[arg(long)]
        destination_radius: Option<f64>,
    },
    /// List the airports on the sample map
    Airports,
}

fn parse_date(s: &str) -> Result<NaiveDate, FinderError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| FinderError::DateParseError(s.to_string()))
}

/// Resolve free text to one location: an exact IATA match wins, otherwise the first hit.
async fn resolve(client: &ApiClient, query: &str) -> Result<Location, FinderError> {
    let locations = client.search_locations(query).await?;
    let wanted = query.trim().to_uppercase();

    let index = locations
        .iter()
        .position(|l| l.iata() == Some(wanted.as_str()))
        .unwrap_or(0);
    let picked = locations
        .into_iter()
        .nth(index)
        .ok_or_else(|| FinderError::LocationNotFound(query.to_string()))?;

    info!(query = query, location = %picked, "Resolved location");
    Ok(picked)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let format = if cli.json_logs { LogFormat::Json } else { LogFormat::Pretty };
    if let Err(e) = init_logging(cli.log_dir.as_deref(), format, cli.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let config = FinderConfig::with_api_url(cli.api_url);
    let client = ApiClient::new(&config)?;

    match cli.command {
        Commands::Locations { keyword } => {
            if keyword.trim().chars().count() < config.min_query_len {
                println!("Type at least {} characters to search.", config.min_query_len);
                return Ok(());
            }
            let locations = client
                .search_locations(keyword.trim())
                .await
                .context("Failed to fetch locations.")?;
            if locations.is_empty() {
                println!("No locations found.");
            }
            for location in locations {
                println!("[{:<7}] {:<3}  {}", location.kind(), location.code(), location.label());
            }
        }
        Commands::Search {
            from,
            to,
            date,
            return_date,
            origin_radius,
            destination_radius,
            output,
        } => {
            let mut panel = SearchPanel::new(&config);
            panel.select_location(Side::Origin, resolve(&client, &from).await?);
            panel.select_location(Side::Destination, resolve(&client, &to).await?);
            if let Some(miles) = origin_radius {
                panel.set_radius(Side::Origin, miles);
            }
            if let Some(miles) = destination_radius {
                panel.set_radius(Side::Destination, miles);
            }
            panel.set_departure_date(Some(date));
            panel.set_return_date(return_date);

            println!(
                "Searching flights {} → {}...",
                panel.criteria.origin.as_ref().map(Location::label).unwrap_or_default(),
                panel.criteria.destination.as_ref().map(Location::label).unwrap_or_default(),
            );
            if !panel.submit(&client).await {
                anyhow::bail!(panel.error().unwrap_or("Search not submitted").to_string());
            }

            if let Some(view) = panel.results_view() {
                println!("{}", view);
            }

            if let Some(path) = output {
                let json = serde_json::to_string_pretty(panel.offers())?;
                fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Results saved to {}", path.display());
            }

            if let Some(message) = panel.error() {
                anyhow::bail!(message.to_string());
            }
        }
        Commands::Map {
            from,
            to,
            origin_radius,
            destination_radius,
        } => {
            let mut criteria = SearchCriteria::with_radius(config.default_radius_miles);
            for (side, query) in [(Side::Origin, from), (Side::Destination, to)] {
                if let Some(query) = query {
                    criteria.set_location(side, resolve(&client, &query).await?);
                }
            }
            if let Some(miles) = origin_radius {
                criteria.set_radius(Side::Origin, miles);
            }
            if let Some(miles) = destination_radius {
                criteria.set_radius(Side::Destination, miles);
            }
            println!("{}", serde_json::to_string_pretty(&MapScene::for_criteria(&criteria))?);
        }
        Commands::Airports => {
            for pin in MapPicker::new().pins() {
                println!(
                    "{}  {:<34} {:>9.4} {:>10.4}",
                    pin.code, pin.name, pin.position.lat, pin.position.lng
                );
            }
        }
    }

    Ok(())
}
