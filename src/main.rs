use anyhow::{Context, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pharmacy_locator::config::LocatorConfig;
use pharmacy_locator::location::FixedLocation;
use pharmacy_locator::osrm::OsrmClient;
use pharmacy_locator::pharmacy::PharmacyApiClient;
use pharmacy_locator::traits::{LocationSource, PharmacyDirectory, RouteProvider};
use pharmacy_locator::view_model::Phase;
use pharmacy_locator::{Coordinate, MapViewModel};

/// Find pharmacies near a point and get driving directions to one of them.
#[derive(Debug, Parser)]
#[command(name = "pharmacy-locator", version)]
struct Cli {
    /// Latitude of the starting point.
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Longitude of the starting point.
    #[arg(long, allow_hyphen_values = true)]
    lng: f64,

    /// Bearer token for the pharmacy backend.
    #[arg(long, env = "PHARMACY_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Route to the n-th nearest pharmacy (1-based).
    #[arg(long)]
    pick: Option<usize>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = LocatorConfig::from_env()?;

    let directory =
        PharmacyApiClient::new(config.api.clone()).context("building backend client")?;
    let router = OsrmClient::new(config.router.clone()).context("building OSRM client")?;
    let location = FixedLocation(Coordinate::new(cli.lat, cli.lng));

    let mut screen = MapViewModel::new(location, directory, router)
        .with_request_timeout(config.request_timeout());

    screen.mount().await;
    screen.search_nearby(cli.token.as_deref()).await;
    report_notices(&mut screen);

    let ranked = screen.ranked();
    if ranked.is_empty() {
        return Ok(());
    }
    for (index, entry) in ranked.iter().enumerate() {
        println!(
            "{:>3}. {} ({}) - {}",
            index + 1,
            entry.pharmacy.name,
            entry.pharmacy.address,
            entry.label()
        );
    }

    let Some(pick) = cli.pick else {
        return Ok(());
    };
    let Some(entry) = pick.checked_sub(1).and_then(|i| ranked.get(i)) else {
        bail!("--pick must be between 1 and {}", ranked.len());
    };

    screen.select_pharmacy(&entry.pharmacy.id).await;
    report_notices(&mut screen);

    if screen.phase() == Phase::RouteReady {
        if let Some(route) = screen.route() {
            println!(
                "Route to {}: {} points, encoded {}",
                entry.pharmacy.name,
                route.len(),
                route.encode()
            );
        }
    }

    screen.teardown();
    Ok(())
}

fn report_notices<L, P, R>(screen: &mut MapViewModel<L, P, R>)
where
    L: LocationSource,
    P: PharmacyDirectory,
    R: RouteProvider,
{
    for notice in screen.take_notices() {
        eprintln!("{}: {}", notice.title(), notice.message());
    }
}
