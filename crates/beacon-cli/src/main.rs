use std::path::PathBuf;
use std::sync::Arc;

use beacon_client::{
    BeaconService, DeniedLocationProvider, FixedLocationProvider, LocationProvider,
};
use beacon_core::Coordinate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod images;
mod search;
mod upload;

#[derive(Debug, Parser)]
#[command(name = "beacon")]
#[command(about = "Campus lost-and-found client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Report a found item
    Upload {
        /// Photo of the item (sent as JPEG)
        #[arg(long)]
        image: PathBuf,
        /// Where the item was found (e.g. "McKeldin Library")
        #[arg(long)]
        location: Option<String>,
        /// Latitude of the find; requires --lon
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Longitude of the find; requires --lat
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },
    /// Search for a lost item by description
    Search {
        /// Free-text description (e.g. "red backpack")
        description: String,
        /// Where the item was lost
        #[arg(long)]
        location: Option<String>,
        /// Download and inspect each match's image
        #[arg(long)]
        fetch_images: bool,
    },
    /// Download one image and print its format and dimensions
    FetchImage {
        /// Absolute URL or path relative to the API base URL
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = beacon_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let provider = location_provider(&cli.command)?;
    let service = BeaconService::new(&config, provider)
        .map_err(|e| anyhow::anyhow!("failed to build Beacon client: {e}"))?;

    tracing::debug!(
        env = %config.env,
        api_base_url = %config.api_base_url,
        "beacon client ready"
    );

    match cli.command {
        Commands::Upload {
            image,
            location,
            ..
        } => upload::run_upload(&service, &image, location.as_deref()).await,
        Commands::Search {
            description,
            location,
            fetch_images,
        } => {
            search::run_search(
                &service,
                &description,
                location.as_deref(),
                fetch_images.then_some(config.image_concurrency),
            )
            .await
        }
        Commands::FetchImage { url } => images::run_fetch_image(&service, &url).await,
    }
}

/// A command-line coordinate stands in for the device fix; without one the
/// location request resolves to nothing.
fn location_provider(command: &Commands) -> anyhow::Result<Arc<dyn LocationProvider>> {
    if let Commands::Upload {
        lat: Some(lat),
        lon: Some(lon),
        ..
    } = command
    {
        let coordinate = Coordinate::new(*lat, *lon)
            .ok_or_else(|| anyhow::anyhow!("coordinate ({lat}, {lon}) is out of range"))?;
        return Ok(Arc::new(FixedLocationProvider::new(coordinate)));
    }
    Ok(Arc::new(DeniedLocationProvider))
}
