use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use branch_finder::{
    BranchFinderConfig, BranchSearchRanker, Coordinate, FixedPositionSource, GooglePlacesClient,
    LocationResolver, NotificationFeed, PositionSource, Preferences, UnavailablePositionSource,
};
use clap::{Parser, Subcommand};
use tracing::debug;

#[derive(Parser)]
#[command(name = "branch-finder", version, about = "Find the nearest People's Bank branches")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true, env = "BRANCH_FINDER_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List branches closest to the given (or fallback) position
    Nearby {
        /// Device latitude; the fallback point is used when omitted
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Device longitude
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
        /// Print the ranked list as JSON
        #[arg(long)]
        json: bool,
        /// Remember the nearest branch as the selected branch
        #[arg(long)]
        remember: bool,
    },
    /// Check whether a point lies inside the service region
    Region {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lng: f64,
    },
    /// Show the branch remembered by `nearby --remember`
    LastBranch,
    /// List notifications newer than the last one seen
    Notifications {
        /// JSON array of notifications fetched from the backend
        file: PathBuf,
        /// Record everything listed as seen
        #[arg(long)]
        mark_seen: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = BranchFinderConfig::load_from_path(cli.config.clone())?;
    branch_finder::logging::init(&config.logging, cli.verbose)?;
    debug!("Loaded configuration: {:?}", config.search);

    match cli.command {
        Command::Nearby {
            lat,
            lng,
            json,
            remember,
        } => nearby(&config, lat.zip(lng), json, remember).await,
        Command::Region { lat, lng } => {
            let inside = config.region.contains(lat, lng);
            println!(
                "({lat}, {lng}) is {} the service region",
                if inside { "inside" } else { "outside" }
            );
            Ok(())
        }
        Command::LastBranch => {
            let prefs = Preferences::open(&config.preferences.path)?;
            match prefs.last_selected_branch() {
                Some(branch) => println!("{} - {}", branch.name, branch.map_link()),
                None => println!("No branch selected yet"),
            }
            Ok(())
        }
        Command::Notifications { file, mark_seen } => notifications(&config, &file, mark_seen),
    }
}

fn notifications(config: &BranchFinderConfig, file: &Path, mark_seen: bool) -> Result<()> {
    let feed = NotificationFeed::load(file)
        .with_context(|| format!("Cannot read notifications from {}", file.display()))?;
    let mut prefs = Preferences::open(&config.preferences.path)?;
    let last_seen = prefs.last_seen_notification();

    let unseen = feed.unseen(last_seen);
    if unseen.is_empty() {
        println!("No new notifications");
    }
    for notification in &unseen {
        println!(
            "[{}] {}: {}",
            notification.created_at.format("%Y-%m-%d %H:%M"),
            notification.title,
            notification.body
        );
    }

    if mark_seen {
        if let Some(seen) = feed.mark_all_seen(last_seen) {
            prefs.set_last_seen_notification(seen)?;
            prefs.save()?;
            debug!("Marked notifications seen up to {}", seen);
        }
    }

    Ok(())
}

async fn nearby(
    config: &BranchFinderConfig,
    position: Option<(f64, f64)>,
    json: bool,
    remember: bool,
) -> Result<()> {
    let source: Arc<dyn PositionSource> = match position {
        Some((lat, lng)) => Arc::new(FixedPositionSource::new(Coordinate::new(lat, lng))),
        None => Arc::new(UnavailablePositionSource),
    };
    let resolver = LocationResolver::with_settings(source, config.resolver_settings());

    let places = GooglePlacesClient::new(&config.places)
        .map_err(|e| anyhow::anyhow!("{}", e.user_message()))
        .context("Cannot search for branches")?;
    let ranker = BranchSearchRanker::with_settings(Arc::new(places), config.search_settings());

    let resolved = resolver.resolve().await;
    let ranked = ranker.search_nearby(resolved.coordinate).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
    } else {
        println!(
            "Branches near {} ({:?} position):",
            resolved.coordinate.format_coordinates(),
            resolved.origin
        );
        if ranked.is_empty() {
            println!("  No branches found. Please choose a branch manually.");
        }
        for (index, branch) in ranked.iter().enumerate() {
            println!(
                "  {}. {} ({:.1} km) {}",
                index + 1,
                branch.name,
                branch.distance_km.unwrap_or_default(),
                branch.map_link()
            );
        }
    }

    if remember {
        if let Some(nearest) = ranked.nearest() {
            let mut prefs = Preferences::open(&config.preferences.path)?;
            prefs.set_last_selected_branch(nearest)?;
            prefs.save()?;
        }
    }

    Ok(())
}
