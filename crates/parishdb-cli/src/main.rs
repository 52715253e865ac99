use std::sync::atomic::Ordering;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod discover;
mod query;

#[derive(Debug, Parser)]
#[command(name = "parishdb")]
#[command(about = "Place discovery and deduplication engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run discovery across the region catalog
    Discover {
        /// Search a single region (e.g. NJ, ON, EG) instead of all of them
        #[arg(long)]
        region: Option<String>,
        /// Skip regions already covered by a prior successful run
        #[arg(long)]
        resume: bool,
    },
    /// Query the catalog
    Query {
        /// Filter by state/province code (e.g. NJ)
        #[arg(long, conflicts_with_all = ["lat", "lng"])]
        state: Option<String>,
        /// Latitude of the search point
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Longitude of the search point
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
        /// Search radius around the point, in miles
        #[arg(long, default_value = "25.0")]
        radius_miles: f64,
    },
    /// Show catalog totals per region
    Stats,
    /// Apply pending database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse before anything that needs the environment, so --help and
    // argument errors work without a configured database.
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    let config = parishdb_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool = parishdb_db::connect_pool(
        &config.database_url,
        parishdb_db::PoolConfig::from_app_config(&config),
    )
    .await?;

    match cli.command {
        Commands::Discover { region, resume } => {
            discover::run_discover(&pool, &config, region.as_deref(), resume).await?;
        }
        Commands::Query {
            state,
            lat,
            lng,
            radius_miles,
        } => match (state, lat, lng) {
            (Some(state), _, _) => query::run_query_state(&pool, &state).await?,
            (None, Some(lat), Some(lng)) => {
                query::run_query_near(&pool, lat, lng, radius_miles).await?;
            }
            _ => anyhow::bail!("pass either --state or both --lat and --lng"),
        },
        Commands::Stats => query::run_stats(&pool).await?,
        Commands::Migrate => {
            let applied = parishdb_db::run_migrations(&pool).await?;
            println!("applied {applied} migrations");
        }
    }

    Ok(())
}

/// Flip the engine's shutdown flag on the first Ctrl-C so the current
/// region's accepted batch is still flushed; a second Ctrl-C kills the
/// process the normal way.
pub(crate) fn spawn_ctrl_c_handler(flag: std::sync::Arc<std::sync::atomic::AtomicBool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, finishing current region then stopping");
            flag.store(true, Ordering::Relaxed);
        }
    });
}
