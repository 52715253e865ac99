//! Discovery command handler.
//!
//! Called from `main` after the pool and config are established. Builds the
//! places client from config, wires the Ctrl-C flag, and hands off to the
//! engine; per-region failures are handled inside the engine, so anything
//! surfacing here aborts the run.

use parishdb_core::AppConfig;
use parishdb_engine::{DiscoveryEngine, COPTIC_CHURCHES};
use parishdb_places::{PlacesClient, PlacesConfig};

pub(crate) async fn run_discover(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    region: Option<&str>,
    resume: bool,
) -> anyhow::Result<()> {
    let api_key = config
        .places_api_key
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("PLACES_API_KEY must be set to run discovery"))?;

    let client = PlacesClient::new(
        api_key,
        config.places_request_timeout_secs,
        &config.places_user_agent,
        PlacesConfig {
            max_retries: config.places_max_retries,
            backoff_base_ms: config.places_retry_backoff_base_ms,
            page_delay_ms: config.places_page_delay_ms,
            detail_delay_ms: config.places_detail_delay_ms,
            max_pages: config.places_max_pages,
        },
    )
    .map_err(|e| anyhow::anyhow!("failed to build places client: {e}"))?;

    let engine = DiscoveryEngine::new(
        pool.clone(),
        client,
        &COPTIC_CHURCHES,
        config.engine_max_concurrent_details,
    );
    crate::spawn_ctrl_c_handler(engine.shutdown_flag());

    let summary = engine.run(region, resume).await?;

    println!(
        "run {}: {} new, {} updated across {} regions ({} skipped, {} failed)",
        summary.run_id,
        summary.entities_new,
        summary.entities_updated,
        summary.regions_searched,
        summary.regions_skipped,
        summary.regions_failed,
    );
    println!(
        "dropped {} duplicates, rejected {} candidates",
        summary.duplicates_dropped, summary.rejected,
    );
    if summary.interrupted {
        println!("run was interrupted; re-run with --resume to continue");
    }

    Ok(())
}
