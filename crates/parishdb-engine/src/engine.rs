//! The discovery run driver.
//!
//! Regions are traversed sequentially — the API's quota and page-token
//! timing make cross-region concurrency counterproductive. Within a page,
//! detail fetches fan out through a small bounded pool; the identity index
//! sits behind one mutex so check-then-record stays atomic per candidate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::Mutex;

use parishdb_core::{Entity, Region};
use parishdb_db::DbError;
use parishdb_places::{entity_from_detail, PlacesClient, PlacesError};

use crate::dedup::IdentityIndex;
use crate::profile::DiscoveryProfile;
use crate::regions::{find_region, REGIONS};
use crate::validate::validate;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown region code '{0}'")]
    UnknownRegion(String),
    #[error(transparent)]
    Places(#[from] PlacesError),
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Per-region counters, reported up into the run summary.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegionStats {
    pub candidates_seen: usize,
    pub duplicates: usize,
    pub rejected: usize,
    pub details_missing: usize,
}

/// Totals for one full discovery run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub run_id: i64,
    pub regions_searched: usize,
    pub regions_skipped: usize,
    pub regions_failed: usize,
    pub entities_new: u64,
    pub entities_updated: u64,
    pub duplicates_dropped: usize,
    pub rejected: usize,
    pub interrupted: bool,
}

/// Searches one region: every query strategy, paginated, detail-fetched,
/// validated, and deduplicated against the shared index.
///
/// A search failure — permanent API error or a transient one that survived
/// the client's retries — abandons that query string and moves on to the
/// next strategy. The region as a whole fails only when every attempted
/// strategy failed; the caller logs it and continues with the next region.
/// Failed or missing detail fetches drop that candidate only.
///
/// The shutdown flag is checked between query strategies; whatever was
/// accepted before the flag flipped is returned for flushing.
///
/// # Errors
///
/// Returns [`PlacesError`] when every attempted search query failed.
pub async fn discover_region(
    client: &PlacesClient,
    profile: &DiscoveryProfile,
    region: &Region,
    index: &Mutex<IdentityIndex>,
    max_concurrent_details: usize,
    shutdown: &AtomicBool,
) -> Result<(Vec<Entity>, RegionStats), PlacesError> {
    let mut accepted: Vec<Entity> = Vec::new();
    let mut stats = RegionStats::default();
    let mut strategies_attempted = 0usize;
    let mut strategies_failed = 0usize;
    let mut last_error: Option<PlacesError> = None;

    // Serializes the pre-request sleeps so detail fetches start spaced by
    // the configured delay even when several run concurrently.
    let pacer = Mutex::new(());

    for query in profile.queries_for(region) {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        strategies_attempted += 1;
        let candidates = match client.search_all_pages(&query).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(
                    region = %region.code,
                    query = %query,
                    error = %e,
                    "query abandoned, moving to next strategy"
                );
                strategies_failed += 1;
                last_error = Some(e);
                continue;
            }
        };

        stats.candidates_seen += candidates.len();

        // Drop already-recorded place ids before spending quota on details.
        let mut fresh = Vec::with_capacity(candidates.len());
        {
            let idx = index.lock().await;
            for candidate in candidates {
                if idx.contains_place_id(&candidate.place_id) {
                    stats.duplicates += 1;
                } else {
                    fresh.push(candidate);
                }
            }
        }

        let detail_delay = client.detail_delay();
        let pacer = &pacer;
        let mut details = stream::iter(fresh.into_iter().map(|candidate| async move {
            {
                let _slot = pacer.lock().await;
                tokio::time::sleep(detail_delay).await;
            }
            let result = client.place_details(&candidate.place_id).await;
            (candidate, result)
        }))
        .buffer_unordered(max_concurrent_details.max(1));

        while let Some((candidate, result)) = details.next().await {
            let detail = match result {
                Ok(Some(detail)) => detail,
                Ok(None) => {
                    stats.details_missing += 1;
                    continue;
                }
                Err(e) => {
                    tracing::warn!(
                        place_id = %candidate.place_id,
                        error = %e,
                        "detail fetch failed, skipping candidate"
                    );
                    stats.details_missing += 1;
                    continue;
                }
            };

            let entity = entity_from_detail(detail, region.code);

            if let Err(reason) = validate(&entity, region, profile) {
                stats.rejected += 1;
                tracing::debug!(name = %entity.name, reason = %reason, "candidate rejected");
                continue;
            }

            match index.lock().await.check_and_record(&entity) {
                Some(tier) => {
                    stats.duplicates += 1;
                    tracing::debug!(name = %entity.name, tier = %tier, "duplicate dropped");
                }
                None => accepted.push(entity),
            }
        }
    }

    // last_error is only set when a strategy failed, so this triggers
    // exactly when every attempted strategy failed.
    if let Some(e) = last_error {
        if strategies_failed == strategies_attempted {
            return Err(e);
        }
    }

    Ok((accepted, stats))
}

/// Defensive re-scan of a run's accepted set with the fingerprint and
/// place-id tiers only.
///
/// When the in-run index did its job this keeps everything; a non-zero drop
/// count means an index bug and is logged loudly by the engine.
#[must_use]
pub fn final_dedup(entities: &[Entity], profile: &DiscoveryProfile) -> (Vec<Entity>, usize) {
    let mut index = IdentityIndex::new(profile.boilerplate_words);
    let mut kept = Vec::with_capacity(entities.len());
    let mut dropped = 0usize;

    for entity in entities {
        if index.check_strong(entity).is_some() {
            dropped += 1;
        } else {
            index.record(entity);
            kept.push(entity.clone());
        }
    }

    (kept, dropped)
}

/// Owns one end-to-end discovery run: run bookkeeping, region traversal,
/// per-region persistence, resume, and the final defensive pass.
pub struct DiscoveryEngine {
    pool: PgPool,
    client: PlacesClient,
    profile: &'static DiscoveryProfile,
    max_concurrent_details: usize,
    shutdown: Arc<AtomicBool>,
}

impl DiscoveryEngine {
    #[must_use]
    pub fn new(
        pool: PgPool,
        client: PlacesClient,
        profile: &'static DiscoveryProfile,
        max_concurrent_details: usize,
    ) -> Self {
        Self {
            pool,
            client,
            profile,
            max_concurrent_details,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle for signal handlers: set it and the engine stops at the next
    /// region boundary, flushing what the current region already accepted.
    #[must_use]
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Runs discovery over the whole catalog, or a single region when
    /// `region_filter` is set.
    ///
    /// With `resume`, regions already marked succeeded by any prior run are
    /// skipped. Each region's accepted batch is upserted as its own unit of
    /// work; a search failure in one region is recorded and the traversal
    /// continues, while a persistence failure aborts the run.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownRegion`] for a bad filter code and
    /// [`EngineError::Db`] when run bookkeeping or an upsert fails.
    pub async fn run(
        &self,
        region_filter: Option<&str>,
        resume: bool,
    ) -> Result<RunSummary, EngineError> {
        let regions: Vec<&Region> = match region_filter {
            Some(code) => {
                let region =
                    find_region(code).ok_or_else(|| EngineError::UnknownRegion(code.to_owned()))?;
                vec![region]
            }
            None => REGIONS.iter().collect(),
        };

        let run = parishdb_db::create_discovery_run(&self.pool, "cli").await?;
        parishdb_db::start_discovery_run(&self.pool, run.id).await?;

        tracing::info!(run_id = run.id, regions = regions.len(), "discovery run started");

        let index = Mutex::new(IdentityIndex::new(self.profile.boilerplate_words));
        let mut summary = RunSummary {
            run_id: run.id,
            ..RunSummary::default()
        };
        let mut all_accepted: Vec<Entity> = Vec::new();

        for region in regions {
            if self.shutdown.load(Ordering::Relaxed) {
                summary.interrupted = true;
                tracing::info!(region = %region.code, "shutdown requested, stopping traversal");
                break;
            }

            if resume && parishdb_db::region_already_covered(&self.pool, region.code).await? {
                summary.regions_skipped += 1;
                tracing::info!(region = %region.code, "already covered, skipping");
                continue;
            }

            let outcome = discover_region(
                &self.client,
                self.profile,
                region,
                &index,
                self.max_concurrent_details,
                &self.shutdown,
            )
            .await;

            match outcome {
                Ok((accepted, stats)) => {
                    let (new_count, updated_count) =
                        match parishdb_db::upsert_entities(&self.pool, &accepted).await {
                            Ok(counts) => counts,
                            Err(e) => {
                                let message = format!(
                                    "persisting region {} failed: {e}",
                                    region.code
                                );
                                self.mark_run_failed(run.id, &message).await;
                                return Err(EngineError::Db(DbError::from(e)));
                            }
                        };

                    // A shutdown flag flipped mid-region means only part of
                    // this region's query strategies ran; the flushed batch
                    // is kept but the region must stay eligible for --resume.
                    let cut_short = self.shutdown.load(Ordering::Relaxed);
                    let status = if cut_short { "interrupted" } else { "succeeded" };

                    let entity_count = i32::try_from(accepted.len()).unwrap_or(i32::MAX);
                    parishdb_db::upsert_run_region(
                        &self.pool,
                        run.id,
                        region.code,
                        status,
                        entity_count,
                        None,
                    )
                    .await?;

                    if cut_short {
                        summary.interrupted = true;
                    }

                    tracing::info!(
                        region = %region.code,
                        status,
                        accepted = accepted.len(),
                        new = new_count,
                        updated = updated_count,
                        duplicates = stats.duplicates,
                        rejected = stats.rejected,
                        "region complete"
                    );

                    summary.regions_searched += 1;
                    summary.entities_new += new_count;
                    summary.entities_updated += updated_count;
                    summary.duplicates_dropped += stats.duplicates;
                    summary.rejected += stats.rejected;
                    all_accepted.extend(accepted);
                }
                Err(e) => {
                    summary.regions_failed += 1;
                    tracing::error!(
                        region = %region.code,
                        error = %e,
                        "region failed, continuing with next"
                    );
                    parishdb_db::upsert_run_region(
                        &self.pool,
                        run.id,
                        region.code,
                        "failed",
                        0,
                        Some(&e.to_string()),
                    )
                    .await?;
                }
            }
        }

        let (kept, residual) = final_dedup(&all_accepted, self.profile);
        if residual > 0 {
            summary.duplicates_dropped += residual;
            tracing::warn!(
                residual,
                "final pass dropped duplicates the in-run index missed"
            );
        }

        let total = i32::try_from(kept.len()).unwrap_or(i32::MAX);
        parishdb_db::complete_discovery_run(&self.pool, run.id, total).await?;

        tracing::info!(
            run_id = run.id,
            searched = summary.regions_searched,
            skipped = summary.regions_skipped,
            failed = summary.regions_failed,
            new = summary.entities_new,
            updated = summary.entities_updated,
            "discovery run complete"
        );

        Ok(summary)
    }

    async fn mark_run_failed(&self, run_id: i64, message: &str) {
        if let Err(mark_err) = parishdb_db::fail_discovery_run(&self.pool, run_id, message).await {
            tracing::error!(run_id, error = %mark_err, "could not mark run as failed");
        }
    }
}
