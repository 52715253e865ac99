//! Domain types shared across the discovery pipeline.

use serde::{Deserialize, Serialize};

/// A geographic search unit: one traversal step of the discovery run and one
/// validation context for everything found under it.
///
/// Regions are defined once at startup and never mutated. `expected_country`
/// and `expected_state` drive the location validator: a result attributed to
/// this region must resolve to the expected country (and state, when set).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Short stable identifier, e.g. `"NJ"`, `"ON"`, `"EG"`.
    pub code: &'static str,
    /// Human-readable name used to build search queries, e.g. `"New Jersey"`.
    pub display_name: &'static str,
    /// Country the results must resolve to (substring match, case-insensitive).
    pub expected_country: &'static str,
    /// State/province code results must carry, for sub-national regions.
    pub expected_state: Option<&'static str>,
}

/// A raw search result before detail enrichment.
///
/// Ephemeral: either promoted to an [`Entity`] via a detail fetch or dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub place_id: String,
    pub name: String,
    /// Coarse location hint from the search response, when present.
    pub formatted_address: Option<String>,
}

/// A canonical discovered place record.
///
/// Every field is declared here from construction; optional data is `None`
/// rather than absent. `place_id` is the API's stable key and is globally
/// unique in the catalog. Timestamps (`discovered_at` / `last_updated_at`)
/// live on the stored row and are managed by the catalog store: the merge
/// overwrites every field here but preserves the original `discovered_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub place_id: String,
    pub name: String,
    pub formatted_address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<i64>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    /// Comma-joined category tags from the API (`types` field).
    pub category_tags: Option<String>,
    pub business_status: Option<String>,
    pub maps_url: Option<String>,
    /// Code of the region whose search surfaced this entity.
    pub region_code: String,
}

impl Entity {
    /// Whether the coordinate pair, when present, falls in the plausible
    /// range (−90..=90 latitude, −180..=180 longitude).
    #[must_use]
    pub fn coordinates_plausible(&self) -> bool {
        let lat_ok = self.latitude.is_none_or(|v| (-90.0..=90.0).contains(&v));
        let lng_ok = self
            .longitude
            .is_none_or(|v| (-180.0..=180.0).contains(&v));
        lat_ok && lng_ok
    }
}
