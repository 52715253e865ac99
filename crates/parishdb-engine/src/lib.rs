//! Discovery engine: region traversal, validation, and deduplication.
//!
//! Pulls candidates from the place-search client region by region, promotes
//! them to entities, validates region and category membership, drops
//! duplicates through a three-tier identity index, and persists each
//! region's batch through parishdb-db.

pub mod dedup;
pub mod engine;
pub mod normalize;
pub mod profile;
pub mod regions;
pub mod validate;

pub use dedup::{DuplicateTier, IdentityIndex};
pub use engine::{
    discover_region, final_dedup, DiscoveryEngine, EngineError, RegionStats, RunSummary,
};
pub use profile::{DiscoveryProfile, COPTIC_CHURCHES};
pub use regions::{find_region, REGIONS};
pub use validate::{validate, RejectReason};
