//! Client for the external place-search API.
//!
//! Two operations back the discovery pipeline: a paginated text search that
//! yields [`parishdb_core::Candidate`]s and a detail lookup that enriches one
//! candidate into a full [`parishdb_core::Entity`]. Rate limiting, page-token
//! warm-up handling, and retry with backoff all live here so callers see a
//! uniform interface.

mod client;
mod error;
mod normalize;
mod retry;
pub mod types;

pub use client::{PlacesClient, PlacesConfig};
pub use error::PlacesError;
pub use normalize::entity_from_detail;
