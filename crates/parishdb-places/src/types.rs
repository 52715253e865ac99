//! Wire types for the place-search API.
//!
//! The API wraps every payload in an envelope carrying a `status` string;
//! [`crate::PlacesClient`] inspects the status before deserializing the
//! payload, so these types only need to model the success shapes.

use serde::Deserialize;

use parishdb_core::Candidate;

/// Envelope for the text-search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<SearchResult>,
    pub next_page_token: Option<String>,
    pub error_message: Option<String>,
}

/// One raw search hit: just enough to decide whether a detail fetch is worth
/// the quota cost.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub place_id: String,
    pub name: String,
    pub formatted_address: Option<String>,
}

impl From<SearchResult> for Candidate {
    fn from(r: SearchResult) -> Self {
        Candidate {
            place_id: r.place_id,
            name: r.name,
            formatted_address: r.formatted_address,
        }
    }
}

/// One page of search results plus the token for the next page, if any.
#[derive(Debug)]
pub struct SearchPage {
    pub candidates: Vec<Candidate>,
    pub next_page_token: Option<String>,
}

/// Envelope for the place-details endpoint.
#[derive(Debug, Deserialize)]
pub struct DetailResponse {
    pub status: String,
    pub result: Option<PlaceDetail>,
    pub error_message: Option<String>,
}

/// Full structured detail for one place.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceDetail {
    pub place_id: String,
    pub name: String,
    pub formatted_address: Option<String>,
    pub geometry: Option<Geometry>,
    pub formatted_phone_number: Option<String>,
    pub international_phone_number: Option<String>,
    pub website: Option<String>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<i64>,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    #[serde(default)]
    pub types: Vec<String>,
    pub business_status: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// One structured address component, tagged with its semantic types
/// (`locality`, `administrative_area_level_1`, `country`, `postal_code`, …).
#[derive(Debug, Clone, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}
