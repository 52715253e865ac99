//! Normalization from the raw detail payload to [`parishdb_core::Entity`].
//!
//! The API returns location metadata as a flat list of tagged address
//! components; this module folds them into the explicit columns the catalog
//! stores. Every field is set here, at construction — nothing is attached
//! later by downstream code paths.

use parishdb_core::Entity;

use crate::types::PlaceDetail;

/// Builds an [`Entity`] from a detail payload, attributed to `region_code`.
#[must_use]
pub fn entity_from_detail(detail: PlaceDetail, region_code: &str) -> Entity {
    let (latitude, longitude) = match &detail.geometry {
        Some(g) => (Some(g.location.lat), Some(g.location.lng)),
        None => (None, None),
    };

    let mut city = None;
    let mut state = None;
    let mut country = None;
    let mut postal_code = None;
    for component in &detail.address_components {
        if component.types.iter().any(|t| t == "locality") {
            city = Some(component.long_name.clone());
        } else if component
            .types
            .iter()
            .any(|t| t == "administrative_area_level_1")
        {
            state = Some(component.short_name.clone());
        } else if component.types.iter().any(|t| t == "country") {
            country = Some(component.long_name.clone());
        } else if component.types.iter().any(|t| t == "postal_code") {
            postal_code = Some(component.long_name.clone());
        }
    }

    let phone = detail
        .formatted_phone_number
        .or(detail.international_phone_number);

    let category_tags = if detail.types.is_empty() {
        None
    } else {
        Some(detail.types.join(","))
    };

    Entity {
        place_id: detail.place_id,
        name: detail.name,
        formatted_address: detail.formatted_address,
        latitude,
        longitude,
        phone,
        website: detail.website,
        rating: detail.rating,
        review_count: detail.user_ratings_total,
        city,
        state,
        country,
        postal_code,
        category_tags,
        business_status: detail.business_status,
        maps_url: detail.url,
        region_code: region_code.to_owned(),
    }
}
