//! Catalog operations for the `entities` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use parishdb_core::Entity;

const ENTITY_COLUMNS: &str = "id, public_id, place_id, name, formatted_address, latitude, \
     longitude, phone, website, rating, review_count, city, state, country, postal_code, \
     category_tags, business_status, maps_url, region_code, discovered_at, last_updated_at";

/// A row from the `entities` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EntityRow {
    pub id: i64,
    pub public_id: Uuid,
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
    pub category_tags: Option<String>,
    pub business_status: Option<String>,
    pub maps_url: Option<String>,
    pub region_code: String,
    pub discovered_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

/// Insert new entities and merge already-known ones, keyed by `place_id`.
///
/// Returns `(new_count, updated_count)`. The merge overwrites every mutable
/// field and refreshes `last_updated_at`; `discovered_at` is preserved from
/// the first insert. Re-running the whole pipeline against a populated
/// catalog is therefore safe and creates no duplicate rows.
///
/// Uses a single `INSERT … SELECT * FROM UNNEST(…) ON CONFLICT` so the whole
/// batch is upserted in one round-trip regardless of batch size.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn upsert_entities(pool: &PgPool, entities: &[Entity]) -> Result<(u64, u64), sqlx::Error> {
    if entities.is_empty() {
        return Ok((0, 0));
    }

    // Collect each column into a parallel Vec for UNNEST binding.
    let mut place_ids: Vec<String> = Vec::with_capacity(entities.len());
    let mut names: Vec<String> = Vec::with_capacity(entities.len());
    let mut formatted_addresses: Vec<Option<String>> = Vec::with_capacity(entities.len());
    let mut latitudes: Vec<Option<f64>> = Vec::with_capacity(entities.len());
    let mut longitudes: Vec<Option<f64>> = Vec::with_capacity(entities.len());
    let mut phones: Vec<Option<String>> = Vec::with_capacity(entities.len());
    let mut websites: Vec<Option<String>> = Vec::with_capacity(entities.len());
    let mut ratings: Vec<Option<f64>> = Vec::with_capacity(entities.len());
    let mut review_counts: Vec<Option<i64>> = Vec::with_capacity(entities.len());
    let mut cities: Vec<Option<String>> = Vec::with_capacity(entities.len());
    let mut states: Vec<Option<String>> = Vec::with_capacity(entities.len());
    let mut countries: Vec<Option<String>> = Vec::with_capacity(entities.len());
    let mut postal_codes: Vec<Option<String>> = Vec::with_capacity(entities.len());
    let mut category_tags: Vec<Option<String>> = Vec::with_capacity(entities.len());
    let mut business_statuses: Vec<Option<String>> = Vec::with_capacity(entities.len());
    let mut maps_urls: Vec<Option<String>> = Vec::with_capacity(entities.len());
    let mut region_codes: Vec<String> = Vec::with_capacity(entities.len());

    for e in entities {
        place_ids.push(e.place_id.clone());
        names.push(e.name.clone());
        formatted_addresses.push(e.formatted_address.clone());
        latitudes.push(e.latitude);
        longitudes.push(e.longitude);
        phones.push(e.phone.clone());
        websites.push(e.website.clone());
        ratings.push(e.rating);
        review_counts.push(e.review_count);
        cities.push(e.city.clone());
        states.push(e.state.clone());
        countries.push(e.country.clone());
        postal_codes.push(e.postal_code.clone());
        category_tags.push(e.category_tags.clone());
        business_statuses.push(e.business_status.clone());
        maps_urls.push(e.maps_url.clone());
        region_codes.push(e.region_code.clone());
    }

    let rows: Vec<bool> = sqlx::query_scalar::<_, bool>(
        "INSERT INTO entities \
             (place_id, name, formatted_address, latitude, longitude, phone, website, \
              rating, review_count, city, state, country, postal_code, category_tags, \
              business_status, maps_url, region_code) \
         SELECT * FROM UNNEST(\
              $1::text[], $2::text[], $3::text[], $4::float8[], $5::float8[], $6::text[], \
              $7::text[], $8::float8[], $9::int8[], $10::text[], $11::text[], $12::text[], \
              $13::text[], $14::text[], $15::text[], $16::text[], $17::text[]) \
         ON CONFLICT (place_id) DO UPDATE SET \
             last_updated_at   = NOW(), \
             name              = EXCLUDED.name, \
             formatted_address = EXCLUDED.formatted_address, \
             latitude          = EXCLUDED.latitude, \
             longitude         = EXCLUDED.longitude, \
             phone             = EXCLUDED.phone, \
             website           = EXCLUDED.website, \
             rating            = EXCLUDED.rating, \
             review_count      = EXCLUDED.review_count, \
             city              = EXCLUDED.city, \
             state             = EXCLUDED.state, \
             country           = EXCLUDED.country, \
             postal_code       = EXCLUDED.postal_code, \
             category_tags     = EXCLUDED.category_tags, \
             business_status   = EXCLUDED.business_status, \
             maps_url          = EXCLUDED.maps_url, \
             region_code       = EXCLUDED.region_code \
         RETURNING (xmax = 0) AS is_new",
    )
    .bind(&place_ids)
    .bind(&names)
    .bind(&formatted_addresses)
    .bind(&latitudes)
    .bind(&longitudes)
    .bind(&phones)
    .bind(&websites)
    .bind(&ratings)
    .bind(&review_counts)
    .bind(&cities)
    .bind(&states)
    .bind(&countries)
    .bind(&postal_codes)
    .bind(&category_tags)
    .bind(&business_statuses)
    .bind(&maps_urls)
    .bind(&region_codes)
    .fetch_all(pool)
    .await?;

    let new_count = rows.iter().filter(|&&is_new| is_new).count() as u64;
    let updated_count = rows.len() as u64 - new_count;

    Ok((new_count, updated_count))
}

/// Fetch one entity by its external `place_id`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_entity_by_place_id(
    pool: &PgPool,
    place_id: &str,
) -> Result<Option<EntityRow>, sqlx::Error> {
    sqlx::query_as::<_, EntityRow>(&format!(
        "SELECT {ENTITY_COLUMNS} FROM entities WHERE place_id = $1"
    ))
    .bind(place_id)
    .fetch_optional(pool)
    .await
}

/// Total number of catalogued entities.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn count_entities(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM entities")
        .fetch_one(pool)
        .await
}

/// Number of entities attributed to one region.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn count_entities_by_region(pool: &PgPool, region_code: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM entities WHERE region_code = $1")
        .bind(region_code)
        .fetch_one(pool)
        .await
}

/// Per-region entity counts, largest first. Regions with no entities are
/// absent.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn count_entities_per_region(pool: &PgPool) -> Result<Vec<(String, i64)>, sqlx::Error> {
    sqlx::query_as::<_, (String, i64)>(
        "SELECT region_code, COUNT(*) FROM entities \
         GROUP BY region_code \
         ORDER BY COUNT(*) DESC, region_code",
    )
    .fetch_all(pool)
    .await
}

/// List entities in a state/province, newest discoveries first.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_entities_by_state(
    pool: &PgPool,
    state: &str,
) -> Result<Vec<EntityRow>, sqlx::Error> {
    sqlx::query_as::<_, EntityRow>(&format!(
        "SELECT {ENTITY_COLUMNS} FROM entities \
         WHERE UPPER(state) = UPPER($1) \
         ORDER BY discovered_at DESC, id"
    ))
    .bind(state)
    .fetch_all(pool)
    .await
}

/// List entities within `radius_miles` of a point, nearest first.
///
/// Great-circle distance computed with the haversine formula in SQL; rows
/// without coordinates are excluded. This is a sequential scan by design —
/// the catalog is small enough that a geospatial index would be overkill.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn find_entities_near(
    pool: &PgPool,
    latitude: f64,
    longitude: f64,
    radius_miles: f64,
) -> Result<Vec<EntityRow>, sqlx::Error> {
    sqlx::query_as::<_, EntityRow>(&format!(
        "SELECT {ENTITY_COLUMNS} FROM entities \
         WHERE latitude IS NOT NULL AND longitude IS NOT NULL \
           AND 3959.0 * acos(LEAST(1.0, \
                 cos(radians($1)) * cos(radians(latitude)) \
                 * cos(radians(longitude) - radians($2)) \
                 + sin(radians($1)) * sin(radians(latitude)))) <= $3 \
         ORDER BY 3959.0 * acos(LEAST(1.0, \
                 cos(radians($1)) * cos(radians(latitude)) \
                 * cos(radians(longitude) - radians($2)) \
                 + sin(radians($1)) * sin(radians(latitude))))"
    ))
    .bind(latitude)
    .bind(longitude)
    .bind(radius_miles)
    .fetch_all(pool)
    .await
}
