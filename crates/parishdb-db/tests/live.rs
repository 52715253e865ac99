//! Live integration tests for parishdb-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/parishdb-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use parishdb_core::Entity;
use parishdb_db::{
    complete_discovery_run, count_entities, count_entities_by_region, count_entities_per_region,
    create_discovery_run, fail_discovery_run, find_entities_near, get_discovery_run,
    get_entity_by_place_id, list_entities_by_state, region_already_covered, start_discovery_run,
    upsert_entities, upsert_run_region,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_entity(place_id: &str, region_code: &str) -> Entity {
    Entity {
        place_id: place_id.to_string(),
        name: "St. Mark Coptic Orthodox Church".to_string(),
        formatted_address: Some("100 Main St, Jersey City, NJ 07302, USA".to_string()),
        latitude: Some(40.7178),
        longitude: Some(-74.0431),
        phone: Some("(201) 555-0100".to_string()),
        website: Some("https://stmark.example.org".to_string()),
        rating: Some(4.8),
        review_count: Some(120),
        city: Some("Jersey City".to_string()),
        state: Some("NJ".to_string()),
        country: Some("United States".to_string()),
        postal_code: Some("07302".to_string()),
        category_tags: Some("church,place_of_worship".to_string()),
        business_status: Some("OPERATIONAL".to_string()),
        maps_url: Some("https://maps.google.com/?cid=1".to_string()),
        region_code: region_code.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Section 1: Discovery Run Lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn discovery_run_lifecycle_queued_to_succeeded(pool: sqlx::PgPool) {
    let run = create_discovery_run(&pool, "cli")
        .await
        .expect("create_discovery_run failed");

    assert_eq!(run.status, "queued");
    assert!(run.started_at.is_none());
    assert!(run.completed_at.is_none());
    assert_eq!(run.entities_discovered, 0);

    start_discovery_run(&pool, run.id)
        .await
        .expect("start_discovery_run failed");

    complete_discovery_run(&pool, run.id, 7)
        .await
        .expect("complete_discovery_run failed");

    let fetched = get_discovery_run(&pool, run.id)
        .await
        .expect("get_discovery_run failed");

    assert_eq!(fetched.status, "succeeded");
    assert!(fetched.started_at.is_some(), "started_at should be set");
    assert!(fetched.completed_at.is_some(), "completed_at should be set");
    assert_eq!(fetched.entities_discovered, 7);
    assert!(fetched.error_message.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn discovery_run_lifecycle_queued_to_failed(pool: sqlx::PgPool) {
    let run = create_discovery_run(&pool, "cli")
        .await
        .expect("create_discovery_run failed");

    start_discovery_run(&pool, run.id)
        .await
        .expect("start_discovery_run failed");

    fail_discovery_run(&pool, run.id, "network error")
        .await
        .expect("fail_discovery_run failed");

    let fetched = get_discovery_run(&pool, run.id)
        .await
        .expect("get_discovery_run failed");

    assert_eq!(fetched.status, "failed");
    assert!(fetched.started_at.is_some(), "started_at should be set");
    assert!(fetched.completed_at.is_some(), "completed_at should be set");
    assert_eq!(fetched.error_message.as_deref(), Some("network error"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn discovery_run_cannot_complete_directly_from_queued(pool: sqlx::PgPool) {
    let run = create_discovery_run(&pool, "cli")
        .await
        .expect("create_discovery_run failed");

    let err = complete_discovery_run(&pool, run.id, 1)
        .await
        .expect_err("completing a queued run should fail");

    assert!(matches!(
        err,
        parishdb_db::DbError::InvalidRunTransition {
            expected_status: "running",
            ..
        }
    ));
}

#[sqlx::test(migrations = "../../migrations")]
async fn discovery_run_start_fails_for_unknown_id(pool: sqlx::PgPool) {
    let err = start_discovery_run(&pool, 999_999)
        .await
        .expect_err("starting an unknown run should fail");

    assert!(matches!(
        err,
        parishdb_db::DbError::InvalidRunTransition {
            expected_status: "queued",
            ..
        }
    ));
}

#[sqlx::test(migrations = "../../migrations")]
async fn discovery_run_can_fail_before_starting(pool: sqlx::PgPool) {
    // A run that never left queued (e.g. the pool dropped before the first
    // region) must still be markable as failed.
    let run = create_discovery_run(&pool, "cli")
        .await
        .expect("create_discovery_run failed");

    fail_discovery_run(&pool, run.id, "startup error")
        .await
        .expect("fail_discovery_run failed");

    let fetched = get_discovery_run(&pool, run.id).await.expect("get failed");
    assert_eq!(fetched.status, "failed");
    assert_eq!(fetched.error_message.as_deref(), Some("startup error"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn get_discovery_run_not_found(pool: sqlx::PgPool) {
    let err = get_discovery_run(&pool, 424_242)
        .await
        .expect_err("unknown run id should error");

    assert!(matches!(err, parishdb_db::DbError::NotFound));
}

// ---------------------------------------------------------------------------
// Section 2: Entity Upsert Idempotency
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn entity_upsert_counts_new_then_updated(pool: sqlx::PgPool) {
    let batch = vec![make_entity("place-a", "NJ"), make_entity("place-b", "NJ")];

    let (new_count, updated_count) = upsert_entities(&pool, &batch)
        .await
        .expect("first upsert failed");
    assert_eq!((new_count, updated_count), (2, 0));

    let (new_count, updated_count) = upsert_entities(&pool, &batch)
        .await
        .expect("second upsert failed");
    assert_eq!((new_count, updated_count), (0, 2));

    let total = count_entities(&pool).await.expect("count failed");
    assert_eq!(total, 2, "re-upserting must not create duplicate rows");
}

#[sqlx::test(migrations = "../../migrations")]
async fn entity_upsert_empty_batch_is_a_noop(pool: sqlx::PgPool) {
    let (new_count, updated_count) = upsert_entities(&pool, &[]).await.expect("upsert failed");
    assert_eq!((new_count, updated_count), (0, 0));
}

#[sqlx::test(migrations = "../../migrations")]
async fn entity_upsert_preserves_discovered_at_and_overwrites_fields(pool: sqlx::PgPool) {
    let mut entity = make_entity("place-merge", "NJ");
    upsert_entities(&pool, std::slice::from_ref(&entity))
        .await
        .expect("first upsert failed");

    let first = get_entity_by_place_id(&pool, "place-merge")
        .await
        .expect("fetch failed")
        .expect("row should exist");

    entity.name = "St. Mark Coptic Orthodox Cathedral".to_string();
    entity.phone = None;
    entity.rating = Some(4.9);
    upsert_entities(&pool, std::slice::from_ref(&entity))
        .await
        .expect("second upsert failed");

    let second = get_entity_by_place_id(&pool, "place-merge")
        .await
        .expect("fetch failed")
        .expect("row should exist");

    assert_eq!(second.id, first.id, "upsert must keep the same row");
    assert_eq!(
        second.discovered_at, first.discovered_at,
        "discovered_at should be preserved from the first insert"
    );
    assert!(
        second.last_updated_at > first.last_updated_at,
        "last_updated_at should advance on merge"
    );
    assert_eq!(second.name, "St. Mark Coptic Orthodox Cathedral");
    assert!(second.phone.is_none(), "merge overwrites with the new value");
    assert_eq!(second.rating, Some(4.9));
}

#[sqlx::test(migrations = "../../migrations")]
async fn entity_upsert_persists_all_fields(pool: sqlx::PgPool) {
    let entity = make_entity("place-full", "NJ");
    upsert_entities(&pool, std::slice::from_ref(&entity))
        .await
        .expect("upsert failed");

    let row = get_entity_by_place_id(&pool, "place-full")
        .await
        .expect("fetch failed")
        .expect("row should exist");

    assert_eq!(row.name, entity.name);
    assert_eq!(row.formatted_address, entity.formatted_address);
    assert_eq!(row.latitude, entity.latitude);
    assert_eq!(row.longitude, entity.longitude);
    assert_eq!(row.phone, entity.phone);
    assert_eq!(row.website, entity.website);
    assert_eq!(row.rating, entity.rating);
    assert_eq!(row.review_count, entity.review_count);
    assert_eq!(row.city, entity.city);
    assert_eq!(row.state, entity.state);
    assert_eq!(row.country, entity.country);
    assert_eq!(row.postal_code, entity.postal_code);
    assert_eq!(row.category_tags, entity.category_tags);
    assert_eq!(row.business_status, entity.business_status);
    assert_eq!(row.maps_url, entity.maps_url);
    assert_eq!(row.region_code, "NJ");
}

// ---------------------------------------------------------------------------
// Section 3: Entity Queries
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn count_entities_by_region_counts_only_that_region(pool: sqlx::PgPool) {
    let batch = vec![
        make_entity("nj-1", "NJ"),
        make_entity("nj-2", "NJ"),
        make_entity("ny-1", "NY"),
    ];
    upsert_entities(&pool, &batch).await.expect("upsert failed");

    let nj = count_entities_by_region(&pool, "NJ").await.unwrap();
    let ny = count_entities_by_region(&pool, "NY").await.unwrap();
    let tx = count_entities_by_region(&pool, "TX").await.unwrap();

    assert_eq!(nj, 2);
    assert_eq!(ny, 1);
    assert_eq!(tx, 0);

    let per_region = count_entities_per_region(&pool).await.unwrap();
    assert_eq!(per_region, vec![("NJ".to_string(), 2), ("NY".to_string(), 1)]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_entities_by_state_matches_case_insensitively(pool: sqlx::PgPool) {
    let mut in_state = make_entity("nj-list", "NJ");
    in_state.state = Some("NJ".to_string());
    let mut out_of_state = make_entity("ny-list", "NY");
    out_of_state.state = Some("NY".to_string());
    upsert_entities(&pool, &[in_state, out_of_state])
        .await
        .expect("upsert failed");

    let rows = list_entities_by_state(&pool, "nj")
        .await
        .expect("list failed");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].place_id, "nj-list");
}

#[sqlx::test(migrations = "../../migrations")]
async fn find_entities_near_filters_by_radius_and_orders_nearest_first(pool: sqlx::PgPool) {
    // Jersey City, Manhattan (~5 miles away), and Philadelphia (~75 miles away).
    let mut jersey_city = make_entity("near-jc", "NJ");
    jersey_city.latitude = Some(40.7178);
    jersey_city.longitude = Some(-74.0431);

    let mut manhattan = make_entity("near-nyc", "NY");
    manhattan.latitude = Some(40.7580);
    manhattan.longitude = Some(-73.9855);

    let mut philadelphia = make_entity("near-phl", "PA");
    philadelphia.latitude = Some(39.9526);
    philadelphia.longitude = Some(-75.1652);

    let mut no_coords = make_entity("near-none", "NJ");
    no_coords.latitude = None;
    no_coords.longitude = None;

    upsert_entities(&pool, &[jersey_city, manhattan, philadelphia, no_coords])
        .await
        .expect("upsert failed");

    let rows = find_entities_near(&pool, 40.7178, -74.0431, 25.0)
        .await
        .expect("query failed");

    assert_eq!(rows.len(), 2, "Philadelphia and the coordinate-less row are out");
    assert_eq!(rows[0].place_id, "near-jc", "nearest first");
    assert_eq!(rows[1].place_id, "near-nyc");
}

// ---------------------------------------------------------------------------
// Section 4: Run Regions and Resume Coverage
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_run_region_overwrites_on_conflict(pool: sqlx::PgPool) {
    let run = create_discovery_run(&pool, "cli")
        .await
        .expect("create_discovery_run failed");

    // First call: simulate a failure recording
    upsert_run_region(&pool, run.id, "NJ", "failed", 0, Some("first error"))
        .await
        .expect("first upsert_run_region failed");

    // Second call: simulate a re-run that succeeded
    upsert_run_region(&pool, run.id, "NJ", "succeeded", 4, None)
        .await
        .expect("second upsert_run_region failed");

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM discovery_run_regions \
         WHERE discovery_run_id = $1 AND region_code = 'NJ'",
    )
    .bind(run.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1, "upsert should produce exactly one row");

    let (status, entity_count, error_message): (String, i32, Option<String>) = sqlx::query_as(
        "SELECT status, entity_count, error_message FROM discovery_run_regions \
         WHERE discovery_run_id = $1 AND region_code = 'NJ'",
    )
    .bind(run.id)
    .fetch_one(&pool)
    .await
    .expect("fetch upserted row failed");

    assert_eq!(status, "succeeded");
    assert_eq!(entity_count, 4);
    assert!(error_message.is_none(), "error_message should be cleared");
}

#[sqlx::test(migrations = "../../migrations")]
async fn region_coverage_requires_a_succeeded_row(pool: sqlx::PgPool) {
    let run = create_discovery_run(&pool, "cli")
        .await
        .expect("create_discovery_run failed");

    assert!(!region_already_covered(&pool, "NJ").await.unwrap());

    upsert_run_region(&pool, run.id, "NJ", "failed", 0, Some("quota"))
        .await
        .expect("upsert_run_region failed");
    assert!(
        !region_already_covered(&pool, "NJ").await.unwrap(),
        "a failed region is not covered"
    );

    upsert_run_region(&pool, run.id, "NJ", "succeeded", 3, None)
        .await
        .expect("upsert_run_region failed");
    assert!(region_already_covered(&pool, "NJ").await.unwrap());
}

#[sqlx::test(migrations = "../../migrations")]
async fn region_with_zero_entities_still_counts_as_covered(pool: sqlx::PgPool) {
    let run = create_discovery_run(&pool, "cli")
        .await
        .expect("create_discovery_run failed");

    upsert_run_region(&pool, run.id, "WY", "succeeded", 0, None)
        .await
        .expect("upsert_run_region failed");

    assert!(
        region_already_covered(&pool, "WY").await.unwrap(),
        "empty regions must not be re-searched on resume"
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn region_coverage_spans_prior_runs(pool: sqlx::PgPool) {
    let first = create_discovery_run(&pool, "cli").await.unwrap();
    upsert_run_region(&pool, first.id, "OH", "succeeded", 2, None)
        .await
        .unwrap();

    // A later run sees coverage from the earlier one.
    let _second = create_discovery_run(&pool, "cli").await.unwrap();
    assert!(region_already_covered(&pool, "OH").await.unwrap());
}
