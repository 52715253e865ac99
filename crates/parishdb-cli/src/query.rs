//! Read-only catalog queries for the CLI.

use parishdb_db::EntityRow;

fn print_entity(row: &EntityRow) {
    println!("{} ({})", row.name, row.place_id);
    if let Some(address) = &row.formatted_address {
        println!("    {address}");
    }
    if let Some(phone) = &row.phone {
        println!("    {phone}");
    }
    if let Some(website) = &row.website {
        println!("    {website}");
    }
    if let Some(rating) = row.rating {
        let reviews = row.review_count.unwrap_or(0);
        println!("    rated {rating:.1} ({reviews} reviews)");
    }
}

pub(crate) async fn run_query_state(pool: &sqlx::PgPool, state: &str) -> anyhow::Result<()> {
    let rows = parishdb_db::list_entities_by_state(pool, state).await?;

    if rows.is_empty() {
        println!("no entities in {}", state.to_uppercase());
        return Ok(());
    }

    println!("{} entities in {}:", rows.len(), state.to_uppercase());
    for row in &rows {
        print_entity(row);
    }

    Ok(())
}

pub(crate) async fn run_query_near(
    pool: &sqlx::PgPool,
    lat: f64,
    lng: f64,
    radius_miles: f64,
) -> anyhow::Result<()> {
    anyhow::ensure!(
        (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng),
        "coordinates out of range"
    );

    let rows = parishdb_db::find_entities_near(pool, lat, lng, radius_miles).await?;

    if rows.is_empty() {
        println!("no entities within {radius_miles} miles of ({lat}, {lng})");
        return Ok(());
    }

    println!("{} entities within {radius_miles} miles, nearest first:", rows.len());
    for row in &rows {
        print_entity(row);
    }

    Ok(())
}

pub(crate) async fn run_stats(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let total = parishdb_db::count_entities(pool).await?;
    let per_region = parishdb_db::count_entities_per_region(pool).await?;

    println!("{total} entities across {} regions", per_region.len());
    for (region_code, count) in &per_region {
        println!("  {region_code:<8} {count}");
    }

    Ok(())
}
