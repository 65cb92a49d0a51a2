//! Sample inventory for a fresh database.

use anyhow::Result;
use pricing_models::CategoryId;
use sql_connection::SqlConnect;
use tracing::info;

/// Sample categories: name, base price, rooms.
pub const SEED_CATEGORIES: &[(&str, f64, i64)] = &[
    ("Standard", 120.0, 20),
    ("Deluxe", 200.0, 10),
    ("Suite", 450.0, 4),
];

const UPSERT_CATEGORY: &str = "INSERT INTO room_types (name, base_price)
    VALUES ($1, $2::FLOAT8::NUMERIC)
    ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
    RETURNING id";

const INSERT_ROOMS: &str = "INSERT INTO rooms (room_type_id, room_number)
    SELECT $1::BIGINT, $1::BIGINT::TEXT || '-' || LPAD(n::TEXT, 3, '0')
    FROM generate_series(1, $2::BIGINT) AS n
    ON CONFLICT (room_number) DO NOTHING";

/// Inserts the sample categories and their rooms. Existing rows are kept,
/// so running it twice is harmless. Returns the category ids in
/// [`SEED_CATEGORIES`] order.
pub async fn seed_inventory(db: &SqlConnect) -> Result<Vec<CategoryId>> {
    let client = db.get_client().await?;
    let upsert = client.prepare_cached(UPSERT_CATEGORY).await?;
    let insert_rooms = client.prepare_cached(INSERT_ROOMS).await?;

    let mut ids = Vec::with_capacity(SEED_CATEGORIES.len());
    for &(name, base_price, rooms) in SEED_CATEGORIES {
        let row = client.query_one(&upsert, &[&name, &base_price]).await?;
        let category_id: CategoryId = row.get("id");

        let inserted =
            client.execute(&insert_rooms, &[&category_id, &rooms]).await?;

        info!(category_id, name, inserted, "Seeded room category");
        ids.push(category_id);
    }

    Ok(ids)
}
