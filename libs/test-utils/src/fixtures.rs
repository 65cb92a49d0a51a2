//! Inventory rows for DAO and end-to-end tests.

use anyhow::Result;
use chrono::NaiveDate;
use pricing_models::CategoryId;

use crate::postgres::TestPostgresContainer;

/// Inserts a room category with `units` available rooms and returns the
/// category id and the room ids.
pub async fn create_category(
    container: &TestPostgresContainer, name: &str, base_price: f64, units: usize,
) -> Result<(CategoryId, Vec<i64>)> {
    let client = container.pool.get().await?;
    let row = client
        .query_one(
            "INSERT INTO room_types (name, base_price)
             VALUES ($1, $2::FLOAT8::NUMERIC) RETURNING id",
            &[&name, &base_price],
        )
        .await?;
    let category_id: CategoryId = row.get("id");

    let mut rooms = Vec::with_capacity(units);
    for n in 0..units {
        let room_number = format!("{category_id}-{n:03}");
        let row = client
            .query_one(
                "INSERT INTO rooms (room_type_id, room_number)
                 VALUES ($1, $2) RETURNING id",
                &[&category_id, &room_number],
            )
            .await?;
        rooms.push(row.get("id"));
    }

    Ok((category_id, rooms))
}

pub async fn create_booking(
    container: &TestPostgresContainer, room_id: i64, check_in: NaiveDate,
    check_out: NaiveDate, status: &str,
) -> Result<i64> {
    let client = container.pool.get().await?;
    let row = client
        .query_one(
            "INSERT INTO bookings (room_id, check_in_date, check_out_date, \
             status)
             VALUES ($1, $2, $3, $4) RETURNING id",
            &[&room_id, &check_in, &check_out, &status],
        )
        .await?;
    Ok(row.get("id"))
}

pub async fn create_maintenance(
    container: &TestPostgresContainer, room_id: i64, start: NaiveDate,
    end: NaiveDate,
) -> Result<()> {
    let client = container.pool.get().await?;
    client
        .execute(
            "INSERT INTO room_maintenance (room_id, start_date, end_date)
             VALUES ($1, $2, $3)",
            &[&room_id, &start, &end],
        )
        .await?;
    Ok(())
}

pub async fn set_room_status(
    container: &TestPostgresContainer, room_id: i64, status: &str,
) -> Result<()> {
    let client = container.pool.get().await?;
    client
        .execute("UPDATE rooms SET status = $2 WHERE id = $1", &[
            &room_id, &status,
        ])
        .await?;
    Ok(())
}

/// `current_price` as stored, read back through a float cast.
pub async fn current_price(
    container: &TestPostgresContainer, category_id: CategoryId,
) -> Result<Option<f64>> {
    let client = container.pool.get().await?;
    let row = client
        .query_one(
            "SELECT current_price::FLOAT8 AS current_price FROM room_types \
             WHERE id = $1",
            &[&category_id],
        )
        .await?;
    Ok(row.get("current_price"))
}
