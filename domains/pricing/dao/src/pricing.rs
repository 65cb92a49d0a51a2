use async_trait::async_trait;
use chrono::NaiveDate;
use pricing_errors::StorageError;
use pricing_models::{CategoryId, CategoryPrices};
use sql_connection::SqlConnect;
use tracing::{debug, instrument};

use crate::store::PricingStore;

const LIST_CATEGORIES: &str = "SELECT id FROM room_types ORDER BY id";

const UNIT_COUNT: &str =
    "SELECT COUNT(*) AS units FROM rooms WHERE room_type_id = $1";

const BOOKED_UNIT_NIGHTS: &str = "
    SELECT COALESCE(SUM(GREATEST(
        LEAST(b.check_out_date, $3) - GREATEST(b.check_in_date, $2), 0
    )), 0)::BIGINT AS nights
    FROM bookings b
    JOIN rooms r ON b.room_id = r.id
    WHERE r.room_type_id = $1
      AND b.status <> 'Cancelled'
      AND b.check_in_date < $3
      AND b.check_out_date > $2";

const CATEGORY_PRICES: &str = "
    SELECT base_price::FLOAT8 AS base_price,
           current_price::FLOAT8 AS current_price
    FROM room_types WHERE id = $1";

const AVAILABLE_UNITS: &str = "
    SELECT COUNT(*) AS units FROM rooms r
    WHERE r.status = 'Available'
      AND ($1::BIGINT IS NULL OR r.room_type_id = $1)
      AND NOT EXISTS (
          SELECT 1 FROM room_maintenance m
          WHERE m.room_id = r.id
            AND m.start_date <= $2
            AND m.end_date >= $2
      )";

const APPLY_CURRENT_PRICE: &str = "
    UPDATE room_types
    SET current_price = ROUND(base_price * $2::FLOAT8::NUMERIC, 2)
    WHERE id = $1";

const RESET_CURRENT_PRICE: &str =
    "UPDATE room_types SET current_price = base_price WHERE id = $1";

/// Postgres-backed [`PricingStore`].
#[derive(Clone)]
pub struct PricingDao {
    db: SqlConnect,
}

impl PricingDao {
    pub fn new(db: SqlConnect) -> Self { Self { db } }

    pub fn db(&self) -> &SqlConnect { &self.db }
}

#[async_trait]
impl PricingStore for PricingDao {
    #[instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<CategoryId>, StorageError> {
        let client = self.db.get_client().await?;
        let stmt = client.prepare_cached(LIST_CATEGORIES).await?;
        let rows = client.query(&stmt, &[]).await?;

        Ok(rows.iter().map(|row| row.get("id")).collect())
    }

    #[instrument(skip(self))]
    async fn unit_count(
        &self, category_id: CategoryId,
    ) -> Result<i64, StorageError> {
        let client = self.db.get_client().await?;
        let stmt = client.prepare_cached(UNIT_COUNT).await?;
        let row = client.query_one(&stmt, &[&category_id]).await?;

        Ok(row.get("units"))
    }

    #[instrument(skip(self))]
    async fn booked_unit_nights(
        &self, category_id: CategoryId, from: NaiveDate, to: NaiveDate,
    ) -> Result<i64, StorageError> {
        let client = self.db.get_client().await?;
        let stmt = client.prepare_cached(BOOKED_UNIT_NIGHTS).await?;
        let row = client.query_one(&stmt, &[&category_id, &from, &to]).await?;

        Ok(row.get("nights"))
    }

    #[instrument(skip(self))]
    async fn category_prices(
        &self, category_id: CategoryId,
    ) -> Result<Option<CategoryPrices>, StorageError> {
        let client = self.db.get_client().await?;
        let stmt = client.prepare_cached(CATEGORY_PRICES).await?;
        let row = client.query_opt(&stmt, &[&category_id]).await?;

        Ok(row.map(|row| CategoryPrices {
            base_price: row.get("base_price"),
            current_price: row.get("current_price"),
        }))
    }

    #[instrument(skip(self))]
    async fn available_units(
        &self, category_id: Option<CategoryId>, today: NaiveDate,
    ) -> Result<i64, StorageError> {
        let client = self.db.get_client().await?;
        let stmt = client.prepare_cached(AVAILABLE_UNITS).await?;
        let row = client.query_one(&stmt, &[&category_id, &today]).await?;

        Ok(row.get("units"))
    }

    #[instrument(skip(self))]
    async fn apply_current_price(
        &self, category_id: CategoryId, multiplier: f64,
    ) -> Result<bool, StorageError> {
        let client = self.db.get_client().await?;
        let stmt = client.prepare_cached(APPLY_CURRENT_PRICE).await?;
        let updated = client.execute(&stmt, &[&category_id, &multiplier]).await?;
        debug!(updated, "applied current price");

        Ok(updated > 0)
    }

    #[instrument(skip(self))]
    async fn reset_current_price(
        &self, category_id: CategoryId,
    ) -> Result<bool, StorageError> {
        let client = self.db.get_client().await?;
        let stmt = client.prepare_cached(RESET_CURRENT_PRICE).await?;
        let updated = client.execute(&stmt, &[&category_id]).await?;

        Ok(updated > 0)
    }
}
