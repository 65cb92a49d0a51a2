use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use pricing_errors::StorageError;
use pricing_models::{CategoryId, CategoryPrices};

/// Inventory and price storage as seen by the pricing service.
///
/// Night counts use half-open `[from, to)` ranges. Cancelled bookings never
/// count.
#[async_trait]
pub trait PricingStore: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<CategoryId>, StorageError>;

    /// Physical units of a category, regardless of status.
    async fn unit_count(
        &self, category_id: CategoryId,
    ) -> Result<i64, StorageError>;

    /// Booked unit-nights overlapping `[from, to)`.
    async fn booked_unit_nights(
        &self, category_id: CategoryId, from: NaiveDate, to: NaiveDate,
    ) -> Result<i64, StorageError>;

    /// `None` when the category does not exist.
    async fn category_prices(
        &self, category_id: CategoryId,
    ) -> Result<Option<CategoryPrices>, StorageError>;

    /// Units marked available and not under maintenance on `today`,
    /// optionally limited to one category.
    async fn available_units(
        &self, category_id: Option<CategoryId>, today: NaiveDate,
    ) -> Result<i64, StorageError>;

    /// Sets the current price to `round2(base × multiplier)`. Returns
    /// whether the category exists.
    async fn apply_current_price(
        &self, category_id: CategoryId, multiplier: f64,
    ) -> Result<bool, StorageError>;

    /// Sets the current price back to the base price.
    async fn reset_current_price(
        &self, category_id: CategoryId,
    ) -> Result<bool, StorageError>;
}

#[async_trait]
impl<S: PricingStore + ?Sized> PricingStore for Arc<S> {
    async fn list_categories(&self) -> Result<Vec<CategoryId>, StorageError> {
        (**self).list_categories().await
    }

    async fn unit_count(
        &self, category_id: CategoryId,
    ) -> Result<i64, StorageError> {
        (**self).unit_count(category_id).await
    }

    async fn booked_unit_nights(
        &self, category_id: CategoryId, from: NaiveDate, to: NaiveDate,
    ) -> Result<i64, StorageError> {
        (**self).booked_unit_nights(category_id, from, to).await
    }

    async fn category_prices(
        &self, category_id: CategoryId,
    ) -> Result<Option<CategoryPrices>, StorageError> {
        (**self).category_prices(category_id).await
    }

    async fn available_units(
        &self, category_id: Option<CategoryId>, today: NaiveDate,
    ) -> Result<i64, StorageError> {
        (**self).available_units(category_id, today).await
    }

    async fn apply_current_price(
        &self, category_id: CategoryId, multiplier: f64,
    ) -> Result<bool, StorageError> {
        (**self).apply_current_price(category_id, multiplier).await
    }

    async fn reset_current_price(
        &self, category_id: CategoryId,
    ) -> Result<bool, StorageError> {
        (**self).reset_current_price(category_id).await
    }
}
