use std::{
    collections::{BTreeMap, HashSet},
    sync::{
        Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::NaiveDate;
use pricing_dao::PricingStore;
use pricing_errors::StorageError;
use pricing_models::{CategoryId, CategoryPrices};
use pricing_rules::round2;

#[derive(Debug, Clone)]
struct Unit {
    available: bool,
    maintenance: Vec<(NaiveDate, NaiveDate)>,
}

#[derive(Debug, Clone)]
struct Booking {
    check_in: NaiveDate,
    check_out: NaiveDate,
    cancelled: bool,
}

#[derive(Debug, Clone)]
struct Category {
    base_price: f64,
    current_price: Option<f64>,
    units: Vec<Unit>,
    bookings: Vec<Booking>,
}

/// [`PricingStore`] kept in memory, with switches to make calls fail.
#[derive(Debug, Default)]
pub struct InMemoryPricingStore {
    categories: Mutex<BTreeMap<CategoryId, Category>>,
    failing: Mutex<HashSet<CategoryId>>,
    offline: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryPricingStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_category(
        self, category_id: CategoryId, base_price: f64, units: usize,
    ) -> Self {
        self.add_category(category_id, base_price, units);
        self
    }

    pub fn add_category(
        &self, category_id: CategoryId, base_price: f64, units: usize,
    ) {
        let unit = Unit {
            available: true,
            maintenance: Vec::new(),
        };
        self.categories().insert(category_id, Category {
            base_price,
            current_price: None,
            units: vec![unit; units],
            bookings: Vec::new(),
        });
    }

    pub fn add_booking(
        &self, category_id: CategoryId, check_in: NaiveDate,
        check_out: NaiveDate,
    ) {
        self.push_booking(category_id, check_in, check_out, false);
    }

    pub fn add_cancelled_booking(
        &self, category_id: CategoryId, check_in: NaiveDate,
        check_out: NaiveDate,
    ) {
        self.push_booking(category_id, check_in, check_out, true);
    }

    fn push_booking(
        &self, category_id: CategoryId, check_in: NaiveDate,
        check_out: NaiveDate, cancelled: bool,
    ) {
        if let Some(category) = self.categories().get_mut(&category_id) {
            category.bookings.push(Booking {
                check_in,
                check_out,
                cancelled,
            });
        }
    }

    /// Marks the first `count` units of a category as not available.
    pub fn set_unavailable(&self, category_id: CategoryId, count: usize) {
        if let Some(category) = self.categories().get_mut(&category_id) {
            for unit in category.units.iter_mut().take(count) {
                unit.available = false;
            }
        }
    }

    pub fn add_maintenance(
        &self, category_id: CategoryId, unit: usize, start: NaiveDate,
        end: NaiveDate,
    ) {
        if let Some(unit) = self
            .categories()
            .get_mut(&category_id)
            .and_then(|category| category.units.get_mut(unit))
        {
            unit.maintenance.push((start, end));
        }
    }

    pub fn set_current_price(&self, category_id: CategoryId, price: Option<f64>) {
        if let Some(category) = self.categories().get_mut(&category_id) {
            category.current_price = price;
        }
    }

    pub fn current_price(&self, category_id: CategoryId) -> Option<f64> {
        self.categories()
            .get(&category_id)
            .and_then(|category| category.current_price)
    }

    /// Every call touching this category fails from now on.
    pub fn fail_category(&self, category_id: CategoryId) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(category_id);
    }

    /// Every call fails while offline.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of successful price writes.
    pub fn writes(&self) -> usize { self.writes.load(Ordering::SeqCst) }

    fn categories(&self) -> MutexGuard<'_, BTreeMap<CategoryId, Category>> {
        self.categories.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self, category_id: Option<CategoryId>) -> Result<(), StorageError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("store offline".into()));
        }
        let failing = self.failing.lock().unwrap_or_else(PoisonError::into_inner);
        match category_id {
            Some(id) if failing.contains(&id) => Err(StorageError::Unavailable(
                format!("category {id} failing"),
            )),
            _ => Ok(()),
        }
    }

    fn write<F>(&self, category_id: CategoryId, update: F) -> Result<bool, StorageError>
    where
        F: FnOnce(&mut Category),
    {
        self.check(Some(category_id))?;
        let mut categories = self.categories();
        let Some(category) = categories.get_mut(&category_id) else {
            return Ok(false);
        };
        update(category);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }
}

#[async_trait]
impl PricingStore for InMemoryPricingStore {
    async fn list_categories(&self) -> Result<Vec<CategoryId>, StorageError> {
        self.check(None)?;
        Ok(self.categories().keys().copied().collect())
    }

    async fn unit_count(
        &self, category_id: CategoryId,
    ) -> Result<i64, StorageError> {
        self.check(Some(category_id))?;
        Ok(self
            .categories()
            .get(&category_id)
            .map_or(0, |category| category.units.len() as i64))
    }

    async fn booked_unit_nights(
        &self, category_id: CategoryId, from: NaiveDate, to: NaiveDate,
    ) -> Result<i64, StorageError> {
        self.check(Some(category_id))?;
        let categories = self.categories();
        let Some(category) = categories.get(&category_id) else {
            return Ok(0);
        };

        Ok(category
            .bookings
            .iter()
            .filter(|b| !b.cancelled && b.check_in < to && b.check_out > from)
            .map(|b| {
                let nights = (b.check_out.min(to) - b.check_in.max(from))
                    .num_days();
                nights.max(0)
            })
            .sum())
    }

    async fn category_prices(
        &self, category_id: CategoryId,
    ) -> Result<Option<CategoryPrices>, StorageError> {
        self.check(Some(category_id))?;
        Ok(self.categories().get(&category_id).map(|category| {
            CategoryPrices {
                base_price: category.base_price,
                current_price: category.current_price,
            }
        }))
    }

    async fn available_units(
        &self, category_id: Option<CategoryId>, today: NaiveDate,
    ) -> Result<i64, StorageError> {
        self.check(category_id)?;
        let categories = self.categories();

        let count = categories
            .iter()
            .filter(|(id, _)| category_id.is_none_or(|wanted| wanted == **id))
            .flat_map(|(_, category)| category.units.iter())
            .filter(|unit| {
                unit.available
                    && !unit
                        .maintenance
                        .iter()
                        .any(|(start, end)| *start <= today && today <= *end)
            })
            .count();

        Ok(count as i64)
    }

    async fn apply_current_price(
        &self, category_id: CategoryId, multiplier: f64,
    ) -> Result<bool, StorageError> {
        self.write(category_id, |category| {
            category.current_price = Some(round2(category.base_price * multiplier));
        })
    }

    async fn reset_current_price(
        &self, category_id: CategoryId,
    ) -> Result<bool, StorageError> {
        self.write(category_id, |category| {
            category.current_price = Some(category.base_price);
        })
    }
}
