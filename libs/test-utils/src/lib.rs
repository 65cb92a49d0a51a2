//! Shared test scaffolding: throwaway Postgres and Redis containers, schema
//! migrations, inventory fixtures, sample seed data and an in-memory
//! pricing store.

pub mod fixtures;
pub mod migrator;
pub mod postgres;
pub mod redis;
pub mod seed;
pub mod store;

pub use migrator::SqlMigrator;
pub use postgres::TestPostgresContainer;
pub use redis::TestRedisContainer;
pub use seed::seed_inventory;
pub use store::InMemoryPricingStore;

/// `YYYY-MM-DD` to a date, for terse test fixtures.
///
/// # Panics
/// On a malformed date.
pub fn day(value: &str) -> chrono::NaiveDate {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .unwrap_or_else(|e| panic!("bad fixture date {value}: {e}"))
}
