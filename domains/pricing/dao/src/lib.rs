mod pricing;
mod store;

pub use pricing::PricingDao;
pub use store::PricingStore;
