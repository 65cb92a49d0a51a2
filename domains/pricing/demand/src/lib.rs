//! In-memory demand signals for dynamic pricing.
//!
//! Searches are recorded as timestamps in a global sliding window and in
//! one window per room category. The state is a soft signal: it is never
//! persisted and is lost on restart.

mod clock;
mod tracker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use tracker::{DemandSnapshot, DemandTracker};
