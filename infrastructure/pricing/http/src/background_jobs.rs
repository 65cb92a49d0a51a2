use std::sync::Arc;

use pricing_demand::Clock;
use pricing_engine::{PrecomputeJob, PricingEngine, delay_until_hour};
use pricing_errors::StorageError;
use pricing_models::{CycleReport, PrecomputeReport};
use tokio::time::{MissedTickBehavior, interval, sleep};
use tracing::{error, info};

#[derive(Clone)]
pub struct BackgroundJobScheduler {
    engine: Arc<PricingEngine>,
    precompute: PrecomputeJob,
    clock: Arc<dyn Clock>,
}

impl BackgroundJobScheduler {
    pub fn new(
        engine: Arc<PricingEngine>, precompute: PrecomputeJob,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            engine,
            precompute,
            clock,
        }
    }

    /// Reprice every category on a fixed interval. A slow cycle delays the
    /// next tick instead of stacking runs.
    pub fn start_repricing_job(self) {
        tokio::spawn(async move {
            let period = self.engine.config().interval();
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await; // Skip first immediate tick

            info!(?period, "Starting dynamic pricing job");

            loop {
                ticker.tick().await;

                if let Err(e) = self.engine.run_cycle().await {
                    error!("Dynamic pricing cycle failed: {}", e);
                }
            }
        });
    }

    /// Warm the forecast cache once at start-up, then daily at the
    /// configured local hour.
    pub fn start_precompute_job(self) {
        tokio::spawn(async move {
            let config = self.engine.config().clone();

            self.run_precompute(config.precompute_initial_days).await;

            loop {
                let delay =
                    delay_until_hour(self.clock.now(), config.precompute_hour);
                info!(?delay, "Next forecast precompute scheduled");
                sleep(delay).await;

                self.run_precompute(config.precompute_days).await;
            }
        });
    }

    async fn run_precompute(&self, days: u32) {
        match self.precompute.precompute_next_days(days).await {
            Ok(report) => {
                info!(
                    days,
                    cached = report.cached,
                    failed = report.failed,
                    "Forecast precompute finished"
                );
            }
            Err(e) => {
                error!("Forecast precompute failed: {}", e);
            }
        }
    }

    /// Run a repricing cycle now
    pub async fn trigger_recompute(&self) -> Result<CycleReport, StorageError> {
        self.engine.run_cycle().await
    }

    /// Run a precompute over `days` now
    pub async fn trigger_precompute(
        &self, days: u32,
    ) -> Result<PrecomputeReport, StorageError> {
        self.precompute.precompute_next_days(days).await
    }

    /// Start all background jobs
    pub async fn start(&self) {
        self.clone().start_repricing_job();
        self.clone().start_precompute_job();
    }
}
