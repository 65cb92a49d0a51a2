use std::{str::FromStr, time::Duration};

use pricing_forecast::SuggestionTtls;
use pricing_rules::StaticHolidays;
use serde::Deserialize;
use tracing::warn;

/// Pricing tunables, read from the environment at start-up.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PricingConfig {
    /// Sliding window for demand signals
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
    /// Recent searches needed before a surge is applied
    #[serde(default = "default_trigger_threshold")]
    pub trigger_threshold: usize,
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    #[serde(default = "default_suggestion_ttl_seconds")]
    pub suggestion_ttl_seconds: u64,
    #[serde(default = "default_range_ttl_seconds")]
    pub range_ttl_seconds: u64,
    /// Comma separated `YYYY-MM-DD` dates
    #[serde(default = "default_holidays")]
    pub holidays: String,
    #[serde(default = "default_precompute_initial_days")]
    pub precompute_initial_days: u32,
    #[serde(default = "default_precompute_days")]
    pub precompute_days: u32,
    /// Local hour of the daily precompute run
    #[serde(default = "default_precompute_hour")]
    pub precompute_hour: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            window_seconds: default_window_seconds(),
            trigger_threshold: default_trigger_threshold(),
            interval_seconds: default_interval_seconds(),
            suggestion_ttl_seconds: default_suggestion_ttl_seconds(),
            range_ttl_seconds: default_range_ttl_seconds(),
            holidays: default_holidays(),
            precompute_initial_days: default_precompute_initial_days(),
            precompute_days: default_precompute_days(),
            precompute_hour: default_precompute_hour(),
        }
    }
}

impl PricingConfig {
    /// Reads the `PRICING_*`, `PRICE_*_TTL_SECONDS` and `PRECOMPUTE_*`
    /// variables. Unset or unparsable values keep their default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            window_seconds: env_or("PRICING_WINDOW_SECONDS", defaults.window_seconds),
            trigger_threshold: env_or(
                "PRICING_TRIGGER_THRESHOLD",
                defaults.trigger_threshold,
            ),
            interval_seconds: env_or(
                "PRICING_INTERVAL_SECONDS",
                defaults.interval_seconds,
            ),
            suggestion_ttl_seconds: env_or(
                "PRICE_SUGGESTION_TTL_SECONDS",
                defaults.suggestion_ttl_seconds,
            ),
            range_ttl_seconds: env_or(
                "PRICE_RANGE_TTL_SECONDS",
                defaults.range_ttl_seconds,
            ),
            holidays: std::env::var("PRICING_HOLIDAYS")
                .unwrap_or(defaults.holidays),
            precompute_initial_days: env_or(
                "PRECOMPUTE_INITIAL_DAYS",
                defaults.precompute_initial_days,
            ),
            precompute_days: env_or("PRECOMPUTE_DAYS", defaults.precompute_days),
            precompute_hour: env_or("PRECOMPUTE_HOUR", defaults.precompute_hour)
                .min(23),
        }
    }

    pub fn window(&self) -> Duration { Duration::from_secs(self.window_seconds) }

    /// Never zero, a zero period would spin the scheduler.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds.max(1))
    }

    pub fn ttls(&self) -> SuggestionTtls {
        SuggestionTtls {
            daily: Duration::from_secs(self.suggestion_ttl_seconds),
            range: Duration::from_secs(self.range_ttl_seconds),
        }
    }

    pub fn holiday_calendar(&self) -> Result<StaticHolidays, chrono::ParseError> {
        StaticHolidays::parse(&self.holidays)
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(variable = name, value = %raw, "ignoring unparsable setting");
            default
        }),
        Err(_) => default,
    }
}

fn default_window_seconds() -> u64 { 60 }
fn default_trigger_threshold() -> usize { 2 }
fn default_interval_seconds() -> u64 { 10 }
fn default_suggestion_ttl_seconds() -> u64 { 24 * 60 * 60 }
fn default_range_ttl_seconds() -> u64 { 5 * 60 }
fn default_holidays() -> String { "2024-12-25,2024-12-31".to_string() }
fn default_precompute_initial_days() -> u32 { 14 }
fn default_precompute_days() -> u32 { 30 }
fn default_precompute_hour() -> u32 { 2 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config: PricingConfig = serde_json::from_str("{}").unwrap();

        assert_eq!(config, PricingConfig::default());
        assert_eq!(config.window(), Duration::from_secs(60));
        assert_eq!(config.trigger_threshold, 2);
        assert_eq!(config.ttls(), SuggestionTtls::default());
        assert_eq!(config.holiday_calendar().unwrap().len(), 2);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = PricingConfig {
            interval_seconds: 0,
            ..Default::default()
        };

        assert_eq!(config.interval(), Duration::from_secs(1));
    }
}
