//! Engine configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults, so an embedder can tune windows without recompiling.

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// TTL of a table session lock.
    pub session_lock_ttl: Duration,

    /// Trial subscription window granted at tenant registration, in days.
    pub trial_days: i64,

    /// Subscription window granted on first lazy access, in days.
    pub default_subscription_days: i64,

    /// Interval between renewal sweeps.
    pub renewal_interval: Duration,

    /// A subscription with `0 <= days_left <= lookahead` is eligible for
    /// auto-renewal in a sweep.
    pub renewal_lookahead_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            session_lock_ttl: Duration::from_secs(5 * 60),
            trial_days: 3,
            default_subscription_days: 30,
            renewal_interval: Duration::from_secs(24 * 60 * 60),
            renewal_lookahead_days: 7,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = EngineConfig::default();

        let config = EngineConfig {
            session_lock_ttl: Duration::from_secs(parse_var(
                "SMARTORDER_SESSION_LOCK_TTL_SECS",
                defaults.session_lock_ttl.as_secs(),
            )?),

            trial_days: parse_var("SMARTORDER_TRIAL_DAYS", defaults.trial_days)?,

            default_subscription_days: parse_var(
                "SMARTORDER_SUBSCRIPTION_DAYS",
                defaults.default_subscription_days,
            )?,

            renewal_interval: Duration::from_secs(parse_var(
                "SMARTORDER_RENEWAL_INTERVAL_SECS",
                defaults.renewal_interval.as_secs(),
            )?),

            renewal_lookahead_days: parse_var(
                "SMARTORDER_RENEWAL_LOOKAHEAD_DAYS",
                defaults.renewal_lookahead_days,
            )?,
        };

        if config.trial_days < 1 {
            return Err(ConfigError::InvalidValue("SMARTORDER_TRIAL_DAYS"));
        }
        if config.default_subscription_days < 1 {
            return Err(ConfigError::InvalidValue("SMARTORDER_SUBSCRIPTION_DAYS"));
        }
        if config.renewal_lookahead_days < 0 {
            return Err(ConfigError::InvalidValue(
                "SMARTORDER_RENEWAL_LOOKAHEAD_DAYS",
            ));
        }

        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}")]
    InvalidValue(&'static str),
}
