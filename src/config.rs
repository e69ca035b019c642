//! Configuration Module
//!
//! Handles loading and managing layer configuration from environment variables.

use std::env;
use std::time::Duration;

/// Data-layer configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Interval in seconds between full invalidation sweeps
    pub sweep_interval: u64,
    /// Page size used when a caller does not supply one
    pub default_page_size: u32,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SWEEP_INTERVAL` - Seconds between cache sweeps (default: 300)
    /// - `DEFAULT_PAGE_SIZE` - Fallback page size (default: 20)
    pub fn from_env() -> Self {
        Self {
            sweep_interval: env::var("SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            default_page_size: env::var("DEFAULT_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
        }
    }

    /// The sweep interval as a [`Duration`], ready to hand to
    /// `spawn_sweep_task`.
    pub fn sweep_period(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sweep_interval: 300,
            default_page_size: 20,
        }
    }
}
