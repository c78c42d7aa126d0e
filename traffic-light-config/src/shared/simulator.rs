use serde::{Deserialize, Serialize};

use crate::Config;

/// Configuration of the traffic light simulator binary.
///
/// Phase durations are not part of the configuration, the light always draws them from its
/// built-in bounds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Threads waiting for the light to turn green.
    pub waiters: WaitersConfig,
}

impl Config for SimulatorConfig {
    const LIST_PARSE_KEYS: &'static [&'static str] = &[];
}

/// Configuration of the threads waiting on the light.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WaitersConfig {
    /// Number of waiter threads started next to the light.
    pub count: u16,
    /// How many times each waiter waits for green before finishing.
    ///
    /// When absent, waiters keep waiting until the simulator is stopped.
    #[serde(default)]
    pub crossings: Option<u32>,
    /// Longest time, in milliseconds, a waiter blocks before checking for shutdown.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl WaitersConfig {
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;
}

fn default_poll_interval_ms() -> u64 {
    WaitersConfig::DEFAULT_POLL_INTERVAL_MS
}

impl Default for WaitersConfig {
    fn default() -> Self {
        Self {
            count: 2,
            crossings: None,
            poll_interval_ms: WaitersConfig::DEFAULT_POLL_INTERVAL_MS,
        }
    }
}
