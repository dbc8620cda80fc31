use std::time::Duration;

use crate::ConfigError;

/// Poller cadence and hard ceiling for one invocation.
///
/// `interval * max_ticks` is the longest the caller will wait for a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    interval: Duration,
    max_ticks: u32,
}

impl PollConfig {
    pub fn new(interval_millis: u64, max_ticks: u32) -> Result<Self, ConfigError> {
        if interval_millis == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if max_ticks == 0 {
            return Err(ConfigError::ZeroTicks);
        }
        Ok(Self {
            interval: Duration::from_millis(interval_millis),
            max_ticks,
        })
    }

    /// Derives the tick budget from a total estimate and a tick delay.
    /// Always allows at least one tick.
    pub fn from_estimate(max_estimation_millis: u64, delay_millis: u64) -> Result<Self, ConfigError> {
        if delay_millis == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        let ticks = (max_estimation_millis / delay_millis).clamp(1, u64::from(u32::MAX));
        Self::new(delay_millis, ticks as u32)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_ticks(&self) -> u32 {
        self.max_ticks
    }

    pub fn ceiling(&self) -> Duration {
        self.interval * self.max_ticks
    }
}

/// Schedule for the worker's heuristic progress counter.
///
/// The worker advances one step every `total / steps` regardless of whether the
/// remote call has returned. The resulting counter is an approximation for
/// display only; it is not a measured completion fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEstimate {
    total: Duration,
    steps: u32,
}

impl ProgressEstimate {
    pub fn new(total: Duration, steps: u32) -> Result<Self, ConfigError> {
        if total.is_zero() || steps == 0 {
            return Err(ConfigError::EmptyEstimate);
        }
        Ok(Self { total, steps })
    }

    /// An estimate that expects the call to take the whole poll ceiling.
    pub fn matching(config: &PollConfig) -> Self {
        Self {
            total: config.ceiling(),
            steps: config.max_ticks(),
        }
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn step_interval(&self) -> Duration {
        (self.total / self.steps).max(Duration::from_millis(1))
    }
}
