use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Recognized configuration for a `WindowActorHandle`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowActorConfig {
    /// Delay before the first tick. Default 30s.
    pub initial_processing_delay: Duration,
    /// Delay scheduled after `Flush` before auto-resume.
    pub resume_processing_delay: Duration,
    /// Window width.
    pub frequency: Duration,
    /// Tick cadence. Default 1s.
    pub tick_interval: Duration,
    /// Restart backoff policy for the supervisor.
    pub backoff: BackoffConfig,
    /// Bound for `snapshot()` queries.
    pub ask_timeout: Duration,
    /// Data-count threshold the default `TumblingAdvancer` rolls on, in
    /// addition to wall-clock expiry. `0` disables the count-based roll.
    pub max_signals_per_window: usize,
}

impl Default for WindowActorConfig {
    fn default() -> Self {
        Self {
            initial_processing_delay: Duration::from_secs(30),
            resume_processing_delay: Duration::from_secs(0),
            frequency: Duration::from_secs(60),
            tick_interval: Duration::from_secs(1),
            backoff: BackoffConfig::default(),
            ask_timeout: Duration::from_secs(3),
            max_signals_per_window: 0,
        }
    }
}

/// Exponential backoff policy for the restart supervisor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    pub min_backoff: Duration,
    pub max_backoff: Duration,
    /// Jitter fraction applied to each computed delay, in `[0, 1)`.
    pub random_factor: f64,
    pub max_retries: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            min_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(30),
            random_factor: 0.2,
            max_retries: 10,
        }
    }
}

impl BackoffConfig {
    /// `min(max_backoff, min_backoff * 2^attempt * (1 + jitter))` where
    /// `jitter` is drawn from `[-random_factor, random_factor]` by the
    /// caller-supplied `jitter` value (kept pure here for testability).
    pub fn delay_for(&self, attempt: u32, jitter: f64) -> Duration {
        let exp = self.min_backoff.as_secs_f64() * 2f64.powi(attempt as i32);
        let jittered = exp * (1.0 + jitter.clamp(-self.random_factor, self.random_factor));
        let jittered = jittered.max(0.0);
        Duration::from_secs_f64(jittered).min(self.max_backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_for_grows_exponentially_and_caps_at_max() {
        let backoff = BackoffConfig {
            min_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
            random_factor: 0.0,
            max_retries: 10,
        };

        assert_eq!(backoff.delay_for(0, 0.0), Duration::from_millis(100));
        assert_eq!(backoff.delay_for(1, 0.0), Duration::from_millis(200));
        assert_eq!(backoff.delay_for(2, 0.0), Duration::from_millis(400));
        assert_eq!(backoff.delay_for(10, 0.0), Duration::from_secs(5));
    }

    #[test]
    fn delay_for_applies_jitter_within_bounds() {
        let backoff = BackoffConfig {
            min_backoff: Duration::from_millis(1000),
            max_backoff: Duration::from_secs(30),
            random_factor: 0.5,
            max_retries: 10,
        };

        let low = backoff.delay_for(0, -0.5);
        let high = backoff.delay_for(0, 0.5);

        assert_eq!(low, Duration::from_millis(500));
        assert_eq!(high, Duration::from_millis(1500));
    }
}
