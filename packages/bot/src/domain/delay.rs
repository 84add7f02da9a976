//! Randomized duration ranges used for human-like pauses.

use std::{fmt, time::Duration};

use rand::Rng;

/// Inclusive `[min, max]` duration range sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min: Duration,
    max: Duration,
}

impl DelayRange {
    /// Create a range; `min` must not exceed `max`
    pub fn new(min: Duration, max: Duration) -> Result<Self, DelayRangeError> {
        if min > max {
            return Err(DelayRangeError::Inverted { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn from_millis(min_ms: u64, max_ms: u64) -> Result<Self, DelayRangeError> {
        Self::new(Duration::from_millis(min_ms), Duration::from_millis(max_ms))
    }

    pub fn from_secs(min_secs: u64, max_secs: u64) -> Result<Self, DelayRangeError> {
        Self::new(Duration::from_secs(min_secs), Duration::from_secs(max_secs))
    }

    /// A range that always yields the same duration
    pub fn fixed(duration: Duration) -> Self {
        Self {
            min: duration,
            max: duration,
        }
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Draw a duration uniformly (millisecond resolution)
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let min_ms = duration_millis(self.min);
        let max_ms = duration_millis(self.max);
        Duration::from_millis(rng.gen_range(min_ms..=max_ms))
    }

    /// Draw a duration with the thread-local generator
    pub fn sample_now(&self) -> Duration {
        self.sample(&mut rand::thread_rng())
    }
}

impl fmt::Display for DelayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}ms",
            duration_millis(self.min),
            duration_millis(self.max)
        )
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// DelayRange の生成失敗
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DelayRangeError {
    #[error("minimum {min:?} is greater than maximum {max:?}")]
    Inverted { min: Duration, max: Duration },
}
