//! Waiting strategies for the simulated enhancement step.

use std::time::Duration;

use async_trait::async_trait;
use pixelift_core::enhancement::EnhancementType;
use rand::Rng;

/// Default lower bound of the simulated processing time.
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_secs(2);

/// Default upper bound of the simulated processing time.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);

/// The pause that stands in for model inference.
///
/// Production uses [`RandomDelay`]; tests inject [`FixedDelay`] so jobs
/// finish quickly and predictably.
#[async_trait]
pub trait ProcessingDelay: Send + Sync {
    async fn wait(&self, enhancement_type: EnhancementType);
}

/// Uniformly random delay in `[min, max]`, millisecond resolution.
#[derive(Debug, Clone)]
pub struct RandomDelay {
    min: Duration,
    max: Duration,
}

impl RandomDelay {
    /// Bounds are swapped if given in the wrong order.
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Draw one duration from the configured range.
    pub fn sample(&self) -> Duration {
        let min_ms = self.min.as_millis() as u64;
        let max_ms = self.max.as_millis() as u64;
        Duration::from_millis(rand::rng().random_range(min_ms..=max_ms))
    }
}

impl Default for RandomDelay {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DELAY, DEFAULT_MAX_DELAY)
    }
}

#[async_trait]
impl ProcessingDelay for RandomDelay {
    async fn wait(&self, enhancement_type: EnhancementType) {
        let delay = self.sample();
        tracing::debug!(
            %enhancement_type,
            delay_ms = delay.as_millis() as u64,
            "Simulating enhancement",
        );
        tokio::time::sleep(delay).await;
    }
}

/// Constant delay, mainly for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

#[async_trait]
impl ProcessingDelay for FixedDelay {
    async fn wait(&self, _enhancement_type: EnhancementType) {
        tokio::time::sleep(self.0).await;
    }
}
