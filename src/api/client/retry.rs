//! Retry policy for dispatcher calls.

use crate::api::classify::FailureKind;
use rand::Rng;
use std::time::Duration;

/// Bounded exponential-backoff policy with proportional jitter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    /// Unit multiplied by `2^n` for retry number `n`.
    pub base_delay: Duration,
    /// Upper bound of the random addition, as a fraction of the base delay.
    pub jitter_ratio: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            jitter_ratio: 0.2,
        }
    }
}

impl RetryPolicy {
    /// Decide whether retry number `retry` (1-based) may be issued.
    pub fn should_retry(&self, kind: FailureKind, retry: u32) -> bool {
        retry >= 1 && retry <= self.max_retries && kind.is_retryable()
    }

    /// Deterministic part of the delay before retry `retry`.
    pub fn base_delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.base_delay.saturating_mul(factor)
    }

    /// Largest delay the policy can produce for retry `retry`.
    pub fn max_delay_for(&self, retry: u32) -> Duration {
        let base = self.base_delay_for(retry);
        base.saturating_add(scale_saturating(base, self.jitter_ratio.max(0.0)))
    }

    /// Delay before retry `retry`, including random jitter.
    pub fn retry_delay_for(&self, retry: u32) -> Duration {
        let base = self.base_delay_for(retry);
        let ratio = self.jitter_ratio.max(0.0);
        if ratio == 0.0 {
            return base;
        }
        let jitter = rand::thread_rng().gen_range(0.0..ratio);
        base.saturating_add(scale_saturating(base, jitter))
    }
}

/// `duration * factor`, clamped to `Duration::MAX` instead of panicking.
fn scale_saturating(duration: Duration, factor: f64) -> Duration {
    Duration::try_from_secs_f64(duration.as_secs_f64() * factor).unwrap_or(Duration::MAX)
}
