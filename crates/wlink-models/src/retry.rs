//! Shared retry policy for outbound vendor calls.
//!
//! One bounded-exponential-backoff policy with full jitter, applied
//! uniformly by the document-store client and every vendor adapter.
//! Honors Retry-After when the vendor supplies one.

use std::time::Duration;

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts.
    pub max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds).
    pub base_delay_ms: u64,
    /// Maximum delay cap (in milliseconds).
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 5000,
        }
    }
}

impl RetryPolicy {
    /// Read `{PREFIX}_RETRY_MAX`, `{PREFIX}_RETRY_BASE_MS` and
    /// `{PREFIX}_RETRY_MAX_MS` from the environment, falling back to
    /// the defaults.
    pub fn from_env(prefix: &str) -> Self {
        let read = |suffix: &str| -> Option<u64> {
            std::env::var(format!("{}_RETRY_{}", prefix, suffix))
                .ok()
                .and_then(|s| s.parse().ok())
        };

        Self {
            max_retries: read("MAX").map(|v| v as u32).unwrap_or(3),
            base_delay_ms: read("BASE_MS").unwrap_or(100),
            max_delay_ms: read("MAX_MS").unwrap_or(5000),
        }
    }

    /// Delay before the given retry attempt (0-based), with full jitter.
    ///
    /// A vendor-supplied Retry-After wins over the computed backoff.
    pub fn delay_for(&self, attempt: u32, retry_after_ms: Option<u64>) -> Duration {
        if let Some(after) = retry_after_ms {
            return Duration::from_millis(after);
        }

        let exp_delay = self.base_delay_ms.saturating_mul(2u64.pow(attempt.min(31)));
        let capped_delay = exp_delay.min(self.max_delay_ms);

        // Full jitter: random value between 0 and capped_delay. Uses
        // time-based pseudo-randomization to avoid pulling rand into
        // this crate.
        let jittered = if capped_delay > 0 {
            use std::time::SystemTime;
            let nanos = SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.subsec_nanos())
                .unwrap_or(0);
            let random_factor = (nanos % 1000) as f64 / 1000.0;
            ((capped_delay as f64) * random_factor) as u64
        } else {
            0
        };

        Duration::from_millis(jittered.max(self.base_delay_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.base_delay_ms, 100);
        assert_eq!(policy.max_delay_ms, 5000);
    }

    #[test]
    fn test_retry_after_wins() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0, Some(2000)), Duration::from_millis(2000));
    }

    #[test]
    fn test_delay_respects_cap() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 2000,
        };
        let delay = policy.delay_for(10, None);
        assert!(delay.as_millis() <= 2000);
    }

    #[test]
    fn test_delay_has_minimum() {
        let policy = RetryPolicy::default();
        let delay = policy.delay_for(0, None);
        assert!(delay.as_millis() >= policy.base_delay_ms as u128);
    }
}
