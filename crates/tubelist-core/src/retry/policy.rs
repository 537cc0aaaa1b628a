use std::time::Duration;

use crate::config::RetryConfig;

/// Why a watch-page GET failed, as far as retrying is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    /// 429 or 503: the host wants fewer requests.
    Throttled,
    /// Reset, refused, DNS or an empty reply.
    Connection,
    ServerError(u16),
    /// Not found, forbidden, bad request, empty body. Asking again won't help.
    Permanent,
}

impl ErrorKind {
    pub fn is_transient(self) -> bool {
        !matches!(self, ErrorKind::Permanent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    NoRetry,
    RetryAfter(Duration),
}

/// Attempts and backoff for one page, from `[fetch.retry]`.
///
/// The wait before attempt `n + 1` is `base_delay * 2^(n-1)`, never more than
/// `max_delay`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts per page, counting the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(cfg: &RetryConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(cfg.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(cfg.max_delay_secs),
        }
    }

    /// Wait after failed attempt `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(1).min(8);
        self.base_delay
            .saturating_mul(1 << doublings)
            .min(self.max_delay)
    }

    /// What to do after attempt `attempt` (1-based) failed with `kind`.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts || !kind.is_transient() {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.backoff(attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(3),
        }
    }

    #[test]
    fn defaults_try_each_page_twice() {
        let p = RetryPolicy::default();
        assert_eq!(p.max_attempts, 2);
        assert_eq!(p.decide(1, ErrorKind::Throttled), RetryDecision::RetryAfter(Duration::from_secs(1)));
        assert_eq!(p.decide(2, ErrorKind::Throttled), RetryDecision::NoRetry);
    }

    #[test]
    fn zero_attempts_in_config_still_fetches_once() {
        let cfg = RetryConfig {
            max_attempts: 0,
            ..RetryConfig::default()
        };
        let p = RetryPolicy::from_config(&cfg);
        assert_eq!(p.max_attempts, 1);
        assert_eq!(p.decide(1, ErrorKind::Timeout), RetryDecision::NoRetry);
    }

    #[test]
    fn missing_page_is_not_retried() {
        assert_eq!(policy(5).decide(1, ErrorKind::Permanent), RetryDecision::NoRetry);
    }

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        let p = policy(10);
        let waits: Vec<_> = (1..=5).map(|n| p.backoff(n)).collect();
        assert_eq!(
            waits,
            [
                Duration::from_millis(500),
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(3),
                Duration::from_secs(3),
            ]
        );
    }

    #[test]
    fn transient_failures_retry_until_attempts_run_out() {
        let p = policy(3);
        for kind in [
            ErrorKind::Timeout,
            ErrorKind::Connection,
            ErrorKind::Throttled,
            ErrorKind::ServerError(502),
        ] {
            assert!(matches!(p.decide(1, kind), RetryDecision::RetryAfter(_)));
            assert!(matches!(p.decide(2, kind), RetryDecision::RetryAfter(_)));
            assert_eq!(p.decide(3, kind), RetryDecision::NoRetry);
        }
    }
}
