//! Minimum-interval gate for answer actions.
//!
//! Independent of the detection debounce: the debounce collapses notification
//! storms, this gate stops two legitimate answer actions landing too close
//! together.

use std::time::Duration;
use tokio::time::Instant;

/// Enforces a minimum elapsed time between two consumed actions.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_interval: Duration,
    last_answer_at: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_answer_at: None,
        }
    }

    /// Record an action at `now` if the interval has elapsed.
    ///
    /// Returns `false` without recording anything when the previous action was
    /// less than `min_interval` ago. The first call always succeeds.
    pub fn try_consume(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_answer_at {
            if now.saturating_duration_since(last) < self.min_interval {
                return false;
            }
        }
        self.last_answer_at = Some(now);
        true
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn last_answer_at(&self) -> Option<Instant> {
        self.last_answer_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_call_inside_interval_is_rejected() {
        let mut limiter = RateLimiter::new(Duration::from_millis(800));
        let t0 = Instant::now();

        assert!(limiter.try_consume(t0));
        assert!(!limiter.try_consume(t0 + Duration::from_millis(100)));
        assert!(limiter.try_consume(t0 + Duration::from_millis(900)));
    }

    #[test]
    fn test_rejection_does_not_move_the_window() {
        let mut limiter = RateLimiter::new(Duration::from_millis(800));
        let t0 = Instant::now();

        assert!(limiter.try_consume(t0));
        assert!(!limiter.try_consume(t0 + Duration::from_millis(700)));
        // Measured from t0, not from the rejected attempt
        assert!(limiter.try_consume(t0 + Duration::from_millis(800)));
        assert_eq!(
            limiter.last_answer_at(),
            Some(t0 + Duration::from_millis(800))
        );
    }

    #[test]
    fn test_clock_going_backwards_is_rejected() {
        let mut limiter = RateLimiter::new(Duration::from_millis(800));
        let t0 = Instant::now() + Duration::from_secs(5);

        assert!(limiter.try_consume(t0));
        assert!(!limiter.try_consume(t0 - Duration::from_secs(1)));
    }
}
