//! Poll budget configuration.

use std::time::Duration;

/// How long and how often to poll for an analysis result.
///
/// The default is 15 attempts 20 seconds apart, roughly five minutes
/// before giving up. Every field is set through the builder methods,
/// which keep the budget at one attempt or more.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    max_attempts: u32,
    interval: Duration,
    backoff_multiplier: f64,
    max_interval: Duration,
    deadline: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 15,
            interval: Duration::from_secs(20),
            backoff_multiplier: 1.0,
            max_interval: Duration::from_secs(120),
            deadline: None,
        }
    }
}

impl PollPolicy {
    /// Creates a new policy with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// A constant-interval policy.
    pub fn fixed(max_attempts: u32, interval: Duration) -> Self {
        Self::default()
            .with_max_attempts(max_attempts)
            .with_interval(interval)
    }

    /// Sets the maximum number of attempts (at least 1).
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Sets the base interval between attempts.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        if self.max_interval < interval {
            self.max_interval = interval;
        }
        self
    }

    /// Sets the backoff multiplier (at least 1.0).
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = if multiplier.is_finite() {
            multiplier.max(1.0)
        } else {
            1.0
        };
        self
    }

    /// Sets the maximum single wait.
    pub fn with_max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = max_interval;
        self
    }

    /// Bounds total polling time.
    ///
    /// Checked before each sleep against the time already spent plus the
    /// next delay. The duration of the following status request is not
    /// known in advance, so a slow provider can overrun the deadline by
    /// up to one request timeout.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Maximum number of status requests.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait after the first unsuccessful attempt.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Growth factor applied to the wait after each attempt.
    pub fn backoff_multiplier(&self) -> f64 {
        self.backoff_multiplier
    }

    /// Upper bound on a single wait.
    pub fn max_interval(&self) -> Duration {
        self.max_interval
    }

    /// Bound on total time spent polling, if any.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Wait after the given attempt (1-indexed) before the next one.
    ///
    /// Saturates at the cap instead of overflowing, whatever the inputs.
    pub fn delay_after_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 || self.interval.is_zero() {
            return Duration::ZERO;
        }

        let cap = self.max_interval.max(self.interval);
        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let scaled = self.interval.as_secs_f64() * self.backoff_multiplier.powi(exponent);

        Duration::try_from_secs_f64(scaled).map_or(cap, |delay| delay.min(cap))
    }

    /// Returns whether another attempt may be made after `attempts_made`.
    pub fn has_attempts_left(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts
    }

    /// Worst-case time spent sleeping before giving up.
    pub fn worst_case_wait(&self) -> Duration {
        let slept = (1..self.max_attempts)
            .map(|attempt| self.delay_after_attempt(attempt))
            .fold(Duration::ZERO, Duration::saturating_add);
        match self.deadline {
            Some(deadline) => slept.min(deadline),
            None => slept,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = PollPolicy::default();
        assert_eq!(policy.max_attempts(), 15);
        assert_eq!(policy.interval(), Duration::from_secs(20));
        assert_eq!(policy.delay_after_attempt(1), Duration::from_secs(20));
        assert_eq!(policy.delay_after_attempt(14), Duration::from_secs(20));
        assert_eq!(policy.worst_case_wait(), Duration::from_secs(280));
    }

    #[test]
    fn test_attempts_floor() {
        let policy = PollPolicy::new().with_max_attempts(0);
        assert_eq!(policy.max_attempts(), 1);
        assert!(policy.has_attempts_left(0));
        assert!(!policy.has_attempts_left(1));
        assert_eq!(policy.worst_case_wait(), Duration::ZERO);
    }

    #[test]
    fn test_backoff_delays() {
        let policy = PollPolicy::fixed(5, Duration::from_secs(1))
            .with_backoff_multiplier(2.0)
            .with_max_interval(Duration::from_secs(5));

        assert_eq!(policy.delay_after_attempt(0), Duration::ZERO);
        assert_eq!(policy.delay_after_attempt(1), Duration::from_secs(1));
        assert_eq!(policy.delay_after_attempt(2), Duration::from_secs(2));
        assert_eq!(policy.delay_after_attempt(3), Duration::from_secs(4));
        // 8s, capped at 5s
        assert_eq!(policy.delay_after_attempt(4), Duration::from_secs(5));
    }

    #[test]
    fn test_multiplier_floor() {
        let policy = PollPolicy::new().with_backoff_multiplier(0.5);
        assert_eq!(policy.backoff_multiplier(), 1.0);

        let policy = PollPolicy::new().with_backoff_multiplier(f64::NAN);
        assert_eq!(policy.backoff_multiplier(), 1.0);
    }

    #[test]
    fn test_deadline_caps_worst_case() {
        let policy = PollPolicy::default().with_deadline(Duration::from_secs(60));
        assert_eq!(policy.worst_case_wait(), Duration::from_secs(60));
    }

    #[test]
    fn test_huge_intervals_saturate() {
        let policy = PollPolicy::fixed(3, Duration::from_secs(u64::MAX));
        assert_eq!(policy.max_interval(), Duration::from_secs(u64::MAX));
        assert_eq!(policy.delay_after_attempt(1), Duration::from_secs(u64::MAX));
        assert_eq!(policy.delay_after_attempt(2), Duration::from_secs(u64::MAX));
        assert_eq!(policy.worst_case_wait(), Duration::MAX);

        let uncapped = PollPolicy::fixed(200, Duration::from_secs(1))
            .with_backoff_multiplier(2.0)
            .with_max_interval(Duration::MAX);
        assert_eq!(uncapped.delay_after_attempt(3), Duration::from_secs(4));
        assert_eq!(uncapped.delay_after_attempt(100), Duration::MAX);
        assert_eq!(uncapped.delay_after_attempt(u32::MAX), Duration::MAX);
        assert_eq!(uncapped.worst_case_wait(), Duration::MAX);
    }

    #[test]
    fn test_zero_interval() {
        let policy = PollPolicy::fixed(4, Duration::ZERO).with_backoff_multiplier(3.0);
        assert_eq!(policy.delay_after_attempt(3), Duration::ZERO);
        assert_eq!(policy.worst_case_wait(), Duration::ZERO);
    }
}
