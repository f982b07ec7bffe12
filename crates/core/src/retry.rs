//! Retry policy for background jobs.

use std::time::Duration;

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try again after the delay.
    RetryAfter(Duration),
    /// Attempts exhausted; mark the job failed.
    GiveUp,
}

/// Bounded retries with a per-attempt backoff schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum attempts, including the first.
    pub max_attempts: u32,
    /// Delay before retry `n` (0-based); the last entry repeats.
    pub backoff: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_secs(3, &[5, 10, 30])
    }
}

impl RetryPolicy {
    /// Builds a policy from a backoff schedule in seconds.
    #[must_use]
    pub fn from_secs(max_attempts: u32, backoff_secs: &[u64]) -> Self {
        Self {
            max_attempts,
            backoff: backoff_secs.iter().copied().map(Duration::from_secs).collect(),
        }
    }

    /// Decides the next step after `attempts` attempts have failed.
    #[must_use]
    pub fn after_failure(&self, attempts: u32) -> RetryDecision {
        if attempts >= self.max_attempts {
            return RetryDecision::GiveUp;
        }
        let index = usize::try_from(attempts.saturating_sub(1)).unwrap_or(usize::MAX);
        let delay = self
            .backoff
            .get(index)
            .or_else(|| self.backoff.last())
            .copied()
            .unwrap_or(Duration::ZERO);
        RetryDecision::RetryAfter(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, RetryDecision::RetryAfter(Duration::from_secs(5)))]
    #[case(2, RetryDecision::RetryAfter(Duration::from_secs(10)))]
    #[case(3, RetryDecision::GiveUp)]
    #[case(7, RetryDecision::GiveUp)]
    fn test_default_schedule(#[case] attempts: u32, #[case] expected: RetryDecision) {
        assert_eq!(RetryPolicy::default().after_failure(attempts), expected);
    }

    #[test]
    fn test_last_backoff_repeats() {
        let policy = RetryPolicy::from_secs(6, &[1, 2]);
        assert_eq!(policy.after_failure(4), RetryDecision::RetryAfter(Duration::from_secs(2)));
    }

    #[test]
    fn test_empty_schedule_retries_immediately() {
        let policy = RetryPolicy::from_secs(2, &[]);
        assert_eq!(policy.after_failure(1), RetryDecision::RetryAfter(Duration::ZERO));
        assert_eq!(policy.after_failure(2), RetryDecision::GiveUp);
    }
}
