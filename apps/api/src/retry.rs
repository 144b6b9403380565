use std::time::Duration;

/// Exponential backoff schedule shared by the LLM and image-generation loops.
///
/// After failed attempt `n` (0-based) the caller waits `base_delay * 2^n`.
/// No wait follows the final attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay to wait after `attempt` failed, or `None` if it was the last one.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt + 1 >= self.max_attempts {
            return None;
        }
        Some(self.base_delay.saturating_mul(1u32 << attempt.min(16)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delays_double_each_attempt() {
        let policy = RetryPolicy::new(3, Duration::from_secs(2));
        assert_eq!(policy.delay_after(0), Some(Duration::from_secs(2)));
        assert_eq!(policy.delay_after(1), Some(Duration::from_secs(4)));
    }

    #[test]
    fn test_no_delay_after_final_attempt() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1));
        assert_eq!(policy.delay_after(2), None);
    }

    #[test]
    fn test_single_attempt_never_waits() {
        let policy = RetryPolicy::new(1, Duration::from_secs(1));
        assert_eq!(policy.delay_after(0), None);
    }
}
