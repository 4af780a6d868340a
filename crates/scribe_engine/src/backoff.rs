use std::time::Duration;

/// Delay before the live channel tries to connect again.
///
/// Reconnection never gives up; the policy only decides how long to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectPolicy {
    Fixed(Duration),
    /// Doubles from `initial` on every consecutive failure, capped at `max`.
    Exponential { initial: Duration, max: Duration },
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy::Exponential {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(30),
        }
    }
}

impl ReconnectPolicy {
    /// Delay after the `retry_count`-th consecutive failure (1-based).
    pub fn delay(&self, retry_count: u32) -> Duration {
        match *self {
            ReconnectPolicy::Fixed(delay) => delay,
            ReconnectPolicy::Exponential { initial, max } => {
                let doublings = retry_count.saturating_sub(1).min(31);
                initial
                    .checked_mul(1u32 << doublings)
                    .map_or(max, |delay| delay.min(max))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_doubles_and_caps() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay(1), Duration::from_secs(1));
        assert_eq!(policy.delay(2), Duration::from_secs(2));
        assert_eq!(policy.delay(4), Duration::from_secs(8));
        assert_eq!(policy.delay(6), Duration::from_secs(30));
        assert_eq!(policy.delay(u32::MAX), Duration::from_secs(30));
    }

    #[test]
    fn zero_retries_uses_initial_delay() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay(0), Duration::from_secs(1));
    }

    #[test]
    fn fixed_ignores_retry_count() {
        let policy = ReconnectPolicy::Fixed(Duration::from_millis(250));
        assert_eq!(policy.delay(1), Duration::from_millis(250));
        assert_eq!(policy.delay(99), Duration::from_millis(250));
    }
}
