//! Delay between retry attempts.

use rand::Rng;
use std::time::Duration;

use crate::config::{BackoffStrategy, RetryConfig};

/// Backoff function applied after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// `attempt * base`.
    Linear { base: Duration },
    /// `base * 2^(attempt - 1)` capped at `max`, plus up to 10% jitter.
    Exponential { base: Duration, max: Duration },
    /// Retry immediately.
    None,
}

impl Backoff {
    pub fn from_config(config: &RetryConfig) -> Self {
        match config.strategy {
            BackoffStrategy::Linear => Backoff::Linear {
                base: Duration::from_millis(config.base_delay_ms),
            },
            BackoffStrategy::Exponential => Backoff::Exponential {
                base: Duration::from_millis(config.base_delay_ms),
                max: Duration::from_millis(config.max_delay_ms),
            },
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    ///
    /// Attempt `0` never waits.
    pub fn delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        match *self {
            Backoff::Linear { base } => base.saturating_mul(attempt),
            Backoff::Exponential { base, max } => {
                let doublings = (attempt - 1).min(31);
                let ceiling = base.saturating_mul(1 << doublings).min(max);
                ceiling + jitter(ceiling / 10)
            }
            Backoff::None => Duration::ZERO,
        }
    }
}

/// Uniform random extra wait in `[0, spread)`.
fn jitter(spread: Duration) -> Duration {
    let spread_ms = spread.as_millis() as u64;
    if spread_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..spread_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_backoff() {
        let backoff = Backoff::Linear {
            base: Duration::from_millis(1000),
        };
        assert_eq!(backoff.delay(1), Duration::from_millis(1000));
        assert_eq!(backoff.delay(2), Duration::from_millis(2000));
        assert_eq!(backoff.delay(3), Duration::from_millis(3000));
    }

    #[test]
    fn test_exponential_doubles_until_capped() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(100),
            max: Duration::from_millis(1000),
        };
        let first = backoff.delay(1).as_millis();
        assert!((100..110).contains(&first));
        let second = backoff.delay(2).as_millis();
        assert!((200..220).contains(&second));

        let capped = backoff.delay(10).as_millis();
        assert!((1000..1100).contains(&capped));
        let far = backoff.delay(u32::MAX).as_millis();
        assert!((1000..1100).contains(&far));

        assert_eq!(backoff.delay(0), Duration::ZERO);
        assert_eq!(Backoff::None.delay(3), Duration::ZERO);
    }

    #[test]
    fn test_from_config() {
        let mut config = RetryConfig::default();
        assert_eq!(
            Backoff::from_config(&config),
            Backoff::Linear {
                base: Duration::from_millis(1000)
            }
        );

        config.strategy = BackoffStrategy::Exponential;
        assert_eq!(
            Backoff::from_config(&config),
            Backoff::Exponential {
                base: Duration::from_millis(1000),
                max: Duration::from_millis(10_000)
            }
        );
    }
}
