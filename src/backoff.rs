//! Reconnect delay policy.
//!
//! The supervisor waits one policy-supplied delay between a session
//! ending and the next connection attempt. Two strategies exist:
//!
//! - `constant`: always the configured base delay, to the
//!   millisecond. This is the default, with a 1 s base out of the
//!   box.
//! - `exponential`: doubles per consecutive failed session up to a
//!   cap, with ±10% jitter so a fleet of collectors does not
//!   reconnect in lockstep. Reset after any session that reached the
//!   open state.
//!
//! Tests inject `constant(Duration::ZERO)` to reconnect immediately.

use std::time::Duration;

use rand::Rng;

/// Jitter applied in exponential mode, as a fraction of the delay.
const JITTER_FACTOR: f64 = 0.1;

#[derive(Debug, Clone)]
pub enum BackoffPolicy {
    /// Fixed delay, no jitter.
    Constant { delay: Duration },

    /// Doubling delay, capped, jittered.
    Exponential {
        initial: Duration,
        max: Duration,
        current: Duration,
    },
}

impl BackoffPolicy {
    pub fn constant(delay: Duration) -> Self {
        Self::Constant { delay }
    }

    /// Starts at `initial`; `next_delay` never returns more than `max`.
    pub fn exponential(initial: Duration, max: Duration) -> Self {
        Self::Exponential {
            initial,
            max,
            current: initial,
        }
    }

    /// Returns the delay to wait before the next connection attempt
    /// and advances the policy state.
    pub fn next_delay(&mut self) -> Duration {
        match self {
            Self::Constant { delay } => *delay,

            Self::Exponential { max, current, .. } => {
                let delay = apply_jitter(*current).min(*max);
                *current = current.saturating_mul(2).min(*max);
                delay
            }
        }
    }

    /// Forgets accumulated growth after a healthy session.
    pub fn reset(&mut self) {
        if let Self::Exponential { initial, current, .. } = self {
            *current = *initial;
        }
    }
}

/// Randomizes a delay by ±`JITTER_FACTOR`, keeping at least 1 ms.
///
/// A zero base stays zero so that zero-delay test policies are exact.
fn apply_jitter(delay: Duration) -> Duration {
    let base_millis = delay.as_millis() as f64;
    if base_millis <= 0.0 {
        return delay;
    }

    let jitter_range = base_millis * JITTER_FACTOR;
    let jitter: f64 = rand::rng().random_range(-jitter_range..=jitter_range);
    Duration::from_millis((base_millis + jitter).max(1.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_delay_is_exact_and_unbounded() {
        let mut policy = BackoffPolicy::constant(Duration::from_millis(1_000));

        for _ in 0..1_000 {
            assert_eq!(policy.next_delay(), Duration::from_millis(1_000));
        }
    }

    #[test]
    fn zero_delay_policy_is_exact() {
        let mut policy = BackoffPolicy::constant(Duration::ZERO);

        for _ in 0..100 {
            assert_eq!(policy.next_delay(), Duration::ZERO);
        }
    }

    #[test]
    fn exponential_doubles_within_jitter_window() {
        let mut policy = BackoffPolicy::exponential(
            Duration::from_millis(100),
            Duration::from_secs(10),
        );

        for expected in [100u64, 200, 400, 800] {
            let millis = policy.next_delay().as_millis() as u64;
            let low = expected * 9 / 10;
            let high = expected * 11 / 10;
            assert!(
                (low..=high).contains(&millis),
                "delay {millis}ms outside [{low}, {high}]"
            );
        }
    }

    #[test]
    fn exponential_never_exceeds_cap() {
        let mut policy = BackoffPolicy::exponential(
            Duration::from_millis(1_000),
            Duration::from_millis(2_000),
        );

        for _ in 0..20 {
            assert!(policy.next_delay() <= Duration::from_millis(2_000));
        }
    }

    #[test]
    fn reset_returns_to_initial_delay() {
        let mut policy = BackoffPolicy::exponential(
            Duration::from_millis(100),
            Duration::from_secs(10),
        );

        let _ = policy.next_delay();
        let _ = policy.next_delay();
        policy.reset();

        let millis = policy.next_delay().as_millis() as u64;
        assert!(
            (90..=110).contains(&millis),
            "delay {millis}ms did not reset to the initial window"
        );
    }

    #[test]
    fn reset_on_constant_is_a_no_op() {
        let mut policy = BackoffPolicy::constant(Duration::from_millis(500));
        policy.reset();
        assert_eq!(policy.next_delay(), Duration::from_millis(500));
    }
}
