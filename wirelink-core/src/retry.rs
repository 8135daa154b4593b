// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Reconnect Backoff
//!
//! Stateful delay generators consulted by the connection between attempts.
//! A strategy never fails; [`RetryStrategy::should_abort`] is the only signal
//! to stop retrying.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Retry configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetryError {
    #[error("Fixed retry sequence must contain at least one delay")]
    EmptySequence,
}

/// A backoff sequence.
pub trait RetryStrategy: Send {
    /// Returns the delay before the next attempt and advances the sequence.
    fn next(&mut self) -> Duration;

    /// Restarts the sequence from the beginning.
    fn reset(&mut self);

    /// True once the sequence is exhausted.
    fn should_abort(&self) -> bool;
}

/// Doubles the delay on each attempt, aborting after `maximum_step` attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExponentialRetryStrategy {
    initial: Duration,
    maximum_step: u32,
    current: Duration,
    step: u32,
}

impl ExponentialRetryStrategy {
    pub fn new(initial: Duration, maximum_step: u32) -> Self {
        ExponentialRetryStrategy {
            initial,
            maximum_step,
            current: initial,
            step: 1,
        }
    }
}

impl RetryStrategy for ExponentialRetryStrategy {
    fn next(&mut self) -> Duration {
        let delay = self.current;
        self.step = self.step.saturating_add(1);
        if self.maximum_step >= self.step {
            self.current = self.current.saturating_mul(2);
        }
        delay
    }

    fn reset(&mut self) {
        self.current = self.initial;
        self.step = 1;
    }

    fn should_abort(&self) -> bool {
        self.step > self.maximum_step
    }
}

/// Same delay forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantRetryStrategy {
    duration: Duration,
}

impl ConstantRetryStrategy {
    pub fn new(duration: Duration) -> Self {
        ConstantRetryStrategy { duration }
    }
}

impl RetryStrategy for ConstantRetryStrategy {
    fn next(&mut self) -> Duration {
        self.duration
    }

    fn reset(&mut self) {}

    fn should_abort(&self) -> bool {
        false
    }
}

/// Hands out each configured delay once, in order.
///
/// After the last delay has been returned `should_abort` is true; further
/// calls to `next` keep returning the last delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedRetryStrategy {
    delays: Vec<Duration>,
    index: usize,
}

impl FixedRetryStrategy {
    pub fn new(delays: Vec<Duration>) -> Result<Self, RetryError> {
        if delays.is_empty() {
            return Err(RetryError::EmptySequence);
        }
        Ok(FixedRetryStrategy { delays, index: 0 })
    }
}

impl RetryStrategy for FixedRetryStrategy {
    fn next(&mut self) -> Duration {
        let last = self.delays.len() - 1;
        let delay = self.delays[self.index.min(last)];
        if self.index < self.delays.len() {
            self.index += 1;
        }
        delay
    }

    fn reset(&mut self) {
        self.index = 0;
    }

    fn should_abort(&self) -> bool {
        self.index >= self.delays.len()
    }
}

/// Serializable retry configuration.
///
/// ```json
/// {"kind": "exponential", "initial_ms": 100, "maximum_step": 5}
/// {"kind": "constant", "duration_ms": 1000}
/// {"kind": "fixed", "delays_ms": [100, 500, 2000]}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RetryPolicy {
    Exponential { initial_ms: u64, maximum_step: u32 },
    Constant { duration_ms: u64 },
    Fixed { delays_ms: Vec<u64> },
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::Exponential {
            initial_ms: 500,
            maximum_step: 6,
        }
    }
}

impl RetryPolicy {
    /// Builds a fresh strategy in its initial state.
    pub fn build(&self) -> Result<Box<dyn RetryStrategy>, RetryError> {
        Ok(match self {
            RetryPolicy::Exponential {
                initial_ms,
                maximum_step,
            } => Box::new(ExponentialRetryStrategy::new(
                Duration::from_millis(*initial_ms),
                *maximum_step,
            )),
            RetryPolicy::Constant { duration_ms } => {
                Box::new(ConstantRetryStrategy::new(Duration::from_millis(*duration_ms)))
            }
            RetryPolicy::Fixed { delays_ms } => Box::new(FixedRetryStrategy::new(
                delays_ms.iter().copied().map(Duration::from_millis).collect(),
            )?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_saturates() {
        let mut strategy = ExponentialRetryStrategy::new(Duration::MAX, u32::MAX);
        assert_eq!(strategy.next(), Duration::MAX);
        assert_eq!(strategy.next(), Duration::MAX);
    }

    #[test]
    fn test_zero_maximum_step_aborts_immediately() {
        let strategy = ExponentialRetryStrategy::new(Duration::from_millis(10), 0);
        assert!(strategy.should_abort());
    }

    #[test]
    fn test_policy_json_shape() {
        let policy: RetryPolicy =
            serde_json::from_str(r#"{"kind":"fixed","delays_ms":[1,2]}"#).unwrap();
        assert_eq!(policy, RetryPolicy::Fixed { delays_ms: vec![1, 2] });
    }

    #[test]
    fn test_policy_rejects_empty_fixed() {
        let policy = RetryPolicy::Fixed { delays_ms: vec![] };
        assert!(matches!(policy.build(), Err(RetryError::EmptySequence)));
    }
}
