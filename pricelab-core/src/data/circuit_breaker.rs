//! Circuit breaker guarding a remote price provider.
//!
//! Closed: requests flow and consecutive failures are counted. Reaching the
//! threshold (or an explicit ban) opens the breaker for a cooldown. After the
//! cooldown a single trial request is let through; its outcome either closes
//! the breaker or reopens it for another full cooldown.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed { consecutive_failures: u32 },
    Open { since: Instant },
    /// Cooldown elapsed; one trial request is in flight.
    HalfOpen,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    cooldown: Duration,
    failure_threshold: u32,
}

impl CircuitBreaker {
    /// A breaker that opens after `failure_threshold` consecutive failures
    /// (at least 1) and stays open for `cooldown`.
    pub fn new(cooldown: Duration, failure_threshold: u32) -> Self {
        Self {
            state: Mutex::new(BreakerState::Closed {
                consecutive_failures: 0,
            }),
            cooldown,
            failure_threshold: failure_threshold.max(1),
        }
    }

    /// Three strikes, thirty minutes out.
    pub fn default_provider() -> Self {
        Self::new(Duration::from_secs(30 * 60), 3)
    }

    // Plain data behind the lock; a panic elsewhere cannot leave it half-written.
    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> BreakerState {
        *self.lock()
    }

    /// Whether a request may go out now. Moves an expired `Open` breaker to
    /// `HalfOpen` and admits that one caller; further callers are refused
    /// until the trial reports back.
    pub fn is_allowed(&self) -> bool {
        let mut state = self.lock();
        match *state {
            BreakerState::Closed { .. } => true,
            BreakerState::Open { since } if since.elapsed() >= self.cooldown => {
                tracing::info!("circuit breaker half-open, allowing a trial request");
                *state = BreakerState::HalfOpen;
                true
            }
            BreakerState::Open { .. } | BreakerState::HalfOpen => false,
        }
    }

    pub fn record_success(&self) {
        let mut state = self.lock();
        if *state == BreakerState::HalfOpen {
            tracing::info!("circuit breaker closed after successful trial");
        }
        *state = BreakerState::Closed {
            consecutive_failures: 0,
        };
    }

    pub fn record_failure(&self) {
        let mut state = self.lock();
        let failures = match *state {
            BreakerState::Closed {
                consecutive_failures,
            } => consecutive_failures + 1,
            // a failed trial reopens immediately
            BreakerState::HalfOpen => self.failure_threshold,
            BreakerState::Open { .. } => return,
        };

        *state = if failures >= self.failure_threshold {
            tracing::warn!(failures, cooldown = ?self.cooldown, "circuit breaker opened");
            BreakerState::Open {
                since: Instant::now(),
            }
        } else {
            BreakerState::Closed {
                consecutive_failures: failures,
            }
        };
    }

    /// Open regardless of the failure count (provider ban).
    pub fn trip(&self) {
        tracing::warn!(cooldown = ?self.cooldown, "circuit breaker tripped by provider ban");
        *self.lock() = BreakerState::Open {
            since: Instant::now(),
        };
    }

    /// Time left before a trial request is allowed.
    pub fn remaining_cooldown(&self) -> Duration {
        match *self.lock() {
            BreakerState::Open { since } => self.cooldown.saturating_sub(since.elapsed()),
            BreakerState::Closed { .. } | BreakerState::HalfOpen => Duration::ZERO,
        }
    }
}
