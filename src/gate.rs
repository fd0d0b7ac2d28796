//! Blocking admission gate built on a single token bucket.
//!
//! Every call to [`TokenBucketGate::execute`] takes one token before running
//! its unit of work. Callers that find the bucket empty park on a condition
//! variable until the next refill instant, for at most the configured wait
//! budget. Admission is serialized through one mutex; the work itself runs
//! after the lock is released, so admitted calls proceed in parallel.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::bandwidth::Bandwidth;
use crate::bucket::TokenBucket;
use crate::cancel::CancelToken;
use crate::error::{AcquireError, GateError, GateResult};
use crate::types::{duration_to_ticks, ticks_to_duration, Uint};

/// Default wait budget: one minute minus half a second of headroom.
pub const DEFAULT_WAIT_BUDGET: Duration = Duration::from_millis(60_000 - 500);

/// Default upper bound on a single park while a cancellable call waits.
pub const DEFAULT_CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// What happens when a caller's wait budget runs out without a token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutPolicy {
    /// Return [`GateError::Timeout`] and never invoke the unit of work.
    #[default]
    Fail,
    /// Invoke the unit of work anyway. No token is consumed for it.
    Proceed,
}

/// Construction-time settings of a [`TokenBucketGate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Capacity and refill rule of the gate's bucket.
    pub bandwidth: Bandwidth,
    /// Longest time a single call may block waiting for a token.
    pub wait_budget: Duration,
    /// Behavior once `wait_budget` is exhausted.
    pub timeout_policy: TimeoutPolicy,
    /// Longest single park of a cancellable waiter before it re-checks its token.
    pub cancel_poll_interval: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            bandwidth: Bandwidth::default(),
            wait_budget: DEFAULT_WAIT_BUDGET,
            timeout_policy: TimeoutPolicy::default(),
            cancel_poll_interval: DEFAULT_CANCEL_POLL_INTERVAL,
        }
    }
}

impl From<Bandwidth> for GateConfig {
    fn from(bandwidth: Bandwidth) -> Self {
        Self {
            bandwidth,
            ..Self::default()
        }
    }
}

/// Outcome of the waiting phase of one call.
enum Admission {
    Acquired,
    TimedOut(Duration),
}

/// Thread-safe rate limiter that admits one unit of work per token.
///
/// The bucket starts full, so a first burst of up to `capacity` calls is
/// admitted without waiting. Later callers wait for refills. No fairness is
/// promised among waiters: whichever waiter re-checks first after a refill
/// takes the token.
///
/// # Example
///
/// ```rust
/// use rate_gate::{GateError, TokenBucketGate};
///
/// // 5 calls per second, waiting up to 59.5 s for a token
/// let gate = TokenBucketGate::new();
///
/// let answer = gate.execute(|| 6 * 7);
/// assert_eq!(answer, Ok(42));
///
/// // Errors raised by the work come back untouched inside `Ok`
/// let parsed: Result<Result<u8, _>, GateError> = gate.execute(|| "x".parse::<u8>());
/// assert!(parsed.unwrap().is_err());
/// ```
#[derive(Debug)]
pub struct TokenBucketGate {
    wait_budget: Duration,
    timeout_policy: TimeoutPolicy,
    cancel_poll_interval: Duration,
    /// Tick zero of the bucket.
    origin: Instant,
    bucket: Mutex<TokenBucket>,
    /// Signalled when an admission leaves tokens behind for other waiters.
    token_available: Condvar,
}

impl Default for TokenBucketGate {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenBucketGate {
    /// Creates a gate admitting 5 calls per second with the default wait budget.
    pub fn new() -> Self {
        Self::with_config(GateConfig::default())
    }

    /// Creates a gate with a custom bandwidth rule and default settings otherwise.
    pub fn with_bandwidth(bandwidth: Bandwidth) -> Self {
        Self::with_config(GateConfig::from(bandwidth))
    }

    /// Creates a gate from a full configuration. The bucket starts full.
    pub fn with_config(config: GateConfig) -> Self {
        let bandwidth = config.bandwidth;
        let refill_interval = duration_to_ticks(bandwidth.refill_period()).max(1);

        Self {
            wait_budget: config.wait_budget,
            timeout_policy: config.timeout_policy,
            cancel_poll_interval: config.cancel_poll_interval.max(Duration::from_millis(1)),
            origin: Instant::now(),
            bucket: Mutex::new(TokenBucket::new(
                bandwidth.capacity(),
                refill_interval,
                bandwidth.refill_tokens(),
            )),
            token_available: Condvar::new(),
        }
    }

    /// Waits for a token, then runs `work` and returns its result.
    ///
    /// `work` runs at most once and only after admission (or after the wait
    /// budget elapsed under [`TimeoutPolicy::Proceed`]). Its return value is
    /// passed through unchanged.
    ///
    /// # Errors
    /// [`GateError::Timeout`] under [`TimeoutPolicy::Fail`] if no token became
    /// available within the wait budget.
    pub fn execute<R, F>(&self, work: F) -> GateResult<R>
    where
        F: FnOnce() -> R,
    {
        self.run(None, work)
    }

    /// Like [`execute`](Self::execute), but gives up as soon as `cancel` is
    /// cancelled.
    ///
    /// # Errors
    /// [`GateError::WaitInterrupted`] if the token was cancelled before a
    /// token was acquired, in which case `work` is not invoked and the bucket
    /// is left untouched. [`GateError::Timeout`] as for `execute`.
    pub fn execute_cancellable<R, F>(&self, cancel: &CancelToken, work: F) -> GateResult<R>
    where
        F: FnOnce() -> R,
    {
        self.run(Some(cancel), work)
    }

    fn run<R, F>(&self, cancel: Option<&CancelToken>, work: F) -> GateResult<R>
    where
        F: FnOnce() -> R,
    {
        if let Admission::TimedOut(waited) = self.acquire(cancel)? {
            match self.timeout_policy {
                TimeoutPolicy::Fail => {
                    warn!(?waited, "rate limit wait budget exhausted, rejecting call");
                    return Err(GateError::Timeout { waited });
                }
                TimeoutPolicy::Proceed => {
                    warn!(?waited, "rate limit wait budget exhausted, proceeding without a token");
                }
            }
        }

        Ok(work())
    }

    #[inline]
    fn tick_at(&self, now: Instant) -> Uint {
        duration_to_ticks(now.saturating_duration_since(self.origin))
    }

    /// Takes one token, parking until the next refill while the bucket is empty.
    fn acquire(&self, cancel: Option<&CancelToken>) -> Result<Admission, GateError> {
        let started = Instant::now();
        let deadline = started.checked_add(self.wait_budget);
        let mut waited = false;

        let mut bucket = self.bucket.lock();
        loop {
            if cancel.map_or(false, CancelToken::is_cancelled) {
                warn!(waited = ?started.elapsed(), "wait for rate limit token interrupted");
                return Err(GateError::WaitInterrupted);
            }

            let now = Instant::now();
            let tick = self.tick_at(now);
            let retry_after_ticks = match bucket.try_acquire_at(tick, 1) {
                Ok(()) => {
                    if bucket.available_at(tick) > 0 {
                        self.token_available.notify_one();
                    }
                    if waited {
                        debug!(waited = ?now.saturating_duration_since(started), "rate limit token acquired");
                    } else {
                        trace!("rate limit token acquired without waiting");
                    }
                    return Ok(Admission::Acquired);
                }
                Err(AcquireError::InsufficientTokens { retry_after_ticks, .. }) => retry_after_ticks,
                // Only possible with a zero capacity, which `Bandwidth` rejects.
                Err(AcquireError::BeyondCapacity { capacity, .. }) => {
                    warn!(capacity, "bucket cannot hold a single token");
                    return Ok(Admission::TimedOut(now.saturating_duration_since(started)));
                }
            };

            let mut timeout = ticks_to_duration(retry_after_ticks);
            if let Some(deadline) = deadline {
                if now >= deadline {
                    return Ok(Admission::TimedOut(now.saturating_duration_since(started)));
                }
                timeout = timeout.min(deadline - now);
            }
            if cancel.is_some() {
                timeout = timeout.min(self.cancel_poll_interval);
            }

            if !waited {
                debug!(retry_after = ?ticks_to_duration(retry_after_ticks), "no rate limit token available, waiting");
                waited = true;
            }
            self.token_available.wait_for(&mut bucket, timeout);
        }
    }
}
