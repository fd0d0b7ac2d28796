//! Bandwidth rules: how many tokens a bucket holds and how fast it refills.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Uint;

/// Default bucket capacity.
pub const DEFAULT_CAPACITY: Uint = 5;
/// Default number of tokens added per refill period.
pub const DEFAULT_REFILL_TOKENS: Uint = 5;
/// Default refill period.
pub const DEFAULT_REFILL_PERIOD: Duration = Duration::from_secs(1);

/// An immutable `(capacity, refill_tokens, refill_period)` rule.
///
/// `refill_tokens` are added all at once whenever a full `refill_period`
/// has elapsed, never exceeding `capacity`.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use rate_gate::Bandwidth;
///
/// let rule = Bandwidth::new(10, 2, Duration::from_millis(100)).unwrap();
/// assert_eq!(rule.capacity(), 10);
///
/// // 5 operations per second, no extra burst allowance
/// assert_eq!(Bandwidth::default(), Bandwidth::per_second(5).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bandwidth {
    capacity: Uint,
    refill_tokens: Uint,
    refill_period: Duration,
}

impl Bandwidth {
    /// Creates a validated bandwidth rule.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if any of the three values is zero.
    pub fn new(capacity: Uint, refill_tokens: Uint, refill_period: Duration) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if refill_tokens == 0 {
            return Err(ConfigError::ZeroRefillTokens);
        }
        if refill_period.is_zero() {
            return Err(ConfigError::ZeroRefillPeriod);
        }
        Ok(Self {
            capacity,
            refill_tokens,
            refill_period,
        })
    }

    /// `n` tokens of capacity, refilled with `n` tokens every second.
    pub fn per_second(n: Uint) -> Result<Self, ConfigError> {
        Self::new(n, n, Duration::from_secs(1))
    }

    /// Maximum number of tokens the bucket can hold.
    pub fn capacity(&self) -> Uint {
        self.capacity
    }

    /// Tokens added at the end of every refill period.
    pub fn refill_tokens(&self) -> Uint {
        self.refill_tokens
    }

    pub fn refill_period(&self) -> Duration {
        self.refill_period
    }
}

impl Default for Bandwidth {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            refill_tokens: DEFAULT_REFILL_TOKENS,
            refill_period: DEFAULT_REFILL_PERIOD,
        }
    }
}

/// Plain configuration structure for creating a [`Bandwidth`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandwidthConfig {
    /// Maximum number of tokens the bucket can hold.
    pub capacity: Uint,
    /// Number of tokens added per period.
    pub refill_tokens: Uint,
    /// Refill period in milliseconds.
    pub refill_period_ms: u64,
}

impl Default for BandwidthConfig {
    fn default() -> Self {
        Bandwidth::default().into()
    }
}

impl TryFrom<BandwidthConfig> for Bandwidth {
    type Error = ConfigError;

    /// Validates a [`BandwidthConfig`] into a [`Bandwidth`].
    ///
    /// ```
    /// use rate_gate::{Bandwidth, BandwidthConfig};
    ///
    /// let rule = Bandwidth::try_from(BandwidthConfig {
    ///     capacity: 100,
    ///     refill_tokens: 5,
    ///     refill_period_ms: 10,
    /// }).unwrap();
    /// assert_eq!(rule.refill_tokens(), 5);
    /// ```
    fn try_from(config: BandwidthConfig) -> Result<Self, Self::Error> {
        Bandwidth::new(
            config.capacity,
            config.refill_tokens,
            Duration::from_millis(config.refill_period_ms),
        )
    }
}

impl From<Bandwidth> for BandwidthConfig {
    fn from(rule: Bandwidth) -> Self {
        Self {
            capacity: rule.capacity,
            refill_tokens: rule.refill_tokens,
            refill_period_ms: u64::try_from(rule.refill_period.as_millis()).unwrap_or(u64::MAX),
        }
    }
}
