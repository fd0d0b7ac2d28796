use crate::error::AcquireError;
use crate::types::Uint;

/// Tick-driven token bucket state machine.
///
/// The bucket is periodically refilled with a fixed number of tokens. Each
/// admission consumes tokens from the bucket, and if insufficient tokens are
/// available the attempt is rejected. This allows bursts up to the bucket
/// capacity while holding the average rate to the refill rate.
///
/// `TokenBucket` performs no locking and never blocks: all methods take
/// `&mut self` and are pure arithmetic over the supplied tick. The
/// [`TokenBucketGate`](crate::gate::TokenBucketGate) owns one behind its mutex.
///
/// # Algorithm Behavior
///
/// - The bucket starts full with `capacity` tokens
/// - `refill_amount` tokens are added every `refill_interval` ticks, up to `capacity`
/// - Attempts consume tokens from the available pool
/// - If insufficient tokens are available, the attempt is rejected
/// - A tick older than the last refill is clamped: no refill, no error
///
/// # Example
///
/// ```rust
/// use rate_gate::bucket::TokenBucket;
///
/// // Create a bucket with capacity 100, refilling 5 tokens every 10 ticks
/// let mut bucket = TokenBucket::new(100, 10, 5);
///
/// // Use all initial tokens
/// assert_eq!(bucket.try_acquire_at(0, 100), Ok(()));
///
/// // Should fail - no tokens left
/// assert!(bucket.try_acquire_at(0, 1).is_err());
///
/// // After refill interval, 5 tokens are added
/// assert_eq!(bucket.try_acquire_at(10, 5), Ok(()));
/// ```
#[derive(Debug, Clone)]
pub struct TokenBucket {
    /// Maximum number of tokens the bucket can hold
    capacity: Uint,
    /// Number of ticks between each refill event
    refill_interval: Uint,
    /// Number of tokens added in each refill event
    refill_amount: Uint,
    /// Current number of tokens available in the bucket
    available: Uint,
    /// Tick of the last refill event, always a whole number of intervals from 0
    last_refill_tick: Uint,
}

impl TokenBucket {
    /// Creates a new, full token bucket.
    ///
    /// # Parameters
    ///
    /// * `capacity` - Maximum number of tokens the bucket can hold
    /// * `refill_interval` - Number of ticks between refill events
    /// * `refill_amount` - Number of tokens added per refill interval
    ///
    /// # Panics
    ///
    /// Panics if any parameter is zero. Use a validated
    /// [`Bandwidth`](crate::Bandwidth) to build buckets from user input.
    pub fn new(capacity: Uint, refill_interval: Uint, refill_amount: Uint) -> Self {
        assert!(capacity > 0, "capacity must be greater than 0");
        assert!(refill_interval > 0, "refill_interval must be greater than 0");
        assert!(refill_amount > 0, "refill_amount must be greater than 0");

        TokenBucket {
            capacity,
            refill_interval,
            refill_amount,
            available: capacity,
            last_refill_tick: 0,
        }
    }

    /// Adds the tokens earned by whole intervals elapsed up to `tick`.
    ///
    /// `last_refill_tick` only advances by whole intervals so partial progress
    /// towards the next refill is never lost.
    #[inline]
    fn refill(&mut self, tick: Uint) {
        let elapsed_ticks = tick.saturating_sub(self.last_refill_tick);
        let refill_times = elapsed_ticks / self.refill_interval;
        if refill_times == 0 {
            return;
        }

        let total_refilled = refill_times.saturating_mul(self.refill_amount);
        self.available = self.available.saturating_add(total_refilled).min(self.capacity);
        self.last_refill_tick = self
            .last_refill_tick
            .saturating_add(refill_times.saturating_mul(self.refill_interval));
    }

    /// Attempts to acquire `tokens` at the given tick.
    ///
    /// # Returns
    /// * `Ok(())` - the tokens were taken from the bucket
    /// * `Err(AcquireError::BeyondCapacity)` - the request can never succeed
    /// * `Err(AcquireError::InsufficientTokens)` - not enough tokens yet; carries
    ///   the number of ticks after which a retry can succeed
    pub fn try_acquire_at(&mut self, tick: Uint, tokens: Uint) -> Result<(), AcquireError> {
        if tokens == 0 {
            return Ok(());
        }

        if tokens > self.capacity {
            return Err(AcquireError::BeyondCapacity {
                acquiring: tokens,
                capacity: self.capacity,
            });
        }

        self.refill(tick);

        if tokens <= self.available {
            self.available -= tokens;
            return Ok(());
        }

        let needed_tokens = tokens - self.available;
        let refills_needed = (needed_tokens - 1) / self.refill_amount + 1;
        let next_refill_in = self.next_refill_tick().saturating_sub(tick.max(self.last_refill_tick));
        let retry_after_ticks = next_refill_in
            .saturating_add(self.refill_interval.saturating_mul(refills_needed - 1));

        Err(AcquireError::InsufficientTokens {
            acquiring: tokens,
            available: self.available,
            retry_after_ticks,
        })
    }

    /// Refills up to `tick` and returns the number of tokens available.
    pub fn available_at(&mut self, tick: Uint) -> Uint {
        self.refill(tick);
        self.available
    }

    /// Tick at which the next refill event happens.
    #[inline]
    pub fn next_refill_tick(&self) -> Uint {
        self.last_refill_tick.saturating_add(self.refill_interval)
    }

    pub fn capacity(&self) -> Uint {
        self.capacity
    }
}
