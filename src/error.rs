//! error.rs
//! Error types for the bucket, the gate, configuration and the session client.

use std::time::Duration;

use thiserror::Error;

use crate::types::Uint;

/// Why a single non-blocking acquisition attempt on a [`TokenBucket`](crate::bucket::TokenBucket) failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcquireError {
    /// Not enough tokens available right now.
    #[error("insufficient tokens: tried to acquire {acquiring}, available {available}, retry after {retry_after_ticks} tick(s)")]
    InsufficientTokens {
        acquiring: Uint,
        available: Uint,
        retry_after_ticks: Uint,
    },
    /// Request permanently exceeds the configured capacity.
    #[error("request exceeds bucket capacity: tried to acquire {acquiring}, capacity {capacity}; this request cannot succeed")]
    BeyondCapacity { acquiring: Uint, capacity: Uint },
}

/// Failure of [`TokenBucketGate::execute`](crate::gate::TokenBucketGate::execute).
///
/// Errors raised by the unit of work itself never appear here: the gate
/// returns whatever the work produced inside `Ok`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// The wait budget elapsed before a token became available.
    /// The unit of work was not invoked and no token was consumed.
    #[error("no token acquired within the wait budget (waited {waited:?})")]
    Timeout { waited: Duration },

    /// The caller cancelled the wait through its [`CancelToken`](crate::cancel::CancelToken).
    #[error("wait for a token was interrupted")]
    WaitInterrupted,
}

/// Result type for gated executions.
pub type GateResult<R> = Result<R, GateError>;

/// Invalid or unreadable gate configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("capacity must be greater than 0")]
    ZeroCapacity,

    #[error("refill_tokens must be greater than 0")]
    ZeroRefillTokens,

    #[error("refill_period must be at least one nanosecond")]
    ZeroRefillPeriod,

    #[error("cancel_poll_interval must be at least one millisecond")]
    ZeroPollInterval,

    #[error("failed to load gate settings: {0}")]
    Load(#[from] config::ConfigError),
}

/// Failure of a throttled session validation.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("session validation was not admitted: {0}")]
    Gate(#[from] GateError),
}
