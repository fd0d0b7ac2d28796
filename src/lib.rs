//! A blocking token-bucket gate for throttling calls to a downstream service.
//!
//! The gate smooths bursts into a steady flow: every call takes one token
//! from a bucket that refills at a fixed rate, and callers that find the
//! bucket empty block until a refill or until their wait budget runs out.
//! The gate is thread-safe and agnostic to the work it admits.
//!
//! # Quick Start
//!
//! ```rust
//! use rate_gate::{Bandwidth, TokenBucketGate};
//!
//! // 10 tokens of capacity, 10 more every second
//! let gate = TokenBucketGate::with_bandwidth(Bandwidth::per_second(10).unwrap());
//!
//! match gate.execute(|| "downstream response") {
//!     Ok(body) => println!("admitted: {}", body),
//!     Err(e) => println!("not admitted: {}", e),
//! }
//! ```
//!
//! # Core Concepts
//!
//! ## Bandwidth
//! A [`Bandwidth`] is the `(capacity, refill_tokens, refill_period)` rule of
//! the bucket. The default is 5 tokens, refilled with 5 tokens every second.
//! Tokens are added in whole batches when each period ends.
//!
//! ## Wait budget and timeout policy
//! Each call waits at most [`DEFAULT_WAIT_BUDGET`] (59.5 s) by default. When
//! the budget runs out, [`TimeoutPolicy::Fail`] (the default) returns
//! [`GateError::Timeout`] without running the work, while
//! [`TimeoutPolicy::Proceed`] runs it anyway.
//!
//! ## Cancellation
//! [`TokenBucketGate::execute_cancellable`] takes a [`CancelToken`]; a
//! cancelled waiter returns [`GateError::WaitInterrupted`] without consuming
//! a token or running the work.
//!
//! ## Thread Safety
//! Admission is serialized through one mutex and waiters park on a condition
//! variable until the next refill instant. The work runs after the lock is
//! released, so admitted calls execute in parallel.
//!
//! ## Configuration
//! [`GateSettings`] loads a [`GateConfig`] from a file and `RATE_GATE_*`
//! environment variables.

pub mod bandwidth;
pub mod bucket;
pub mod cancel;
pub mod error;
pub mod gate;
pub mod session;
pub mod settings;
pub mod types;

pub use bandwidth::{Bandwidth, BandwidthConfig};
pub use cancel::CancelToken;
pub use error::{AcquireError, ConfigError, GateError, GateResult, SessionError};
pub use gate::{GateConfig, TimeoutPolicy, TokenBucketGate, DEFAULT_WAIT_BUDGET};
pub use settings::GateSettings;
pub use types::Uint;
