//! Unsigned integer type alias for bucket capacities and ticks.
//!
//! The gate measures time in nanosecond ticks since its construction and
//! counts tokens with the same type. The actual width is chosen at compile
//! time via feature flags.
//!
//! # Features
//! - `tick-u64` (default): uses [`u64`] as `Uint`, roughly 584 years of
//!   nanosecond ticks
//! - `tick-u128`: uses [`u128`] as `Uint`
//!   (Both features cannot be enabled at the same time.)
//! - If neither feature is enabled, `u64` is used as the default type.

use std::time::Duration;

#[cfg(all(feature = "tick-u64", feature = "tick-u128"))]
compile_error!("You cannot enable both `tick-u64` and `tick-u128` features at the same time");

/// Alias for the unsigned integer type used for token counts and ticks.
#[cfg(all(feature = "tick-u64", not(feature = "tick-u128")))]
pub type Uint = u64;

/// Alias for the unsigned integer type used for token counts and ticks.
#[cfg(all(feature = "tick-u128", not(feature = "tick-u64")))]
pub type Uint = u128;

/// Alias for the unsigned integer type used for token counts and ticks.
#[cfg(not(any(feature = "tick-u64", feature = "tick-u128")))]
pub type Uint = u64;

/// Converts a duration to nanosecond ticks, saturating at `Uint::MAX`.
#[inline]
pub(crate) fn duration_to_ticks(duration: Duration) -> Uint {
    Uint::try_from(duration.as_nanos()).unwrap_or(Uint::MAX)
}

/// Converts nanosecond ticks back to a duration, saturating at `u64::MAX` nanoseconds.
#[inline]
pub(crate) fn ticks_to_duration(ticks: Uint) -> Duration {
    Duration::from_nanos(u64::try_from(ticks).unwrap_or(u64::MAX))
}
