//! A monotonic UUID version 7 generator
//!
//! ```rust
//! use mono7::MonotonicClockSequence;
//!
//! let g = MonotonicClockSequence::with_rand08(rand::thread_rng());
//! let a = g.next(0x0192_2bcc_4d2a);
//! let b = g.next(0x0192_2bcc_4d2a); // same millisecond
//! let c = g.next(0x0192_2bcc_4d00); // clock went backwards
//! assert!(a < b && b < c);
//! println!("{}", c); // e.g. "01922bcc-4d2a-7c05-9219-566f82fff674"
//! ```
//!
//! See [RFC 9562](https://www.rfc-editor.org/rfc/rfc9562.html#section-5.7).
//!
//! # Field and bit layout
//!
//! This implementation produces identifiers with the following bit layout:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                          unix_ts_ms                           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |          unix_ts_ms           |  ver  |     counter_high      |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |var|                      counter_low                          |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                          counter_low                          |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Where:
//!
//! - The 48-bit `unix_ts_ms` field is dedicated to the Unix timestamp in
//!   milliseconds.
//! - The 4-bit `ver` field is set at `0111`.
//! - The 12-bit `counter_high` (`rand_a`) and 62-bit `counter_low` (`rand_b`)
//!   fields together form a 74-bit counter that is filled with random bits
//!   whenever `unix_ts_ms` moves forward and is incremented by one for each new
//!   ID generated within the same timestamp.
//! - The 2-bit `var` field is set at `10`.
//!
//! When the caller passes a timestamp that is not greater than the previous
//! one, the generator keeps the previous `unix_ts_ms` and increments the
//! counter. In the very rare case that the 74-bit counter wraps around, the
//! generator increments `unix_ts_ms` by one and restarts the counter from zero;
//! therefore, `unix_ts_ms` may run ahead of the real-time clock. Generated IDs
//! never go backwards within a generator instance.
//!
//! # Crate features
//!
//! - `global_gen` (default): the process-wide [`uuid7()`] function.
//! - `serde`: `Serialize` and `Deserialize` for [`Uuid`].
//! - `uuid`: conversions from and to [`uuid::Uuid`](https://docs.rs/uuid).
//! - `test-util`: state injection hooks on [`MonotonicClockSequence`].

#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
pub use error::GenerateError;

mod id;
pub use id::{ParseError, Uuid, Variant};

pub mod generator;
pub use generator::{
    GeneratorState, MonotonicClockSequence, RandSource, StdSystemTime, TimeSource,
};

mod global_gen;
#[cfg(feature = "global_gen")]
pub use global_gen::uuid7;
