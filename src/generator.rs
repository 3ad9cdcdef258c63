//! Monotonic UUIDv7 generator and related types.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::{fmt, iter, time};

use crate::{GenerateError, Uuid};

pub mod with_rand08;


const MAX_TIMESTAMP: u64 = (1 << 48) - 1;
const MAX_COUNTER_HIGH: u16 = (1 << 12) - 1;
const MAX_COUNTER_LOW: u64 = (1 << 62) - 1;

/// A trait that defines the minimum random number generator interface for
/// [`MonotonicClockSequence`].
pub trait RandSource {
    /// Returns the next random `u64`.
    fn next_u64(&mut self) -> u64;

    /// Returns an unsigned integer made of `n` fresh random bits, taken from the most significant
    /// end of [`next_u64`](Self::next_u64). `n` is clamped to 64; zero yields zero.
    fn random_bits(&mut self, n: u32) -> u64 {
        self.next_u64()
            .checked_shr(64u32.saturating_sub(n))
            .unwrap_or(0)
    }
}

/// A trait that defines the minimum system clock interface for [`MonotonicClockSequence`].
pub trait TimeSource {
    /// Returns the current Unix timestamp in milliseconds.
    fn unix_ts_ms(&self) -> u64;
}

/// The default [`TimeSource`] that reads [`std::time::SystemTime`].
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Default)]
pub struct StdSystemTime;

impl TimeSource for StdSystemTime {
    fn unix_ts_ms(&self) -> u64 {
        // a clock set before 1970 reads as zero; the generator keeps its stored timestamp then
        millis_since_epoch(
            time::SystemTime::now()
                .duration_since(time::UNIX_EPOCH)
                .unwrap_or_default(),
        )
    }
}

/// Converts an elapsed duration to milliseconds, saturating at `u64::MAX` so that an absurd clock
/// reading is rejected as out of range rather than wrapped.
fn millis_since_epoch(elapsed: time::Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// The timestamp and 74-bit counter of the most recently generated UUID.
///
/// The counter is split into `counter_high` (the 12-bit `rand_a` field) and `counter_low` (the
/// 62-bit `rand_b` field) and is compared lexicographically in that order.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct GeneratorState {
    timestamp: u64,
    counter_high: u16,
    counter_low: u64,
}

impl GeneratorState {
    /// Creates a state from its field values, masking each to its field width (48, 12, and 62
    /// bits respectively).
    pub const fn new(timestamp: u64, counter_high: u16, counter_low: u64) -> Self {
        Self {
            timestamp: timestamp & MAX_TIMESTAMP,
            counter_high: counter_high & MAX_COUNTER_HIGH,
            counter_low: counter_low & MAX_COUNTER_LOW,
        }
    }

    /// Returns the stored `unix_ts_ms`.
    pub const fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Returns the high 12 bits of the counter.
    pub const fn counter_high(&self) -> u16 {
        self.counter_high
    }

    /// Returns the low 62 bits of the counter.
    pub const fn counter_low(&self) -> u64 {
        self.counter_low
    }

    /// Returns the state that follows this one within the same millisecond, or the first state of
    /// the next millisecond if the 74-bit counter wraps around.
    fn successor(self) -> Result<Self, GenerateError> {
        let counter_low = (self.counter_low + 1) & MAX_COUNTER_LOW;
        let counter_high = if counter_low == 0 {
            (self.counter_high + 1) & MAX_COUNTER_HIGH
        } else {
            self.counter_high
        };

        if counter_low != 0 || counter_high != 0 {
            return Ok(Self {
                counter_high,
                counter_low,
                ..self
            });
        }

        if self.timestamp == MAX_TIMESTAMP {
            return Err(GenerateError::ClockExhausted);
        }

        // zero counter sorts above everything issued in the previous millisecond
        tracing::debug!(
            timestamp = self.timestamp,
            "counter overflowed; advancing timestamp by one millisecond"
        );
        Ok(Self::new(self.timestamp + 1, 0, 0))
    }

    const fn to_uuid(self) -> Uuid {
        Uuid::from_fields_v7(self.timestamp, self.counter_high, self.counter_low)
    }
}

/// Represents a UUIDv7 generator that encapsulates a 74-bit counter and guarantees the monotonic
/// order of UUIDs generated by the same instance, even within the same millisecond.
///
/// The generator state sits behind a [`Mutex`], so a single instance can be shared by reference
/// (e.g., through [`std::sync::Arc`]) and every call observes a serialized order of state
/// transitions. Independent instances keep independent state.
///
/// # Algorithm
///
/// For a requested timestamp `ts` and the stored timestamp `last`:
///
/// 1.  If there is no stored state or `ts > last`, the counter is filled with 74 fresh random bits
///     and `ts` is stored.
/// 2.  Otherwise, `ts` is ignored and the counter is incremented by one. If the counter wraps
///     around, the stored timestamp is incremented by one and the counter restarts from zero.
///
/// The returned UUID therefore never goes backwards, whatever the clock does.
///
/// # Examples
///
/// ```rust
/// use mono7::MonotonicClockSequence;
/// use std::{sync::Arc, thread};
///
/// let g = Arc::new(MonotonicClockSequence::with_rand08(rand::rngs::OsRng));
/// thread::scope(|s| {
///     for i in 0..4 {
///         let g = Arc::clone(&g);
///         s.spawn(move || {
///             for _ in 0..8 {
///                 println!("{} by thread {}", g.generate(), i);
///                 thread::yield_now();
///             }
///         });
///     }
/// });
/// ```
pub struct MonotonicClockSequence<R, T = StdSystemTime> {
    inner: Mutex<Inner<R>>,

    /// The clock consulted by [`generate`](Self::generate).
    time: T,
}

struct Inner<R> {
    last: Option<GeneratorState>,
    rng: R,
}

impl<R> MonotonicClockSequence<R> {
    /// Creates a generator instance that reads the system clock.
    pub const fn new(rng: R) -> Self {
        Self::with_time_source(rng, StdSystemTime)
    }

    /// Creates a generator instance that resumes from `state`, as if `state` had been produced by
    /// the previous call.
    #[cfg(any(test, feature = "test-util"))]
    #[cfg_attr(docsrs, doc(cfg(feature = "test-util")))]
    pub const fn with_state(rng: R, state: GeneratorState) -> Self {
        Self {
            inner: Mutex::new(Inner {
                last: Some(state),
                rng,
            }),
            time: StdSystemTime,
        }
    }
}

impl<R, T> MonotonicClockSequence<R, T> {
    /// Creates a generator instance with a custom clock.
    pub const fn with_time_source(rng: R, time: T) -> Self {
        Self {
            inner: Mutex::new(Inner { last: None, rng }),
            time,
        }
    }

    /// Returns a snapshot of the current state, or `None` if no UUID has been generated yet.
    pub fn state(&self) -> Option<GeneratorState> {
        self.lock().last
    }

    /// Overwrites the state with the given field values, masked to their field widths.
    #[cfg(any(test, feature = "test-util"))]
    #[cfg_attr(docsrs, doc(cfg(feature = "test-util")))]
    pub fn force_state(&self, timestamp: u64, counter_high: u16, counter_low: u64) {
        self.lock().last = Some(GeneratorState::new(timestamp, counter_high, counter_low));
    }

    /// Discards the state so that the next call behaves like the first call on a new instance.
    #[cfg(any(test, feature = "test-util"))]
    #[cfg_attr(docsrs, doc(cfg(feature = "test-util")))]
    pub fn reset(&self) {
        self.lock().last = None;
    }

    fn lock(&self) -> MutexGuard<'_, Inner<R>> {
        // state is only ever replaced as a whole, so a poisoned lock still holds a valid one
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R: RandSource, T> MonotonicClockSequence<R, T> {
    /// Generates a new UUIDv7 object from the `unix_ts_ms` passed.
    ///
    /// See the [`MonotonicClockSequence`] type documentation for the description.
    ///
    /// # Panics
    ///
    /// Panics if `unix_ts_ms` is not a 48-bit integer, or if the counter overflows at the maximum
    /// 48-bit timestamp. Use [`try_next`](Self::try_next) to handle these cases as errors.
    pub fn next(&self, unix_ts_ms: u64) -> Uuid {
        match self.try_next(unix_ts_ms) {
            Ok(value) => value,
            Err(err) => panic!("{}", err),
        }
    }

    /// Generates a new UUIDv7 object from the `unix_ts_ms` passed, or returns an error without
    /// touching the state if the result cannot be encoded.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mono7::{GenerateError, MonotonicClockSequence};
    ///
    /// let g = MonotonicClockSequence::with_rand08(rand::thread_rng());
    /// let first = g.try_next(0x0192_2bcc_4d2a)?;
    /// let second = g.try_next(0x0192_2bcc_4d29)?;
    /// assert!(first < second);
    /// assert_eq!(second.unix_ts_ms(), 0x0192_2bcc_4d2a);
    ///
    /// assert!(g.try_next(1 << 48).is_err());
    /// # Ok::<(), GenerateError>(())
    /// ```
    pub fn try_next(&self, unix_ts_ms: u64) -> Result<Uuid, GenerateError> {
        if unix_ts_ms > MAX_TIMESTAMP {
            return Err(GenerateError::TimestampOutOfRange { unix_ts_ms });
        }

        let mut guard = self.lock();
        let Inner { last, rng } = &mut *guard;
        let next = match *last {
            Some(prev) if unix_ts_ms <= prev.timestamp => {
                if unix_ts_ms < prev.timestamp {
                    tracing::trace!(
                        requested = unix_ts_ms,
                        stored = prev.timestamp,
                        "timestamp went backwards; reusing stored timestamp"
                    );
                }
                prev.successor()?
            }
            _ => GeneratorState::new(
                unix_ts_ms,
                rng.random_bits(12) as u16,
                rng.random_bits(62),
            ),
        };

        *last = Some(next);
        Ok(next.to_uuid())
    }
}

impl<R: RandSource, T: TimeSource> MonotonicClockSequence<R, T> {
    /// Generates a new UUIDv7 object from the current timestamp of the clock.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`next`](Self::next).
    pub fn generate(&self) -> Uuid {
        self.next(self.time.unix_ts_ms())
    }

    /// Returns an infinite iterator that produces a new UUIDv7 object from the current timestamp
    /// for each call of `next()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mono7::MonotonicClockSequence;
    ///
    /// MonotonicClockSequence::with_rand08(rand::thread_rng())
    ///     .iter()
    ///     .enumerate()
    ///     .skip(4)
    ///     .take(4)
    ///     .for_each(|(i, e)| println!("[{}] {}", i, e));
    /// ```
    pub fn iter(&self) -> Iter<'_, R, T> {
        Iter { generator: self }
    }
}

impl<R: Default, T: Default> Default for MonotonicClockSequence<R, T> {
    fn default() -> Self {
        Self::with_time_source(R::default(), T::default())
    }
}

impl<R, T: fmt::Debug> fmt::Debug for MonotonicClockSequence<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonotonicClockSequence")
            .field("state", &self.state())
            .field("time", &self.time)
            .finish_non_exhaustive()
    }
}

/// Iterator returned by [`MonotonicClockSequence::iter()`].
#[derive(Debug)]
pub struct Iter<'a, R, T> {
    generator: &'a MonotonicClockSequence<R, T>,
}

impl<R: RandSource, T: TimeSource> Iterator for Iter<'_, R, T> {
    type Item = Uuid;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.generator.generate())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl<R: RandSource, T: TimeSource> iter::FusedIterator for Iter<'_, R, T> {}
