use thiserror::Error;

/// Errors reported when a caller-supplied timestamp cannot be encoded.
///
/// The generator state is left untouched whenever one of these is returned, so the same generator
/// can be used again right away.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Error)]
#[non_exhaustive]
pub enum GenerateError {
    /// The timestamp does not fit in the 48-bit `unix_ts_ms` field.
    #[error("`unix_ts_ms` must be a 48-bit integer: {unix_ts_ms}")]
    TimestampOutOfRange { unix_ts_ms: u64 },

    /// The counter overflowed at the last representable millisecond, so the clock cannot advance.
    #[error("counter exhausted at the maximum 48-bit timestamp")]
    ClockExhausted,
}
