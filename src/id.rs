use std::{fmt, ops, str};

/// Represents a Universally Unique IDentifier.
///
/// The byte array is stored in big-endian order, so the derived [`Ord`] implementation compares
/// identifiers as unsigned 128-bit integers.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Uuid([u8; 16]);

/// The variant field of a UUID, decoded from the most significant bits of the ninth byte.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[non_exhaustive]
pub enum Variant {
    /// `0xxx`: reserved for the NCS backward compatibility (also covers the Nil UUID).
    Var0,
    /// `10xx`: the variant used by UUID versions 1 through 8, including the ones produced by this
    /// crate.
    Var10,
    /// `110x`: reserved for the Microsoft backward compatibility.
    Var110,
    /// `111x`: reserved for future definition (also covers the Max UUID).
    VarReserved,
}

impl Uuid {
    /// Nil UUID (00000000-0000-0000-0000-000000000000)
    pub const NIL: Self = Self([0x00; 16]);

    /// Max UUID (ffffffff-ffff-ffff-ffff-ffffffffffff)
    pub const MAX: Self = Self([0xff; 16]);

    /// Returns a reference to the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Creates a UUID from the `unix_ts_ms`, `rand_a`, and `rand_b` fields of UUIDv7, setting the
    /// version bits at `0111` and the variant bits at `10`.
    ///
    /// # Panics
    ///
    /// Panics if any argument exceeds its field width (48, 12, and 62 bits respectively).
    pub const fn from_fields_v7(unix_ts_ms: u64, rand_a: u16, rand_b: u64) -> Self {
        if unix_ts_ms >= 1 << 48 || rand_a >= 1 << 12 || rand_b >= 1 << 62 {
            panic!("invalid field value");
        }

        Self::from_u64_pair(
            unix_ts_ms << 16 | 0x7000 | rand_a as u64,
            0x8000_0000_0000_0000 | rand_b,
        )
    }

    /// Creates a UUID from the most significant and least significant 64-bit halves.
    pub const fn from_u64_pair(msb: u64, lsb: u64) -> Self {
        Self((((msb as u128) << 64) | lsb as u128).to_be_bytes())
    }

    /// Returns the most significant and least significant 64-bit halves.
    pub const fn as_u64_pair(&self) -> (u64, u64) {
        let value = u128::from_be_bytes(self.0);
        ((value >> 64) as u64, value as u64)
    }

    /// Returns the 48-bit `unix_ts_ms` field, i.e. the top 48 bits of the UUID.
    pub const fn unix_ts_ms(&self) -> u64 {
        self.as_u64_pair().0 >> 16
    }

    /// Returns the 12-bit `rand_a` field that follows the version bits.
    pub const fn rand_a(&self) -> u16 {
        (self.as_u64_pair().0 & 0x0fff) as u16
    }

    /// Returns the 62-bit `rand_b` field that follows the variant bits.
    pub const fn rand_b(&self) -> u64 {
        self.as_u64_pair().1 & ((1 << 62) - 1)
    }

    /// Returns the variant field value.
    pub const fn variant(&self) -> Variant {
        match self.0[8] >> 4 {
            0x0..=0x7 => Variant::Var0,
            0x8..=0xb => Variant::Var10,
            0xc | 0xd => Variant::Var110,
            _ => Variant::VarReserved,
        }
    }

    /// Returns the version field value if the variant field is `10` or `None` otherwise.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mono7::{Uuid, Variant};
    ///
    /// let x = Uuid::from_fields_v7(0x0192_2bcc_4d2a, 0x123, 0x0456_789a_bcde_f012);
    /// assert_eq!(x.variant(), Variant::Var10);
    /// assert_eq!(x.version(), Some(7));
    /// assert_eq!(Uuid::NIL.version(), None);
    /// ```
    pub const fn version(&self) -> Option<u8> {
        match self.variant() {
            Variant::Var10 => Some(self.0[6] >> 4),
            _ => None,
        }
    }

    /// Returns the 8-4-4-4-12 hexadecimal string representation stored in a stack-allocated
    /// structure that can be dereferenced as `str` and [`Display`](fmt::Display)ed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mono7::Uuid;
    ///
    /// let x = "01922bcc-4d2a-7123-8456-789abcdef012".parse::<Uuid>()?;
    /// let y = x.encode();
    /// assert_eq!(&y as &str, "01922bcc-4d2a-7123-8456-789abcdef012");
    /// assert_eq!(format!("{}", y), "01922bcc-4d2a-7123-8456-789abcdef012");
    /// # Ok::<(), mono7::ParseError>(())
    /// ```
    pub fn encode(&self) -> impl ops::Deref<Target = str> + fmt::Display {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";

        let mut buffer = [0u8; 36];
        let mut pos = 0;
        for (i, &e) in self.0.iter().enumerate() {
            buffer[pos] = DIGITS[(e >> 4) as usize];
            buffer[pos + 1] = DIGITS[(e & 15) as usize];
            pos += 2;
            if i == 3 || i == 5 || i == 7 || i == 9 {
                buffer[pos] = b'-';
                pos += 1;
            }
        }
        debug_assert!(buffer.is_ascii());
        UuidStr(buffer)
    }
}

impl fmt::Display for Uuid {
    /// Returns the 8-4-4-4-12 canonical hexadecimal string representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl str::FromStr for Uuid {
    type Err = ParseError;

    /// Creates an object from the 8-4-4-4-12 hexadecimal string representation, accepting both
    /// lowercase and uppercase digits.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        const ERR: ParseError = ParseError::InvalidFormat;
        let mut dst = [0u8; 16];
        let mut iter = src.chars();
        for (i, e) in dst.iter_mut().enumerate() {
            let hi = iter.next().ok_or(ERR)?.to_digit(16).ok_or(ERR)? as u8;
            let lo = iter.next().ok_or(ERR)?.to_digit(16).ok_or(ERR)? as u8;
            *e = (hi << 4) | lo;
            if (i == 3 || i == 5 || i == 7 || i == 9) && iter.next().ok_or(ERR)? != '-' {
                return Err(ERR);
            }
        }
        match iter.next() {
            None => Ok(Self(dst)),
            Some(_) => Err(ERR),
        }
    }
}

impl From<Uuid> for [u8; 16] {
    fn from(src: Uuid) -> Self {
        src.0
    }
}

impl From<[u8; 16]> for Uuid {
    fn from(src: [u8; 16]) -> Self {
        Self(src)
    }
}

impl AsRef<[u8]> for Uuid {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<Uuid> for u128 {
    fn from(src: Uuid) -> Self {
        Self::from_be_bytes(src.0)
    }
}

impl From<u128> for Uuid {
    fn from(src: u128) -> Self {
        Self(src.to_be_bytes())
    }
}

impl From<Uuid> for String {
    fn from(src: Uuid) -> Self {
        src.to_string()
    }
}

impl TryFrom<String> for Uuid {
    type Error = ParseError;

    fn try_from(src: String) -> Result<Self, Self::Error> {
        src.parse()
    }
}

/// Concrete return type of [`Uuid::encode()`] containing the stack-allocated 8-4-4-4-12 string
/// representation.
struct UuidStr([u8; 36]);

impl ops::Deref for UuidStr {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        debug_assert!(self.0.is_ascii());
        // SAFETY: the buffer is filled with ASCII hex digits and hyphens only
        unsafe { str::from_utf8_unchecked(&self.0) }
    }
}

impl fmt::Display for UuidStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }
}

/// Error parsing an invalid string representation of UUID.
#[derive(Clone, Eq, PartialEq, Hash, Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The input is not in the 8-4-4-4-12 hexadecimal format.
    #[error("invalid string representation")]
    InvalidFormat,
}

#[cfg(feature = "uuid")]
#[cfg_attr(docsrs, doc(cfg(feature = "uuid")))]
mod uuid_support {
    use super::Uuid;

    impl From<Uuid> for uuid::Uuid {
        fn from(src: Uuid) -> Self {
            uuid::Uuid::from_bytes(src.0)
        }
    }

    impl From<uuid::Uuid> for Uuid {
        fn from(src: uuid::Uuid) -> Self {
            Self(src.into_bytes())
        }
    }
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
mod serde_support {
    use super::{fmt, Uuid};
    use serde::{de, Deserializer, Serializer};

    impl serde::Serialize for Uuid {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                serializer.serialize_str(&self.encode())
            } else {
                serializer.serialize_bytes(self.as_bytes())
            }
        }
    }

    impl<'de> serde::Deserialize<'de> for Uuid {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            if deserializer.is_human_readable() {
                deserializer.deserialize_str(VisitorImpl)
            } else {
                deserializer.deserialize_bytes(VisitorImpl)
            }
        }
    }

    struct VisitorImpl;

    impl<'de> de::Visitor<'de> for VisitorImpl {
        type Value = Uuid;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "a UUID representation")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            value.parse::<Self::Value>().map_err(de::Error::custom)
        }

        fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Self::Value, E> {
            <[u8; 16]>::try_from(value)
                .map(Self::Value::from)
                .map_err(de::Error::custom)
        }
    }

}

#[cfg(test)]
mod tests {
    use super::{ParseError, Uuid, Variant};

    /// Returns a collection of prepared cases
    fn prepare_cases() -> &'static [((u64, u16, u64), &'static str)] {
        const MAX_UINT48: u64 = (1 << 48) - 1;
        const MAX_UINT12: u16 = (1 << 12) - 1;
        const MAX_UINT62: u64 = (1 << 62) - 1;

        &[
            ((0, 0, 0), "00000000-0000-7000-8000-000000000000"),
            ((MAX_UINT48, 0, 0), "ffffffff-ffff-7000-8000-000000000000"),
            ((0, MAX_UINT12, 0), "00000000-0000-7fff-8000-000000000000"),
            ((0, 0, MAX_UINT62), "00000000-0000-7000-bfff-ffffffffffff"),
            (
                (MAX_UINT48, MAX_UINT12, MAX_UINT62),
                "ffffffff-ffff-7fff-bfff-ffffffffffff",
            ),
            (
                (0x17f22e279b0, 0xcc3, 0x18c4dc0c0c07398f),
                "017f22e2-79b0-7cc3-98c4-dc0c0c07398f",
            ),
        ]
    }

    /// Encodes and decodes prepared cases correctly
    #[test]
    fn encodes_and_decodes_prepared_cases_correctly() {
        for (fs, text) in prepare_cases() {
            let from_fields = Uuid::from_fields_v7(fs.0, fs.1, fs.2);
            assert_eq!(Ok(from_fields), text.parse());
            assert_eq!(Ok(from_fields), text.to_uppercase().parse());
            assert_eq!(&from_fields.encode() as &str, *text);
            assert_eq!(&from_fields.to_string(), text);
            #[cfg(feature = "uuid")]
            assert_eq!(&uuid::Uuid::from(from_fields).to_string(), text);
        }
    }

    /// Reads back field values from prepared cases
    #[test]
    fn reads_back_field_values_from_prepared_cases() {
        for (fs, _) in prepare_cases() {
            let e = Uuid::from_fields_v7(fs.0, fs.1, fs.2);
            assert_eq!(e.unix_ts_ms(), fs.0);
            assert_eq!(e.rand_a(), fs.1);
            assert_eq!(e.rand_b(), fs.2);
            assert_eq!(e.version(), Some(7));
            assert_eq!(e.variant(), Variant::Var10);
        }
    }

    /// Panics on field values wider than their fields
    #[test]
    #[should_panic(expected = "invalid field value")]
    fn panics_on_field_values_wider_than_their_fields() {
        Uuid::from_fields_v7(0, 1 << 12, 0);
    }

    /// Returns error to invalid string representation
    #[test]
    fn returns_error_to_invalid_string_representation() {
        let cases = [
            "",
            " 0180a8f0-5b82-75b4-9fef-ecad657c30bb",
            "0180a8f0-5b84-7438-ab50-f0626f78002b ",
            " 0180a8f0-5b84-7438-ab50-f063bd5331af ",
            "+0180a8f0-5b84-7438-ab50-f06405d35edb",
            "-0180a8f0-5b84-7438-ab50-f06508df4c2d",
            "0180a8f05b847438ab50f068decfbfd7",
            "0180a8f0-5b847438-ab50-f06991838802",
            "{0180a8f0-5b84-7438-ab50-f06ac2e5e082}",
            "0180a8f0-5b84-74 8-ab50-f06bed27bdc7",
            "0180a8g0-5b84-7438-ab50-f06c91175b8a",
            "0180a8f0-5b84-7438-ab50_f06d3ea24429",
        ];

        for e in cases {
            assert_eq!(e.parse::<Uuid>(), Err(ParseError::InvalidFormat));
        }
    }

    /// Returns Nil and Max UUIDs
    #[test]
    fn returns_nil_and_max_uuids() {
        assert_eq!(
            &Uuid::NIL.encode() as &str,
            "00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            &Uuid::MAX.encode() as &str,
            "ffffffff-ffff-ffff-ffff-ffffffffffff"
        );
        assert_eq!(Uuid::NIL.variant(), Variant::Var0);
        assert_eq!(Uuid::MAX.variant(), Variant::VarReserved);
        assert_eq!(Uuid::MAX.version(), None);
    }

    /// Decodes every variant nibble
    #[test]
    fn decodes_every_variant_nibble() {
        for nibble in 0u64..16 {
            let e = Uuid::from_u64_pair(0, nibble << 60);
            let expected = match nibble {
                0..=7 => Variant::Var0,
                8..=11 => Variant::Var10,
                12 | 13 => Variant::Var110,
                _ => Variant::VarReserved,
            };
            assert_eq!(e.variant(), expected, "nibble {:x}", nibble);
        }
    }

    /// Splits into and joins from 64-bit halves
    #[test]
    fn splits_into_and_joins_from_64_bit_halves() {
        let e: Uuid = "017f22e2-79b0-7cc3-98c4-dc0c0c07398f".parse().unwrap();
        assert_eq!(e.as_u64_pair(), (0x017f22e279b07cc3, 0x98c4dc0c0c07398f));
        assert_eq!(Uuid::from_u64_pair(0x017f22e279b07cc3, 0x98c4dc0c0c07398f), e);
    }

    /// Has symmetric converters
    #[test]
    fn has_symmetric_converters() {
        for (fs, _) in prepare_cases() {
            let e = Uuid::from_fields_v7(fs.0, fs.1, fs.2);
            assert_eq!(Uuid::from(<[u8; 16]>::from(e)), e);
            assert_eq!(Uuid::from(u128::from(e)), e);
            assert_eq!(e.encode().parse(), Ok(e));
            assert_eq!(Uuid::try_from(e.to_string().to_uppercase()), Ok(e));
            #[cfg(feature = "uuid")]
            assert_eq!(Uuid::from(<uuid::Uuid>::from(e)), e);
            #[cfg(feature = "uuid")]
            assert_eq!(uuid::Uuid::from(e).as_u128(), u128::from(e));
        }
    }

    /// Exposes big-endian bytes as a slice
    #[test]
    fn exposes_big_endian_bytes_as_a_slice() {
        let e = Uuid::from_fields_v7(0x0123_4567_89ab, 0xcde, 0x0f);
        let bytes: &[u8] = e.as_ref();
        assert_eq!(bytes, &e.as_bytes()[..]);
        assert_eq!(bytes[..6], [0x01, 0x23, 0x45, 0x67, 0x89, 0xab]);
        assert_eq!(bytes[15], 0x0f);
    }

    /// Orders like unsigned 128-bit integers
    #[test]
    fn orders_like_unsigned_128_bit_integers() {
        let a = Uuid::from_fields_v7(1000, 0xfff, (1 << 62) - 1);
        let b = Uuid::from_fields_v7(1001, 0, 0);
        assert!(a < b);
        assert!(u128::from(a) < u128::from(b));
    }
}
