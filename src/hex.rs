//! Fixed-width hex codec for unsigned integers.
//!
//! Independent of [`Alphabet`](crate::Alphabet): the digit tables are fixed
//! and there is no padding. Each width W emits exactly W/4 characters, two
//! per byte, with the pairs running from the least significant byte upward
//! and the high nibble first within each byte. Unlike the generic decoder,
//! this one fails fast on any character that is not a hex digit.

use std::fmt;

const LOWER: &[u8; 16] = b"0123456789abcdef";
const UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Digit case for the fixed hex tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Case {
    /// `0-9` and `a-f`
    #[default]
    Lower,
    /// `0-9` and `A-F`
    Upper,
}

impl Case {
    fn table(self) -> &'static [u8; 16] {
        match self {
            Case::Lower => LOWER,
            Case::Upper => UPPER,
        }
    }
}

/// A character that is not `0-9`, `a-f`, or `A-F` was found while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidHexDigit {
    /// The offending byte
    pub byte: u8,
    /// Its position in the source text
    pub position: usize,
}

impl fmt::Display for InvalidHexDigit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid hex digit 0x{:02x} at position {}",
            self.byte, self.position
        )
    }
}

impl std::error::Error for InvalidHexDigit {}

/// Bit position of digit `i`: pairs fill bytes from the least significant
/// byte upward, high nibble before low nibble within each byte.
fn digit_shift(i: usize) -> usize {
    (i / 2) * 8 + if i % 2 == 0 { 4 } else { 0 }
}

macro_rules! fixed_width_hex {
    ($ty:ty, $digits:literal, $encode:ident, $encode_into:ident, $decode:ident) => {
        /// Encodes the value as exactly `W/4` hex characters, one digit
        /// pair per byte from the least significant byte upward, high
        /// nibble first within each byte.
        pub fn $encode(value: $ty, case: Case) -> String {
            let mut buf = [0u8; $digits];
            $encode_into(value, case, &mut buf);
            String::from_utf8(buf.to_vec()).expect("hex digits are ASCII")
        }

        /// Writes the fixed-width hex form into the start of `dst` and
        /// returns the digit count written.
        ///
        /// # Panics
        ///
        /// Panics if `dst` is shorter than the digit count; callers slice to
        /// the intended offset.
        pub fn $encode_into(value: $ty, case: Case, dst: &mut [u8]) -> usize {
            let dst = &mut dst[..$digits];
            if value == 0 {
                dst.fill(b'0');
                return $digits;
            }
            let table = case.table();
            for (i, slot) in dst.iter_mut().enumerate() {
                *slot = table[((value >> digit_shift(i)) & 0xF) as usize];
            }
            $digits
        }

        /// Decodes up to `W/4` hex characters starting at `offset`.
        ///
        /// Digit pairs map to bytes from the least significant byte upward,
        /// with the first digit of each pair in the byte's high nibble.
        /// Fewer characters than the full width are accepted; the bytes
        /// without digits stay zero.
        ///
        /// # Errors
        ///
        /// Fails on the first character that is not a hex digit. No silent
        /// recovery, in contrast to the generic alphabet decoder.
        pub fn $decode(text: &str, offset: usize) -> Result<$ty, InvalidHexDigit> {
            let bytes = text.as_bytes();
            let start = offset.min(bytes.len());
            let end = bytes.len().min(offset.saturating_add($digits));
            let mut value: $ty = 0;
            for (i, &b) in bytes[start..end].iter().enumerate() {
                let nibble = match b {
                    b'0'..=b'9' => b - b'0',
                    b'a'..=b'f' => b - b'a' + 10,
                    b'A'..=b'F' => b - b'A' + 10,
                    _ => {
                        return Err(InvalidHexDigit {
                            byte: b,
                            position: start + i,
                        });
                    }
                };
                value |= (nibble as $ty) << digit_shift(i);
            }
            Ok(value)
        }
    };
}

fixed_width_hex!(u8, 2, encode_u8, encode_u8_into, decode_u8);
fixed_width_hex!(u16, 4, encode_u16, encode_u16_into, decode_u16);
fixed_width_hex!(u32, 8, encode_u32, encode_u32_into, decode_u32);
fixed_width_hex!(u64, 16, encode_u64, encode_u64_into, decode_u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_fast_path() {
        assert_eq!(encode_u8(0, Case::Lower), "00");
        assert_eq!(encode_u16(0, Case::Lower), "0000");
        assert_eq!(encode_u32(0, Case::Lower), "00000000");
        assert_eq!(encode_u64(0, Case::Lower), "0000000000000000");
        assert_eq!(decode_u16("0000", 0), Ok(0));
    }

    #[test]
    fn test_boundary_values() {
        assert_eq!(encode_u8(1, Case::Lower), "01");
        assert_eq!(encode_u8(u8::MAX, Case::Lower), "ff");
        assert_eq!(encode_u16(u16::MAX, Case::Upper), "FFFF");
        assert_eq!(encode_u32(0xDEADBEEF, Case::Lower), "efbeadde");
        assert_eq!(encode_u64(u64::MAX, Case::Lower), "ffffffffffffffff");

        assert_eq!(decode_u8("ff", 0), Ok(u8::MAX));
        assert_eq!(decode_u16("FFFF", 0), Ok(u16::MAX));
        assert_eq!(decode_u32("efbeadde", 0), Ok(0xDEADBEEF));
        assert_eq!(decode_u64("ffffffffffffffff", 0), Ok(u64::MAX));
    }

    #[test]
    fn test_byte_pair_ordering() {
        // Digit pairs are the value's bytes from the least significant byte
        // upward, high nibble first within each byte.
        assert_eq!(decode_u16("3412", 0), Ok(0x1234));
        assert_eq!(encode_u16(0x1234, Case::Lower), "3412");
        assert_eq!(decode_u32("78563412", 0), Ok(0x12345678));
        assert_eq!(
            encode_u64(0x0123_4567_89AB_CDEF, Case::Lower),
            "efcdab8967452301"
        );
    }

    #[test]
    fn test_round_trip_per_width() {
        for value in [0u64, 1, 0x9c, 0x1234, 0x89ABCDEF, 0x0123_4567_89AB_CDEF] {
            assert_eq!(decode_u64(&encode_u64(value, Case::Lower), 0), Ok(value));
            assert_eq!(decode_u64(&encode_u64(value, Case::Upper), 0), Ok(value));
        }
        assert_eq!(decode_u8(&encode_u8(0x9c, Case::Lower), 0), Ok(0x9c));
        assert_eq!(decode_u16(&encode_u16(0x9c0f, Case::Lower), 0), Ok(0x9c0f));
        assert_eq!(
            decode_u32(&encode_u32(0x9c0f_1234, Case::Lower), 0),
            Ok(0x9c0f_1234)
        );
    }

    #[test]
    fn test_decode_with_offset() {
        assert_eq!(decode_u8("xx9c", 2), Ok(0x9c));
        assert_eq!(decode_u16("00003412", 4), Ok(0x1234));
        // Reads stop after W/4 digits even when more follow.
        assert_eq!(decode_u8("9c0f", 0), Ok(0x9c));
    }

    #[test]
    fn test_decode_short_input() {
        // Missing trailing digits leave the remaining bits zero.
        assert_eq!(decode_u16("c", 0), Ok(0x00c0));
        assert_eq!(decode_u16("c0", 0), Ok(0x00c0));
        assert_eq!(decode_u32("9c", 0), Ok(0x0000_009c));
        assert_eq!(decode_u64("", 0), Ok(0));
        // Offset past the end reads nothing.
        assert_eq!(decode_u16("12", 5), Ok(0));
    }

    #[test]
    fn test_decode_mixed_case() {
        assert_eq!(decode_u16("9C0f", 0), Ok(0x0f9c));
    }

    #[test]
    fn test_decode_invalid_digit() {
        assert_eq!(
            decode_u16("12g4", 0),
            Err(InvalidHexDigit {
                byte: b'g',
                position: 2
            })
        );
        // Whitespace is not skipped here, unlike the alphabet decoder.
        assert_eq!(
            decode_u8(" 9", 0),
            Err(InvalidHexDigit {
                byte: b' ',
                position: 0
            })
        );
    }

    #[test]
    fn test_encode_into_offset() {
        let mut buf = [b'.'; 8];
        let n = encode_u16_into(0x9c0f, Case::Upper, &mut buf[2..]);
        assert_eq!(n, 4);
        assert_eq!(&buf, b"..0F9C..");
    }
}
