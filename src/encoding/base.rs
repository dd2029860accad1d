//! # Radix Conversion
//!
//! Converts non-negative integers between the six alphabets the protocol
//! touches: binary, decimal, lowercase hex, RFC 4648 base32 (lowercase),
//! Bitcoin Base58, and raw bytes (base 256).
//!
//! Base 256 carries its digits as bytes; every other base carries text.
//! The [`Digits`] enum makes that split explicit so a caller can never
//! confuse a byte string with its hex rendering.
//!
//! Left-padding is per-alphabet: base 256 pads with `0x00`, Base58 pads
//! with `'1'` (its zero digit), everything else pads with `'0'`.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use thiserror::Error;

/// The Bitcoin Base58 alphabet. No `0`, `O`, `I`, or `l`.
pub const BASE58_ALPHABET: &[u8; 58] =
    b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

const BINARY_ALPHABET: &[u8; 2] = b"01";
const DECIMAL_ALPHABET: &[u8; 10] = b"0123456789";
const HEX_ALPHABET: &[u8; 16] = b"0123456789abcdef";
const BASE32_ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

/// Errors from radix conversion.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BaseCodecError {
    #[error("unsupported base {0}")]
    UnsupportedBase(u32),

    #[error("invalid digit {digit:?} for base {base}")]
    InvalidDigit { digit: char, base: u32 },

    #[error("base {base} input must be carried as {expected}")]
    WrongCarrier { base: u32, expected: &'static str },
}

/// A supported radix. Parse untrusted radix values through
/// [`Base::from_radix`]; everything downstream is then infallible on the
/// base axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Base {
    Binary,
    Decimal,
    Hex,
    Base32,
    Base58,
    /// Raw bytes. The identity alphabet `0..=255`.
    Bytes,
}

impl Base {
    /// Maps a numeric radix to a supported base.
    pub fn from_radix(radix: u32) -> Result<Self, BaseCodecError> {
        match radix {
            2 => Ok(Base::Binary),
            10 => Ok(Base::Decimal),
            16 => Ok(Base::Hex),
            32 => Ok(Base::Base32),
            58 => Ok(Base::Base58),
            256 => Ok(Base::Bytes),
            other => Err(BaseCodecError::UnsupportedBase(other)),
        }
    }

    /// The numeric radix.
    pub fn radix(self) -> u32 {
        match self {
            Base::Binary => 2,
            Base::Decimal => 10,
            Base::Hex => 16,
            Base::Base32 => 32,
            Base::Base58 => 58,
            Base::Bytes => 256,
        }
    }

    /// The printable alphabet. `None` for base 256, which has no text form.
    fn alphabet(self) -> Option<&'static [u8]> {
        match self {
            Base::Binary => Some(BINARY_ALPHABET),
            Base::Decimal => Some(DECIMAL_ALPHABET),
            Base::Hex => Some(HEX_ALPHABET),
            Base::Base32 => Some(BASE32_ALPHABET),
            Base::Base58 => Some(BASE58_ALPHABET),
            Base::Bytes => None,
        }
    }

    /// The zero digit used for left-padding.
    fn pad_byte(self) -> u8 {
        match self {
            Base::Bytes => 0,
            Base::Base58 => b'1',
            _ => b'0',
        }
    }
}

/// Digits of a converted value: text for printable alphabets, raw bytes
/// for base 256.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Digits {
    Text(String),
    Bytes(Vec<u8>),
}

impl Digits {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Digits::Text(text) => Some(text),
            Digits::Bytes(_) => None,
        }
    }

    pub fn as_byte_slice(&self) -> Option<&[u8]> {
        match self {
            Digits::Text(_) => None,
            Digits::Bytes(bytes) => Some(bytes),
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Digits::Text(text) => Some(text),
            Digits::Bytes(_) => None,
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Digits::Text(_) => None,
            Digits::Bytes(bytes) => Some(bytes),
        }
    }
}

/// Emits the digits of `value` in `base`, left-padded to `minlen` with the
/// base's zero digit.
pub fn encode(value: &BigUint, base: Base, minlen: usize) -> Digits {
    let Some(alphabet) = base.alphabet() else {
        return Digits::Bytes(encode_bytes(value, minlen));
    };
    let radix = BigUint::from(base.radix());
    let mut digits = Vec::new();
    let mut remaining = value.clone();
    while !remaining.is_zero() {
        // The remainder is always below the radix, so it fits a usize.
        let digit = (&remaining % &radix).to_usize().unwrap_or_default();
        digits.push(alphabet[digit]);
        remaining /= &radix;
    }
    while digits.len() < minlen {
        digits.push(base.pad_byte());
    }
    // All alphabets are ASCII.
    Digits::Text(digits.iter().rev().map(|&b| b as char).collect())
}

/// Emits `value` big-endian, left-padded with zero bytes to `minlen`.
pub fn encode_bytes(value: &BigUint, minlen: usize) -> Vec<u8> {
    let mut bytes = if value.is_zero() {
        Vec::new()
    } else {
        value.to_bytes_be()
    };
    if bytes.len() < minlen {
        let mut padded = vec![0u8; minlen - bytes.len()];
        padded.append(&mut bytes);
        bytes = padded;
    }
    bytes
}

/// [`encode`] restricted to the printable alphabets.
pub fn encode_text(value: &BigUint, base: Base, minlen: usize) -> Result<String, BaseCodecError> {
    match encode(value, base, minlen) {
        Digits::Text(text) => Ok(text),
        Digits::Bytes(_) => Err(BaseCodecError::WrongCarrier {
            base: base.radix(),
            expected: "a printable alphabet",
        }),
    }
}

/// Reads digits back into a non-negative integer. The carrier must match
/// the base: bytes for base 256, text otherwise.
pub fn decode(input: &Digits, base: Base) -> Result<BigUint, BaseCodecError> {
    match (base, input) {
        (Base::Bytes, Digits::Bytes(bytes)) => Ok(decode_bytes(bytes)),
        (Base::Bytes, Digits::Text(_)) => Err(BaseCodecError::WrongCarrier {
            base: 256,
            expected: "bytes",
        }),
        (_, Digits::Bytes(_)) => Err(BaseCodecError::WrongCarrier {
            base: base.radix(),
            expected: "text",
        }),
        (_, Digits::Text(text)) => decode_text(text, base),
    }
}

/// Decodes a textual digit string. Hex and base32 accept either case.
pub fn decode_text(text: &str, base: Base) -> Result<BigUint, BaseCodecError> {
    let Some(alphabet) = base.alphabet() else {
        return Err(BaseCodecError::WrongCarrier {
            base: 256,
            expected: "bytes",
        });
    };
    let folded;
    let text = match base {
        Base::Hex | Base::Base32 => {
            folded = text.to_ascii_lowercase();
            folded.as_str()
        }
        _ => text,
    };
    let radix = BigUint::from(base.radix());
    let mut value = BigUint::zero();
    for ch in text.chars() {
        let digit = alphabet
            .iter()
            .position(|&entry| entry as char == ch)
            .ok_or(BaseCodecError::InvalidDigit {
                digit: ch,
                base: base.radix(),
            })?;
        value = value * &radix + BigUint::from(digit);
    }
    Ok(value)
}

/// Reads a big-endian byte string as an integer. Empty input is zero.
pub fn decode_bytes(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// Decode in `from`, re-encode in `to`. When the bases are equal the input
/// is only left-padded to `minlen`.
pub fn changebase(
    input: &Digits,
    from: Base,
    to: Base,
    minlen: usize,
) -> Result<Digits, BaseCodecError> {
    if from == to {
        return Ok(left_pad(input, from, minlen));
    }
    let value = decode(input, from)?;
    Ok(encode(&value, to, minlen))
}

fn left_pad(input: &Digits, base: Base, minlen: usize) -> Digits {
    match input {
        Digits::Bytes(bytes) => {
            let mut padded = vec![0u8; minlen.saturating_sub(bytes.len())];
            padded.extend_from_slice(bytes);
            Digits::Bytes(padded)
        }
        Digits::Text(text) => {
            let missing = minlen.saturating_sub(text.chars().count());
            let mut padded = String::new();
            for _ in 0..missing {
                padded.push(base.pad_byte() as char);
            }
            padded.push_str(text);
            Digits::Text(padded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(decimal: &str) -> BigUint {
        BigUint::parse_bytes(decimal.as_bytes(), 10).unwrap()
    }

    // A 70-digit prime used across the conversion tests.
    const PRIME70: &str =
        "4669523849932130508876392554713407521319117239637943224980015676156491";

    #[test]
    fn base58_known_vector() {
        let value = big(PRIME70);
        let encoded = encode(&value, Base::Base58, 0);
        assert_eq!(
            encoded,
            Digits::Text("8s3gRRbpi7NyJH3sudQTtsygDHDyzzB5q3Xc6svA".into())
        );
        assert_eq!(decode(&encoded, Base::Base58).unwrap(), value);
    }

    #[test]
    fn base256_known_vector() {
        let value = big(PRIME70);
        let expected: Vec<u8> = vec![
            173, 51, 199, 177, 216, 177, 196, 183, 192, 150, 220, 234, 57, 145, 219, 154,
            51, 37, 6, 178, 9, 206, 152, 144, 33, 128, 108, 106, 75,
        ];
        assert_eq!(encode(&value, Base::Bytes, 0), Digits::Bytes(expected.clone()));
        assert_eq!(decode_bytes(&expected), value);
    }

    #[test]
    fn round_trips_all_bases() {
        let value = big("123456789012345678901234567890");
        for base in [
            Base::Binary,
            Base::Decimal,
            Base::Hex,
            Base::Base32,
            Base::Base58,
            Base::Bytes,
        ] {
            let encoded = encode(&value, base, 0);
            assert_eq!(decode(&encoded, base).unwrap(), value, "base {:?}", base);
        }
    }

    #[test]
    fn zero_encodes_to_padding() {
        let zero = BigUint::zero();
        assert_eq!(encode(&zero, Base::Decimal, 0), Digits::Text(String::new()));
        assert_eq!(encode(&zero, Base::Decimal, 3), Digits::Text("000".into()));
        assert_eq!(encode(&zero, Base::Base58, 2), Digits::Text("11".into()));
        assert_eq!(encode(&zero, Base::Bytes, 4), Digits::Bytes(vec![0, 0, 0, 0]));
    }

    #[test]
    fn minlen_pads_left() {
        let value = big("255");
        assert_eq!(encode(&value, Base::Hex, 6), Digits::Text("0000ff".into()));
        assert_eq!(
            encode(&value, Base::Bytes, 3),
            Digits::Bytes(vec![0, 0, 255])
        );
    }

    #[test]
    fn hex_decode_is_case_insensitive() {
        assert_eq!(decode_text("DEADBEEF", Base::Hex).unwrap(), big("3735928559"));
        assert_eq!(decode_text("deadbeef", Base::Hex).unwrap(), big("3735928559"));
    }

    #[test]
    fn invalid_digit_is_rejected() {
        // '0' is not in the Base58 alphabet.
        let err = decode_text("10O", Base::Base58).unwrap_err();
        assert!(matches!(err, BaseCodecError::InvalidDigit { .. }));
        assert!(decode_text("2", Base::Binary).is_err());
    }

    #[test]
    fn unsupported_radix_is_fatal() {
        assert_eq!(
            Base::from_radix(7),
            Err(BaseCodecError::UnsupportedBase(7))
        );
        assert_eq!(Base::from_radix(58).unwrap(), Base::Base58);
    }

    #[test]
    fn changebase_converts() {
        let input = Digits::Text("ff".into());
        let out = changebase(&input, Base::Hex, Base::Decimal, 0).unwrap();
        assert_eq!(out, Digits::Text("255".into()));
    }

    #[test]
    fn changebase_same_base_only_pads() {
        let input = Digits::Text("abc".into());
        let out = changebase(&input, Base::Hex, Base::Hex, 6).unwrap();
        assert_eq!(out, Digits::Text("000abc".into()));

        let bytes = Digits::Bytes(vec![7]);
        let out = changebase(&bytes, Base::Bytes, Base::Bytes, 3).unwrap();
        assert_eq!(out, Digits::Bytes(vec![0, 0, 7]));
    }

    #[test]
    fn carrier_mismatch_is_rejected() {
        let text = Digits::Text("ff".into());
        assert!(decode(&text, Base::Bytes).is_err());
        let bytes = Digits::Bytes(vec![0xff]);
        assert!(decode(&bytes, Base::Hex).is_err());
    }
}
