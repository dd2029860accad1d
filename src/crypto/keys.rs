//! # Key Formats & Addresses
//!
//! Wallets hand keys around in half a dozen encodings: raw SEC1 bytes,
//! compressed or not, hex renderings of either, the Electrum layout with
//! no lead byte, and WIF for private keys. This module parses all of them
//! at the edge into two typed values — [`Pubkey`] and [`Privkey`] — that
//! carry the curve data plus the format they arrived in.
//!
//! The format tag matters beyond round-tripping: address derivation hashes
//! the raw bytes of the *presented* encoding (a compressed key hashes 33
//! bytes, an uncompressed one 65), so the same curve point yields two
//! different addresses depending on how it was serialized. Signature
//! recovery also reports compression through the recovery byte, and the
//! tag is how that information flows to the address check.
//!
//! ## Security notes
//!
//! - Private scalars are range-checked into `[1, n)` at every constructor.
//! - `Debug` for [`Privkey`] never prints key material.
//! - Key generation uses the OS RNG and rejection-samples until the bytes
//!   land below the group order.

use std::fmt;

use lazy_static::lazy_static;
use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::rngs::OsRng;
use rand::RngCore;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroize;

use crate::config;
use crate::crypto::curve::{self, AffinePoint, CURVE_B, G, N, P};
use crate::crypto::field::{modulo, pow_mod};
use crate::crypto::hash::hash160;
use crate::encoding::base58check::{self, Base58CheckError};

lazy_static! {
    // Base58Check P2PKH/P2SH leads plus the Bech32-style dgb1 lead.
    static ref ADDRESS_PATTERN: Regex =
        Regex::new(r"^(?:D|3|S|dgb1)[a-km-zA-HJ-NP-Z0-9]{26,33}$").expect("address pattern parses");
}

/// Errors from key parsing and conversion.
///
/// Deliberately coarse: callers get told the layout was wrong, not which
/// byte betrayed it.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("input does not match any recognized key layout")]
    UnrecognizedFormat,

    #[error("decoded point is not on the curve")]
    PointOffCurve,

    #[error("private scalar must lie in [1, n)")]
    ScalarOutOfRange,

    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error(transparent)]
    Base58Check(#[from] Base58CheckError),
}

/// Whether a string is shaped like a DigiByte address. Recognition only;
/// checksum validation happens when the address is actually decoded.
pub fn is_address_like(text: &str) -> bool {
    ADDRESS_PATTERN.is_match(text)
}

/// `value` as exactly 32 big-endian bytes. Callers guarantee the value is
/// non-negative and below 2²⁵⁶.
pub(crate) fn scalar_to_bytes32(value: &BigInt) -> [u8; 32] {
    let (_, bytes) = value.to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    out
}

// ---------------------------------------------------------------------------
// Public Keys
// ---------------------------------------------------------------------------

/// The encodings a public key can arrive in, detected by carrier, length,
/// and lead byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PubkeyFormat {
    /// 65 bytes: `0x04 ‖ x ‖ y`.
    Bin,
    /// 33 bytes: `(0x02 + y parity) ‖ x`.
    BinCompressed,
    /// 64 bytes: `x ‖ y`, no lead byte.
    BinElectrum,
    /// 130 hex chars of [`Bin`](Self::Bin).
    Hex,
    /// 66 hex chars of [`BinCompressed`](Self::BinCompressed).
    HexCompressed,
    /// 128 hex chars of [`BinElectrum`](Self::BinElectrum).
    HexElectrum,
    /// A bare affine coordinate pair.
    Decimal,
}

impl PubkeyFormat {
    pub fn is_compressed(self) -> bool {
        matches!(self, PubkeyFormat::BinCompressed | PubkeyFormat::HexCompressed)
    }

    /// Format detection for raw bytes, by length and lead byte.
    pub fn detect_bytes(bytes: &[u8]) -> Option<Self> {
        match (bytes.len(), bytes.first()) {
            (65, Some(0x04)) => Some(PubkeyFormat::Bin),
            (33, Some(0x02 | 0x03)) => Some(PubkeyFormat::BinCompressed),
            (64, _) => Some(PubkeyFormat::BinElectrum),
            _ => None,
        }
    }

    /// Format detection for hex text, by length and lead pair.
    pub fn detect_text(text: &str) -> Option<Self> {
        match (text.len(), text.get(..2)) {
            (130, Some("04")) => Some(PubkeyFormat::Hex),
            (66, Some("02" | "03")) => Some(PubkeyFormat::HexCompressed),
            (128, _) => Some(PubkeyFormat::HexElectrum),
            _ => None,
        }
    }
}

/// A public key: a validated curve point plus the encoding it arrived in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pubkey {
    point: AffinePoint,
    format: PubkeyFormat,
}

impl Pubkey {
    /// Wraps a point after reducing its coordinates into `[0, p)` and
    /// checking it satisfies the curve equation.
    pub fn new(point: AffinePoint, format: PubkeyFormat) -> Result<Self, KeyError> {
        let point = AffinePoint::new(modulo(&point.x, &P), modulo(&point.y, &P));
        if !point.is_on_curve() {
            return Err(KeyError::PointOffCurve);
        }
        Ok(Self { point, format })
    }

    /// Detects and decodes one of the binary layouts (65, 33, or 64
    /// bytes). Compressed input recovers `y` from the lead byte's parity.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let format = PubkeyFormat::detect_bytes(bytes).ok_or(KeyError::UnrecognizedFormat)?;
        match format {
            PubkeyFormat::Bin => {
                let x = BigInt::from_bytes_be(Sign::Plus, &bytes[1..33]);
                let y = BigInt::from_bytes_be(Sign::Plus, &bytes[33..]);
                Self::new(AffinePoint::new(x, y), format)
            }
            PubkeyFormat::BinCompressed => {
                let x = BigInt::from_bytes_be(Sign::Plus, &bytes[1..]);
                let y = recover_y(&x, bytes[0])?;
                Self::new(AffinePoint::new(x, y), format)
            }
            PubkeyFormat::BinElectrum => {
                let x = BigInt::from_bytes_be(Sign::Plus, &bytes[..32]);
                let y = BigInt::from_bytes_be(Sign::Plus, &bytes[32..]);
                Self::new(AffinePoint::new(x, y), format)
            }
            _ => Err(KeyError::UnrecognizedFormat),
        }
    }

    /// Detects and decodes one of the hex layouts (130, 66, or 128 chars).
    pub fn from_hex_str(text: &str) -> Result<Self, KeyError> {
        let format = PubkeyFormat::detect_text(text).ok_or(KeyError::UnrecognizedFormat)?;
        let bytes = hex::decode(text)?;
        let decoded = Self::from_bytes(&bytes)?;
        Ok(Self {
            point: decoded.point,
            format,
        })
    }

    pub fn point(&self) -> &AffinePoint {
        &self.point
    }

    pub fn format(&self) -> PubkeyFormat {
        self.format
    }

    /// The same point under a different encoding tag.
    pub fn with_format(mut self, format: PubkeyFormat) -> Self {
        self.format = format;
        self
    }

    /// The raw bytes underlying the current format. Hex formats serialize
    /// to the same bytes as their binary counterparts; the decimal pair
    /// serializes uncompressed.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self.format {
            PubkeyFormat::Bin | PubkeyFormat::Hex | PubkeyFormat::Decimal => {
                let mut out = Vec::with_capacity(65);
                out.push(0x04);
                out.extend_from_slice(&scalar_to_bytes32(&self.point.x));
                out.extend_from_slice(&scalar_to_bytes32(&self.point.y));
                out
            }
            PubkeyFormat::BinCompressed | PubkeyFormat::HexCompressed => {
                let lead = if self.point.y.is_odd() { 0x03 } else { 0x02 };
                let mut out = Vec::with_capacity(33);
                out.push(lead);
                out.extend_from_slice(&scalar_to_bytes32(&self.point.x));
                out
            }
            PubkeyFormat::BinElectrum | PubkeyFormat::HexElectrum => {
                let mut out = Vec::with_capacity(64);
                out.extend_from_slice(&scalar_to_bytes32(&self.point.x));
                out.extend_from_slice(&scalar_to_bytes32(&self.point.y));
                out
            }
        }
    }

    /// Lowercase hex of [`to_bytes`](Self::to_bytes).
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Base58Check address of this key under `version`: the HASH160 of the
    /// bytes of the current encoding.
    pub fn address(&self, version: u32) -> String {
        base58check::bin_to_b58check(&hash160(&self.to_bytes()), version)
    }
}

/// Recovers `y` from `x` and a compressed lead byte. With `p ≡ 3 (mod 4)`
/// the square root is `(x³ + 7)^((p+1)/4)`; the candidate whose parity
/// matches the lead byte's low bit is the one that was serialized.
fn recover_y(x: &BigInt, lead: u8) -> Result<BigInt, KeyError> {
    let alpha = modulo(&(x * x * x + BigInt::from(CURVE_B)), &P);
    let exp = (&*P + BigInt::one()) >> 2usize;
    let beta = pow_mod(&alpha, &exp, &P);
    if !modulo(&(&beta * &beta - &alpha), &P).is_zero() {
        return Err(KeyError::PointOffCurve);
    }
    let wants_odd = lead & 1 == 1;
    if beta.is_odd() == wants_odd {
        Ok(beta)
    } else {
        Ok(&*P - beta)
    }
}

// ---------------------------------------------------------------------------
// Private Keys
// ---------------------------------------------------------------------------

/// The encodings a private key can arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivkeyFormat {
    /// A bare scalar.
    Decimal,
    /// 32 raw bytes.
    Bin,
    /// 33 raw bytes with a trailing `0x01` compression marker.
    BinCompressed,
    /// 64 hex chars.
    Hex,
    /// 66 hex chars ending in `01`.
    HexCompressed,
    /// Base58Check with version `0x80 + network`.
    Wif,
    /// WIF of the 33-byte compressed layout.
    WifCompressed,
}

impl PrivkeyFormat {
    /// Whether signatures from this key should advertise a compressed
    /// public key.
    pub fn is_compressed(self) -> bool {
        matches!(
            self,
            PrivkeyFormat::BinCompressed | PrivkeyFormat::HexCompressed | PrivkeyFormat::WifCompressed
        )
    }

    /// The public key format family this private format derives into.
    /// WIF keys have no textual pubkey analogue and fall back to hex.
    pub fn pubkey_format(self) -> PubkeyFormat {
        match self {
            PrivkeyFormat::Decimal => PubkeyFormat::Decimal,
            PrivkeyFormat::Bin => PubkeyFormat::Bin,
            PrivkeyFormat::BinCompressed => PubkeyFormat::BinCompressed,
            PrivkeyFormat::Hex | PrivkeyFormat::Wif => PubkeyFormat::Hex,
            PrivkeyFormat::HexCompressed | PrivkeyFormat::WifCompressed => {
                PubkeyFormat::HexCompressed
            }
        }
    }
}

/// A private key: a scalar in `[1, n)` plus the encoding it arrived in.
#[derive(Clone)]
pub struct Privkey {
    scalar: BigInt,
    format: PrivkeyFormat,
}

impl fmt::Debug for Privkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Key material stays out of logs, partial or otherwise.
        write!(f, "Privkey(format={:?})", self.format)
    }
}

impl Privkey {
    /// Wraps a scalar after range-checking it into `[1, n)`.
    pub fn from_scalar(scalar: BigInt, format: PrivkeyFormat) -> Result<Self, KeyError> {
        if scalar.sign() != Sign::Plus || scalar >= *N {
            return Err(KeyError::ScalarOutOfRange);
        }
        Ok(Self { scalar, format })
    }

    /// A fresh random key from the OS RNG, tagged as hex.
    pub fn generate() -> Self {
        loop {
            let mut buffer = [0u8; 32];
            OsRng.fill_bytes(&mut buffer);
            let scalar = BigInt::from_bytes_be(Sign::Plus, &buffer);
            buffer.zeroize();
            if scalar.sign() == Sign::Plus && scalar < *N {
                return Self {
                    scalar,
                    format: PrivkeyFormat::Hex,
                };
            }
        }
    }

    /// Decodes the raw layouts: 32 bytes, or 33 with the `0x01` marker.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        match bytes.len() {
            32 => Self::from_scalar(
                BigInt::from_bytes_be(Sign::Plus, bytes),
                PrivkeyFormat::Bin,
            ),
            33 if bytes[32] == 0x01 => Self::from_scalar(
                BigInt::from_bytes_be(Sign::Plus, &bytes[..32]),
                PrivkeyFormat::BinCompressed,
            ),
            _ => Err(KeyError::UnrecognizedFormat),
        }
    }

    /// Decodes a WIF string. The compression marker selects the format.
    pub fn from_wif(text: &str) -> Result<Self, KeyError> {
        let payload = base58check::b58check_to_bin(text)?;
        match payload.len() {
            32 => Self::from_scalar(
                BigInt::from_bytes_be(Sign::Plus, &payload),
                PrivkeyFormat::Wif,
            ),
            33 if payload[32] == 0x01 => Self::from_scalar(
                BigInt::from_bytes_be(Sign::Plus, &payload[..32]),
                PrivkeyFormat::WifCompressed,
            ),
            _ => Err(KeyError::UnrecognizedFormat),
        }
    }

    /// Sniffs an opaque textual key: 64 hex chars, 66 hex chars ending in
    /// `01`, or WIF.
    pub fn decode(text: &str) -> Result<Self, KeyError> {
        let all_hex = text.bytes().all(|b| b.is_ascii_hexdigit());
        match text.len() {
            64 if all_hex => {
                let bytes = hex::decode(text)?;
                Self::from_scalar(
                    BigInt::from_bytes_be(Sign::Plus, &bytes),
                    PrivkeyFormat::Hex,
                )
            }
            66 if all_hex && text.ends_with("01") => {
                let bytes = hex::decode(text)?;
                Self::from_scalar(
                    BigInt::from_bytes_be(Sign::Plus, &bytes[..32]),
                    PrivkeyFormat::HexCompressed,
                )
            }
            _ => Self::from_wif(text),
        }
    }

    pub fn scalar(&self) -> &BigInt {
        &self.scalar
    }

    pub fn format(&self) -> PrivkeyFormat {
        self.format
    }

    pub fn is_compressed(&self) -> bool {
        self.format.is_compressed()
    }

    /// The same scalar under a different encoding tag.
    pub fn with_format(mut self, format: PrivkeyFormat) -> Self {
        self.format = format;
        self
    }

    /// 32 raw bytes, plus the `0x01` marker for compressed formats.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = scalar_to_bytes32(&self.scalar).to_vec();
        if self.format.is_compressed() {
            out.push(0x01);
        }
        out
    }

    /// Lowercase hex of [`to_bytes`](Self::to_bytes).
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// WIF under `0x80 + version`. Compression follows the current format.
    pub fn to_wif(&self, version: u8) -> String {
        base58check::bin_to_b58check(
            &self.to_bytes(),
            config::WIF_VERSION_OFFSET as u32 + version as u32,
        )
    }

    /// The public key `scalar·G`, in the format family of this key.
    pub fn to_pubkey(&self) -> Pubkey {
        Pubkey {
            point: curve::scalar_mul(&G, &self.scalar),
            format: self.format.pubkey_format(),
        }
    }
}
