//! # Base58Check
//!
//! The checksummed address encoding: `version ‖ payload ‖ checksum`
//! rendered in Base58, where the checksum is the first four bytes of the
//! double-SHA256 of `version ‖ payload`.
//!
//! Leading zero bytes of the versioned payload do not survive the integer
//! conversion, so they are carried as leading `'1'` characters (the Base58
//! zero digit) and restored on decode.

use num_traits::Zero;
use thiserror::Error;

use super::base::{self, Base};
use crate::crypto::hash::dsha256;

/// Errors from Base58Check decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Base58CheckError {
    /// The decoded data cannot hold a version byte and a 4-byte checksum.
    #[error("input too short for a version byte and checksum")]
    TooShort,

    /// The trailing four bytes do not match the payload digest.
    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error(transparent)]
    Codec(#[from] base::BaseCodecError),
}

/// Encodes `payload` under `version` with a double-SHA256 checksum.
///
/// Versions above 255 are serialized big-endian over as many bytes as they
/// need; the common single-byte case stays one byte.
pub fn bin_to_b58check(payload: &[u8], version: u32) -> String {
    let mut data = version_bytes(version);
    data.extend_from_slice(payload);
    let leading_zeros = data.iter().take_while(|&&byte| byte == 0).count();
    let checksum = dsha256(&data);
    data.extend_from_slice(&checksum[..4]);

    let value = base::decode_bytes(&data);
    let body = base::encode_text(&value, Base::Base58, 0).unwrap_or_default();
    let mut out = "1".repeat(leading_zeros);
    out.push_str(&body);
    out
}

/// Decodes a Base58Check string, verifies the checksum, and returns the
/// payload with the version byte stripped. Recover the version separately
/// with [`version_byte`].
pub fn b58check_to_bin(text: &str) -> Result<Vec<u8>, Base58CheckError> {
    let data = decode_checked(text)?;
    Ok(data[1..].to_vec())
}

/// The version byte of a Base58Check string, checksum verified.
pub fn version_byte(text: &str) -> Result<u8, Base58CheckError> {
    let data = decode_checked(text)?;
    Ok(data[0])
}

/// Decodes and checksum-verifies, returning `version ‖ payload`.
fn decode_checked(text: &str) -> Result<Vec<u8>, Base58CheckError> {
    let leading_ones = text.bytes().take_while(|&byte| byte == b'1').count();
    let value = base::decode_text(text, Base::Base58)?;
    let mut data = vec![0u8; leading_ones];
    if !value.is_zero() {
        data.extend_from_slice(&base::encode_bytes(&value, 0));
    }
    if data.len() < 5 {
        return Err(Base58CheckError::TooShort);
    }
    let (head, tail) = data.split_at(data.len() - 4);
    if dsha256(head)[..4] != *tail {
        return Err(Base58CheckError::ChecksumMismatch);
    }
    Ok(head.to_vec())
}

fn version_bytes(version: u32) -> Vec<u8> {
    if version == 0 {
        return vec![0];
    }
    let mut bytes = Vec::new();
    let mut remaining = version;
    while remaining > 0 {
        bytes.push((remaining % 256) as u8);
        remaining /= 256;
    }
    bytes.reverse();
    bytes
}
