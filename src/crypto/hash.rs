//! # Hash Primitives
//!
//! The digest functions the protocol is built from. All of them wrap
//! audited RustCrypto implementations; nothing here rolls its own
//! compression function.
//!
//! Two compositions matter to DigiByte:
//!
//! - **HASH160** — `RIPEMD-160(SHA-256(x))`, the 20-byte digest behind
//!   every P2PKH address.
//! - **Double SHA-256** — `SHA-256(SHA-256(x))`, used for Base58Check
//!   checksums and the signed-message digest.
//!
//! The signed-message digest is the one wallets actually sign: the
//! message is wrapped with a length-prefixed network magic before double
//! hashing, so a DigiID signature can never be replayed as a transaction
//! signature.

use hmac::{Hmac, Mac};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::config::MESSAGE_MAGIC;

type HmacSha256 = Hmac<Sha256>;

/// SHA-256.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// RIPEMD-160.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(data).into()
}

/// `RIPEMD-160(SHA-256(data))`. The address digest.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160(&sha256(data))
}

/// `SHA-256(SHA-256(data))`.
pub fn dsha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// HMAC-SHA256 of `msg` under `key`.
pub fn hmac_sha256(key: &[u8], msg: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(msg);
    mac.finalize().into_bytes().into()
}

/// Bitcoin-style variable-length integer, little-endian.
pub fn varint(n: u64) -> Vec<u8> {
    if n < 0xFD {
        vec![n as u8]
    } else if n <= 0xFFFF {
        let mut out = vec![0xFD];
        out.extend_from_slice(&(n as u16).to_le_bytes());
        out
    } else if n <= 0xFFFF_FFFF {
        let mut out = vec![0xFE];
        out.extend_from_slice(&(n as u32).to_le_bytes());
        out
    } else {
        let mut out = vec![0xFF];
        out.extend_from_slice(&n.to_le_bytes());
        out
    }
}

/// The digest a wallet signs for a text message:
/// `dsha256(0x19 ‖ "DigiByte Signed Message:\n" ‖ varint(len) ‖ message)`.
pub fn signed_message_hash(message: &str) -> [u8; 32] {
    let payload = message.as_bytes();
    let mut buffer = Vec::with_capacity(1 + MESSAGE_MAGIC.len() + 9 + payload.len());
    buffer.push(MESSAGE_MAGIC.len() as u8);
    buffer.extend_from_slice(MESSAGE_MAGIC.as_bytes());
    buffer.extend_from_slice(&varint(payload.len() as u64));
    buffer.extend_from_slice(payload);
    dsha256(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn sha256_empty_vector() {
        assert_eq!(
            sha256(b""),
            hex!("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
        );
    }

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            sha256(b"784734adfids"),
            hex!("ae616f5c8f6d338e4905f6170a90a231d0c89470a94b28e894a83aef90975557")
        );
    }

    #[test]
    fn dsha256_is_sha256_twice() {
        let once = sha256(b"digiid");
        assert_eq!(dsha256(b"digiid"), sha256(&once));
        assert_ne!(dsha256(b"digiid"), once);
    }

    #[test]
    fn hash160_known_vector() {
        assert_eq!(
            hash160(b"digiid"),
            hex!("7468c0fa70ea0c3a0e58a57595f5253fa909c2b5")
        );
    }

    #[test]
    fn ripemd160_abc_vector() {
        assert_eq!(
            ripemd160(b"abc"),
            hex!("8eb208f7e05d987a9b044a8e98c6b087f15a0bfc")
        );
    }

    #[test]
    fn hmac_rfc4231_vector() {
        // RFC 4231 test case 2.
        let mac = hmac_sha256(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            mac,
            hex!("5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843")
        );
    }

    #[test]
    fn hmac_short_vector() {
        assert_eq!(
            hmac_sha256(b"key", b"msg"),
            hex!("2d93cbc1be167bcb1637a4a23cbff01a7878f0c50ee833954ea5221bb1b8c628")
        );
    }

    #[test]
    fn varint_boundaries() {
        assert_eq!(varint(0), vec![0]);
        assert_eq!(varint(252), vec![252]);
        assert_eq!(varint(253), vec![0xFD, 253, 0]);
        assert_eq!(varint(0xFFFF), vec![0xFD, 0xFF, 0xFF]);
        assert_eq!(varint(0x1_0000), vec![0xFE, 0x00, 0x00, 0x01, 0x00]);
        assert_eq!(
            varint(0x1_0000_0000),
            vec![0xFF, 0, 0, 0, 0, 1, 0, 0, 0]
        );
    }

    #[test]
    fn signed_message_hash_known_vector() {
        assert_eq!(
            signed_message_hash("test"),
            hex!("f16a5da4f510c67ffd3c9ba9bc5295346d5261bb201e3f5c449e79b5bdf5d145")
        );
    }

    #[test]
    fn signed_message_hash_differs_from_plain_dsha256() {
        // The magic wrapping must change the digest.
        assert_ne!(signed_message_hash("test"), dsha256(b"test"));
    }
}
