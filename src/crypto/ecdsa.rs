//! # Compact Recoverable ECDSA
//!
//! Signing and verification in the Bitcoin/Electrum compact-signature
//! convention: 65 bytes `[v][r:32][s:32]`, base64 on the wire. The
//! recovery byte `v` folds three facts into one octet — that it is a
//! recoverable signature (`27..=34`), the parity branch the verifier must
//! take to rebuild the public key, and whether that key should be rendered
//! compressed (`v ≥ 31`).
//!
//! Nonces are deterministic (RFC 6979 over HMAC-SHA256), so a given key
//! and message always produce the same signature and no signing-time
//! randomness can leak the key. Produced signatures are low-S normalized.
//!
//! Signing re-verifies its own output before releasing it; a signature
//! that fails the self-check is withheld and reported as an internal
//! error.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};
use thiserror::Error;
use tracing::debug;
use zeroize::Zeroize;

use crate::config;
use crate::crypto::curve::{AffinePoint, CURVE_B, G, N, P};
use crate::crypto::field::{inv, modulo, pow_mod};
use crate::crypto::hash::{hmac_sha256, signed_message_hash};
use crate::crypto::keys::{
    is_address_like, scalar_to_bytes32, KeyError, Privkey, Pubkey, PubkeyFormat,
};
use crate::encoding::base58check;

/// Errors from signature handling.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("compact signature must be 65 bytes, got {0}")]
    InvalidLength(usize),

    #[error("recovery byte {0} outside [27, 34]")]
    InvalidRecoveryId(u8),

    #[error("r and s must be nonzero modulo the group order")]
    ZeroScalar,

    #[error("r and s must be non-negative 256-bit integers")]
    ComponentOutOfRange,

    #[error("signature does not resolve to a curve point")]
    NotRecoverable,

    #[error("produced signature failed self-verification")]
    SelfCheckFailed,

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error(transparent)]
    Key(#[from] KeyError),
}

/// A recoverable signature `(v, r, s)` with `v ∈ [27, 34]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactSignature {
    v: u8,
    r: BigInt,
    s: BigInt,
}

impl CompactSignature {
    /// Assembles a signature, rejecting recovery bytes outside `[27, 34]`
    /// and components that cannot serialize into 32 bytes.
    pub fn new(v: u8, r: BigInt, s: BigInt) -> Result<Self, SignatureError> {
        if !(config::RECOVERY_ID_MIN..=config::RECOVERY_ID_MAX).contains(&v) {
            return Err(SignatureError::InvalidRecoveryId(v));
        }
        if r.sign() == Sign::Minus || s.sign() == Sign::Minus || r.bits() > 256 || s.bits() > 256 {
            return Err(SignatureError::ComponentOutOfRange);
        }
        Ok(Self { v, r, s })
    }

    pub fn v(&self) -> u8 {
        self.v
    }

    pub fn r(&self) -> &BigInt {
        &self.r
    }

    pub fn s(&self) -> &BigInt {
        &self.s
    }

    /// Whether the signer's public key should be rendered compressed.
    pub fn signals_compressed(&self) -> bool {
        self.v >= config::RECOVERY_ID_COMPRESSED
    }

    /// The 65-byte wire layout `[v][r:32][s:32]`.
    pub fn to_bytes(&self) -> [u8; config::COMPACT_SIGNATURE_LENGTH] {
        let mut out = [0u8; config::COMPACT_SIGNATURE_LENGTH];
        out[0] = self.v;
        out[1..33].copy_from_slice(&scalar_to_bytes32(&self.r));
        out[33..].copy_from_slice(&scalar_to_bytes32(&self.s));
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != config::COMPACT_SIGNATURE_LENGTH {
            return Err(SignatureError::InvalidLength(bytes.len()));
        }
        Self::new(
            bytes[0],
            BigInt::from_bytes_be(Sign::Plus, &bytes[1..33]),
            BigInt::from_bytes_be(Sign::Plus, &bytes[33..]),
        )
    }

    /// Standard base64 of [`to_bytes`](Self::to_bytes).
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.to_bytes())
    }

    pub fn from_base64(text: &str) -> Result<Self, SignatureError> {
        Self::from_bytes(&BASE64.decode(text)?)
    }
}

fn hash_to_int(msg_hash: &[u8; 32]) -> BigInt {
    BigInt::from_bytes_be(Sign::Plus, msg_hash)
}

/// RFC 6979 deterministic nonce over HMAC-SHA256.
///
/// Candidates outside `[1, n)` reseed the DRBG and retry. The retry
/// branch fires with probability ≈ 2⁻¹²⁸, so outputs coincide with
/// implementations that use the first HMAC block unconditionally.
pub fn deterministic_k(msg_hash: &[u8; 32], secret: &BigInt) -> BigInt {
    let mut v = [0x01u8; 32];
    let mut k = [0x00u8; 32];
    let mut secret32 = scalar_to_bytes32(secret);

    let mut seed = Vec::with_capacity(97);
    seed.extend_from_slice(&v);
    seed.push(0x00);
    seed.extend_from_slice(&secret32);
    seed.extend_from_slice(msg_hash);
    k = hmac_sha256(&k, &seed);
    v = hmac_sha256(&k, &v);

    seed.clear();
    seed.extend_from_slice(&v);
    seed.push(0x01);
    seed.extend_from_slice(&secret32);
    seed.extend_from_slice(msg_hash);
    k = hmac_sha256(&k, &seed);
    v = hmac_sha256(&k, &v);

    secret32.zeroize();
    seed.zeroize();

    loop {
        v = hmac_sha256(&k, &v);
        let candidate = BigInt::from_bytes_be(Sign::Plus, &v);
        if candidate.sign() == Sign::Plus && candidate < *N {
            return candidate;
        }
        let mut reseed = Vec::with_capacity(33);
        reseed.extend_from_slice(&v);
        reseed.push(0x00);
        k = hmac_sha256(&k, &reseed);
        v = hmac_sha256(&k, &v);
    }
}

/// Signs a 32-byte digest, producing a low-S compact signature.
///
/// The recovery byte starts at 27, gains the parity of the nonce point's
/// `y` XOR-ed with the high-S flag, and gains 4 when the private key's
/// format advertises a compressed public key.
pub fn raw_sign(msg_hash: &[u8; 32], key: &Privkey) -> Result<CompactSignature, SignatureError> {
    let z = hash_to_int(msg_hash);
    let nonce = deterministic_k(msg_hash, key.scalar());
    let point = G.to_jacobian().mul(&nonce).to_affine();
    let r = point.x.clone();
    let s = modulo(&(inv(&nonce, &N) * (&z + &r * key.scalar())), &N);
    if r.is_zero() || s.is_zero() {
        return Err(SignatureError::ZeroScalar);
    }

    let high_s = (&s << 1usize) >= *N;
    let parity = if point.y.is_odd() { 1u8 } else { 0 };
    let mut v = 27 + (parity ^ u8::from(high_s));
    let s = if high_s { &*N - &s } else { s };
    if key.is_compressed() {
        v += 4;
    }
    CompactSignature::new(v, r, s)
}

/// Signs a text message: digest with the network magic, sign, self-verify,
/// and emit base64. A failed self-check withholds the signature.
pub fn sign_message(message: &str, key: &Privkey) -> Result<String, SignatureError> {
    let hash = signed_message_hash(message);
    let signature = raw_sign(&hash, key)?;
    if !raw_verify(&hash, &signature, key.to_pubkey().point()) {
        return Err(SignatureError::SelfCheckFailed);
    }
    Ok(signature.to_base64())
}

/// Verifies `(v, r, s)` over a 32-byte digest against a known public key.
pub fn raw_verify(msg_hash: &[u8; 32], signature: &CompactSignature, pubkey: &AffinePoint) -> bool {
    if !(config::RECOVERY_ID_MIN..=config::RECOVERY_ID_MAX).contains(&signature.v) {
        return false;
    }
    let r = modulo(&signature.r, &N);
    let s = modulo(&signature.s, &N);
    if r.is_zero() || s.is_zero() {
        return false;
    }
    let z = hash_to_int(msg_hash);
    let w = inv(&s, &N);
    let u1 = modulo(&(&z * &w), &N);
    let u2 = modulo(&(&r * &w), &N);
    let combined = G
        .to_jacobian()
        .mul(&u1)
        .add(&pubkey.to_jacobian().mul(&u2))
        .to_affine();
    combined.x == signature.r
}

/// Recovers the signing public key from `(v, r, s)` and the digest.
///
/// `x = r` throughout; the second recovery candidate `x = r + n` admitted
/// by ECDSA when `r` overflows the group order is not attempted, matching
/// the deployed wallet convention.
pub fn raw_recover(
    msg_hash: &[u8; 32],
    signature: &CompactSignature,
) -> Result<AffinePoint, SignatureError> {
    let CompactSignature { v, r, s } = signature;
    if !(config::RECOVERY_ID_MIN..=config::RECOVERY_ID_MAX).contains(v) {
        return Err(SignatureError::InvalidRecoveryId(*v));
    }
    if modulo(r, &N).is_zero() || modulo(s, &N).is_zero() {
        return Err(SignatureError::ZeroScalar);
    }

    let x = r.clone();
    let alpha = modulo(&(&x * &x * &x + BigInt::from(CURVE_B)), &P);
    let exp = (&*P + BigInt::one()) >> 2usize;
    let beta = pow_mod(&alpha, &exp, &P);
    let takes_beta = ((*v & 1) == 1) != beta.is_odd();
    let y = if takes_beta { beta.clone() } else { &*P - &beta };
    if !modulo(&(&alpha - &y * &y), &P).is_zero() {
        return Err(SignatureError::NotRecoverable);
    }

    let z = hash_to_int(msg_hash);
    let minus_z_g = G.to_jacobian().mul(&modulo(&-&z, &N));
    let s_point = AffinePoint::new(x, y).to_jacobian().mul(s);
    let q = minus_z_g.add(&s_point).mul(&inv(r, &N));
    Ok(q.to_affine())
}

/// Recovers the signer's public key from a base64 compact signature over a
/// text message. The hex rendering follows the recovery byte: compressed
/// for `v ≥ 31`.
pub fn recover_pubkey(message: &str, signature_b64: &str) -> Result<Pubkey, SignatureError> {
    let signature = CompactSignature::from_base64(signature_b64)?;
    let hash = signed_message_hash(message);
    let point = raw_recover(&hash, &signature)?;
    let format = if signature.signals_compressed() {
        PubkeyFormat::HexCompressed
    } else {
        PubkeyFormat::Hex
    };
    Ok(Pubkey::new(point, format)?)
}

/// Verifies a message signature against an address: recovers the key and
/// accepts when either its compressed or uncompressed address under the
/// claimed address's own version byte matches.
pub fn verify_with_address(message: &str, signature_b64: &str, address: &str) -> bool {
    let Ok(version) = base58check::version_byte(address) else {
        debug!(address, "claimed address does not decode");
        return false;
    };
    let Ok(signature) = CompactSignature::from_base64(signature_b64) else {
        return false;
    };
    let hash = signed_message_hash(message);
    let Ok(point) = raw_recover(&hash, &signature) else {
        debug!("no public key recoverable from signature");
        return false;
    };
    let Ok(uncompressed) = Pubkey::new(point, PubkeyFormat::Bin) else {
        return false;
    };
    let compressed = uncompressed.clone().with_format(PubkeyFormat::BinCompressed);
    let version = version as u32;
    uncompressed.address(version) == address || compressed.address(version) == address
}

/// Verifies against either an address or a hex public key, dispatching on
/// the shape of `key_or_address`.
pub fn verify_message(message: &str, signature_b64: &str, key_or_address: &str) -> bool {
    if is_address_like(key_or_address) {
        return verify_with_address(message, signature_b64, key_or_address);
    }
    let Ok(pubkey) = Pubkey::from_hex_str(key_or_address) else {
        return false;
    };
    let Ok(signature) = CompactSignature::from_base64(signature_b64) else {
        return false;
    };
    raw_verify(&signed_message_hash(message), &signature, pubkey.point())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::PrivkeyFormat;
    use hex_literal::hex;

    const D_HEX: &str = "1e99423a4ed27608a15a2616a2b0e9e52ced330ac530edcc32c8ffc6a526aedd";
    const URI: &str = "digiid://example.com/cb?x=abc123";
    const SIG_B64: &str =
        "H/Fc1HHSrN0qwej4vMBq5dmValeKpLMKIGJX5MhKaACDOWd9xdsciKwZtK8xZJJKhjKZATlTrcpVmwZMnfGG+DE=";

    fn compressed_key() -> Privkey {
        Privkey::decode(D_HEX)
            .unwrap()
            .with_format(PrivkeyFormat::HexCompressed)
    }

    #[test]
    fn deterministic_k_known_vector() {
        let hash = signed_message_hash(URI);
        assert_eq!(
            hash,
            hex!("2f2483bb72b52e82c90df1150dd9b4955e9b9c3f86a4397357c8b1a05e417d15")
        );
        let k = deterministic_k(&hash, compressed_key().scalar());
        assert_eq!(
            scalar_to_bytes32(&k),
            hex!("aa4a03bec6d3aed5a25abf5fe1ab49ce4da6045cd5fa3e285592d5e80613a914")
        );
    }

    #[test]
    fn sign_matches_known_vector() {
        let signature = sign_message(URI, &compressed_key()).unwrap();
        assert_eq!(signature, SIG_B64);
    }

    #[test]
    fn raw_sign_components_match_known_vector() {
        let hash = signed_message_hash(URI);
        let sig = raw_sign(&hash, &compressed_key()).unwrap();
        assert_eq!(sig.v, 31);
        assert_eq!(
            scalar_to_bytes32(&sig.r),
            hex!("f15cd471d2acdd2ac1e8f8bcc06ae5d9956a578aa4b30a206257e4c84a680083")
        );
        assert_eq!(
            scalar_to_bytes32(&sig.s),
            hex!("39677dc5db1c88ac19b4af3164924a863299013953adca559b064c9df186f831")
        );
    }

    #[test]
    fn signing_is_deterministic() {
        let key = compressed_key();
        assert_eq!(
            sign_message("determinism", &key).unwrap(),
            sign_message("determinism", &key).unwrap()
        );
    }

    #[test]
    fn produced_signatures_are_low_s() {
        for message in ["a", "b", "c", "low-s check", URI] {
            let hash = signed_message_hash(message);
            let sig = raw_sign(&hash, &compressed_key()).unwrap();
            assert!((&sig.s << 1usize) < *N, "message {message:?}");
        }
    }

    #[test]
    fn uncompressed_key_lowers_recovery_byte() {
        let key = Privkey::decode(D_HEX).unwrap();
        let hash = signed_message_hash(URI);
        let sig = raw_sign(&hash, &key).unwrap();
        assert!(sig.v < config::RECOVERY_ID_COMPRESSED);
        assert!(!sig.signals_compressed());
    }

    #[test]
    fn compact_round_trips_through_base64() {
        let sig = CompactSignature::from_base64(SIG_B64).unwrap();
        assert_eq!(sig.v, 31);
        assert!(sig.signals_compressed());
        assert_eq!(sig.to_base64(), SIG_B64);

        let bytes = sig.to_bytes();
        assert_eq!(bytes.len(), 65);
        assert_eq!(CompactSignature::from_bytes(&bytes).unwrap(), sig);
    }

    #[test]
    fn malformed_compact_inputs_are_rejected() {
        assert!(matches!(
            CompactSignature::from_bytes(&[0u8; 64]),
            Err(SignatureError::InvalidLength(64))
        ));
        let mut bytes = [0u8; 65];
        bytes[0] = 26;
        assert!(matches!(
            CompactSignature::from_bytes(&bytes),
            Err(SignatureError::InvalidRecoveryId(26))
        ));
        bytes[0] = 35;
        assert!(CompactSignature::from_bytes(&bytes).is_err());
        assert!(CompactSignature::from_base64("@@not-base64@@").is_err());
    }

    #[test]
    fn verify_accepts_and_rejects() {
        let key = compressed_key();
        let pubkey = key.to_pubkey();
        let hash = signed_message_hash(URI);
        let sig = raw_sign(&hash, &key).unwrap();
        assert!(raw_verify(&hash, &sig, pubkey.point()));

        let other_hash = signed_message_hash("tampered");
        assert!(!raw_verify(&other_hash, &sig, pubkey.point()));

        let other_key = Privkey::generate();
        assert!(!raw_verify(&hash, &sig, other_key.to_pubkey().point()));
    }

    #[test]
    fn zero_components_never_verify() {
        let pubkey = compressed_key().to_pubkey();
        let hash = signed_message_hash(URI);
        let sig = CompactSignature {
            v: 27,
            r: BigInt::zero(),
            s: BigInt::one(),
        };
        assert!(!raw_verify(&hash, &sig, pubkey.point()));
        assert!(raw_recover(&hash, &sig).is_err());
    }

    #[test]
    fn recover_returns_signing_key() {
        let recovered = recover_pubkey(URI, SIG_B64).unwrap();
        assert_eq!(recovered.format(), PubkeyFormat::HexCompressed);
        assert_eq!(
            recovered.to_hex(),
            "03f028892bad7ed57d2fb57bf33081d5cfcf6f9ed3d3d7f159c2e2fff579dc341a"
        );
    }

    #[test]
    fn recover_matches_derived_pubkey_for_fresh_keys() {
        for _ in 0..3 {
            let key = Privkey::generate().with_format(PrivkeyFormat::HexCompressed);
            let signature = sign_message(URI, &key).unwrap();
            let recovered = recover_pubkey(URI, &signature).unwrap();
            assert_eq!(recovered.point(), key.to_pubkey().point());
            assert_eq!(recovered.to_hex(), key.to_pubkey().to_hex());
        }
    }

    #[test]
    fn verify_with_address_accepts_both_encodings() {
        assert!(verify_with_address(
            URI,
            SIG_B64,
            "DNFsAw2VtpskpEZ9NY2i4FfuzobeBaxqMm"
        ));

        // The same key signing uncompressed authenticates its other address.
        let key = Privkey::decode(D_HEX).unwrap();
        let signature = sign_message(URI, &key).unwrap();
        assert!(verify_with_address(
            URI,
            &signature,
            "D8A9jHBhtc3bFdZLU3U7kMeZoEAsNRsUeg"
        ));
    }

    #[test]
    fn verify_with_wrong_address_fails() {
        let other = Privkey::generate()
            .with_format(PrivkeyFormat::HexCompressed)
            .to_pubkey()
            .address(0x1E);
        assert!(!verify_with_address(URI, SIG_B64, &other));
        assert!(!verify_with_address(URI, SIG_B64, "not an address"));
    }

    #[test]
    fn verify_message_dispatches_on_shape() {
        // Address path.
        assert!(verify_message(
            URI,
            SIG_B64,
            "DNFsAw2VtpskpEZ9NY2i4FfuzobeBaxqMm"
        ));
        // Raw pubkey path.
        assert!(verify_message(
            URI,
            SIG_B64,
            "03f028892bad7ed57d2fb57bf33081d5cfcf6f9ed3d3d7f159c2e2fff579dc341a"
        ));
        // Garbage key material.
        assert!(!verify_message(URI, SIG_B64, "zz"));
    }
}
