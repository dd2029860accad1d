//! # Cryptographic Core
//!
//! Everything needed to verify a DigiID login lives under this module:
//!
//! - **hash** — SHA-256, RIPEMD-160, HMAC, and the DigiByte signed-message
//!   digest. Thin wrappers over the RustCrypto implementations.
//! - **field** — modular arithmetic over the secp256k1 prime and order.
//! - **curve** — secp256k1 point arithmetic in affine and Jacobian form.
//! - **keys** — public/private key formats, WIF, and address derivation.
//! - **ecdsa** — compact recoverable signatures: sign, verify, recover.
//!
//! The arithmetic here is deliberately plain big-integer math. It is not
//! constant-time; verification operates on public inputs, and hosts that
//! sign at scale should move signing onto a hardened secp256k1 backend.

pub mod curve;
pub mod ecdsa;
pub mod field;
pub mod hash;
pub mod keys;

pub use ecdsa::{sign_message, verify_message, CompactSignature, SignatureError};
pub use hash::{dsha256, hash160, hmac_sha256, ripemd160, sha256, signed_message_hash};
pub use keys::{Privkey, PrivkeyFormat, Pubkey, PubkeyFormat};
