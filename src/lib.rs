// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # DigiID — challenge-response authentication for DigiByte
//!
//! DigiID lets a user log in to a service by proving control of a DigiByte
//! address instead of typing a password. The flow is three steps:
//!
//! 1. The service mints a [`Challenge`] (a single-use nonce plus its
//!    callback URL) and renders the resulting `digiid://` URI, usually as
//!    a QR code.
//! 2. The user's wallet signs that exact URI with the private key behind
//!    one of their addresses and posts `{address, uri, signature}` to the
//!    callback.
//! 3. The service calls [`signature_valid`]; a `true` answer means the
//!    signer controls the claimed address.
//!
//! This crate is the cryptographic core that makes step 3 possible: a
//! pure big-integer secp256k1 implementation, compact recoverable ECDSA
//! with deterministic nonces, and the key/address codecs (WIF,
//! Base58Check, compressed and uncompressed public keys) that DigiByte
//! wallets speak. It performs no I/O. Nonce storage, replay prevention,
//! and the web plumbing that ferries challenges around belong to the
//! host application.
//!
//! ## Example
//!
//! ```
//! use digiid::{make_challenge, signature_valid};
//!
//! let challenge = make_challenge("736528d0", "https://example.com/auth", true).unwrap();
//! let uri = challenge.uri();
//! assert_eq!(uri, "digiid://example.com/auth?x=736528d0");
//!
//! // The wallet signs `uri` and posts back an address plus signature;
//! // the host then checks:
//! //     signature_valid(&uri, &claimed_address, &signature)
//! ```
//!
//! ## Modules
//!
//! - [`challenge`] — challenge construction, URI emission and validation.
//! - [`crypto`] — hashing, field and curve arithmetic, key codecs, ECDSA.
//! - [`encoding`] — radix conversion and Base58Check.
//! - [`config`] — DigiByte network constants.
//!
//! ## Caveats
//!
//! The arithmetic is not constant-time. Verification only handles public
//! inputs, so that is fine; services that also *sign* at meaningful
//! volume should keep their signing keys on a hardened secp256k1
//! implementation.

pub mod challenge;
pub mod config;
pub mod crypto;
pub mod encoding;

pub use challenge::{make_challenge, signature_valid, Challenge, ChallengeError};
pub use crypto::ecdsa::{
    recover_pubkey, sign_message, verify_message, CompactSignature, SignatureError,
};
pub use crypto::keys::{KeyError, Privkey, PrivkeyFormat, Pubkey, PubkeyFormat};
