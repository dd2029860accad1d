//! # Encodings
//!
//! Radix conversion and Base58Check. These are the textual substrate under
//! every key and address format in the crate: WIF, addresses, and the raw
//! integer plumbing all route through here.

pub mod base;
pub mod base58check;

pub use base::{changebase, decode, encode, Base, BaseCodecError, Digits};
pub use base58check::{b58check_to_bin, bin_to_b58check, version_byte, Base58CheckError};
