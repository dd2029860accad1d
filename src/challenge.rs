//! # DigiID Challenges
//!
//! The protocol layer that ties the cryptographic core together. A service
//! mints a [`Challenge`] from a nonce and its callback URL, shows the
//! resulting `digiid://` URI to the user (usually as a QR code), and the
//! wallet posts back a claimed address plus a compact signature over that
//! exact URI. [`signature_valid`] decides whether the signature proves
//! control of the address.
//!
//! Nonce storage and replay prevention belong to the host. Nonces must be
//! single-use; this layer treats them as opaque strings.
//!
//! ## URI shape
//!
//! ```text
//! digiid://<host><path>?x=<nonce>[&u=1]
//! ```
//!
//! `u=1` marks an insecure (HTTP) callback; its absence implies HTTPS.
//! Emission is canonical with `x` first. Validation parses both sides and
//! ignores query order, so a wallet that reorders parameters still
//! authenticates.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::{form_urlencoded, Url};

use crate::config;
use crate::crypto::ecdsa::{self, CompactSignature};
use crate::crypto::hash::signed_message_hash;
use crate::crypto::keys::{Pubkey, PubkeyFormat};

/// Errors from challenge construction.
#[derive(Debug, Error)]
pub enum ChallengeError {
    #[error("callback is not a valid URL: {0}")]
    InvalidCallback(#[from] url::ParseError),

    #[error("callback URL has no host")]
    MissingHost,
}

/// An authentication challenge: a nonce, the service callback, and whether
/// the callback is served over HTTPS. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    nonce: String,
    callback: Url,
    secure: bool,
}

impl Challenge {
    /// Builds a challenge around an already-parsed callback. The callback
    /// must carry a host; its scheme is replaced by `digiid` on emission.
    pub fn new(
        nonce: impl Into<String>,
        callback: Url,
        secure: bool,
    ) -> Result<Self, ChallengeError> {
        if callback.host_str().is_none() {
            return Err(ChallengeError::MissingHost);
        }
        Ok(Self {
            nonce: nonce.into(),
            callback,
            secure,
        })
    }

    /// Builds a challenge from a textual callback URL.
    pub fn from_parts(nonce: &str, callback: &str, secure: bool) -> Result<Self, ChallengeError> {
        Self::new(nonce, Url::parse(callback)?, secure)
    }

    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    pub fn callback(&self) -> &Url {
        &self.callback
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// The challenge URI the wallet signs.
    pub fn uri(&self) -> String {
        let host = self.callback.host_str().unwrap_or_default();
        let authority = match self.callback.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("x", &self.nonce);
        if !self.secure {
            query.append_pair("u", "1");
        }
        format!(
            "digiid://{}{}?{}",
            authority,
            self.callback.path(),
            query.finish()
        )
    }

    /// A chart URL rendering the challenge URI as a QR code. Rendering is
    /// an external service; only the URL is assembled here.
    pub fn qr_url(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("chs", config::QR_CHART_SIZE);
        query.append_pair("cht", "qr");
        query.append_pair("chl", &self.uri());
        format!("{}?{}", config::QR_CHART_ENDPOINT, query.finish())
    }

    /// Whether a presented URI is this challenge's URI. Both sides are
    /// parsed; scheme, host, port, and path must match exactly, the query
    /// is compared as an unordered multiset.
    pub fn matches_uri(&self, uri: &str) -> bool {
        let Ok(expected) = Url::parse(&self.uri()) else {
            return false;
        };
        let Ok(candidate) = Url::parse(uri) else {
            debug!(uri, "presented URI does not parse");
            return false;
        };
        if candidate.scheme() != expected.scheme()
            || candidate.host_str() != expected.host_str()
            || candidate.port() != expected.port()
            || candidate.path() != expected.path()
        {
            return false;
        }
        let mut expected_pairs: Vec<(String, String)> =
            expected.query_pairs().into_owned().collect();
        let mut candidate_pairs: Vec<(String, String)> =
            candidate.query_pairs().into_owned().collect();
        expected_pairs.sort();
        candidate_pairs.sort();
        expected_pairs == candidate_pairs
    }
}

/// Builds a challenge from its parts. Thin alias for hosts that prefer a
/// free function over the constructor.
pub fn make_challenge(
    nonce: &str,
    callback: &str,
    secure: bool,
) -> Result<Challenge, ChallengeError> {
    Challenge::from_parts(nonce, callback, secure)
}

/// Decides whether `signature` authenticates `address` for `uri`.
///
/// The signer's public key is recovered from the signature (compressed
/// when the recovery byte says so), its mainnet P2PKH address is derived,
/// and the claimed address must match before the signature itself is
/// verified. Malformed input of any kind yields `false`, never an error.
pub fn signature_valid(uri: &str, address: &str, signature: &str) -> bool {
    let Ok(sig) = CompactSignature::from_base64(signature) else {
        debug!("signature is not base64 compact form");
        return false;
    };
    let hash = signed_message_hash(uri);
    let Ok(point) = ecdsa::raw_recover(&hash, &sig) else {
        debug!("no public key recoverable from signature");
        return false;
    };
    let format = if sig.signals_compressed() {
        PubkeyFormat::BinCompressed
    } else {
        PubkeyFormat::Bin
    };
    let Ok(pubkey) = Pubkey::new(point, format) else {
        return false;
    };
    let recovered = pubkey.address(config::MAINNET_P2PKH_VERSION as u32);
    if recovered != address {
        debug!(%recovered, claimed = %address, "recovered address does not match claim");
        return false;
    }
    ecdsa::verify_message(uri, signature, address)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secure_challenge() -> Challenge {
        Challenge::from_parts("abc123", "https://example.com/cb", true).unwrap()
    }

    #[test]
    fn emits_secure_uri() {
        assert_eq!(secure_challenge().uri(), "digiid://example.com/cb?x=abc123");
    }

    #[test]
    fn emits_insecure_uri_with_marker() {
        let challenge = Challenge::from_parts("abc123", "http://example.com/cb", false).unwrap();
        assert_eq!(challenge.uri(), "digiid://example.com/cb?x=abc123&u=1");
    }

    #[test]
    fn keeps_explicit_port() {
        let challenge = Challenge::from_parts("n", "https://example.com:8443/auth", true).unwrap();
        assert_eq!(challenge.uri(), "digiid://example.com:8443/auth?x=n");
    }

    #[test]
    fn nonce_is_percent_encoded() {
        let challenge = Challenge::from_parts("a b&c", "https://example.com/cb", true).unwrap();
        assert_eq!(challenge.uri(), "digiid://example.com/cb?x=a+b%26c");
    }

    #[test]
    fn callback_without_host_is_rejected() {
        assert!(matches!(
            Challenge::from_parts("n", "mailto:user@example.com", true),
            Err(ChallengeError::MissingHost)
        ));
        assert!(Challenge::from_parts("n", "not a url", true).is_err());
    }

    #[test]
    fn matches_its_own_uri() {
        let challenge = secure_challenge();
        assert!(challenge.matches_uri(&challenge.uri()));
    }

    #[test]
    fn matches_reordered_query() {
        let challenge = Challenge::from_parts("abc123", "http://example.com/cb", false).unwrap();
        assert!(challenge.matches_uri("digiid://example.com/cb?u=1&x=abc123"));
    }

    #[test]
    fn rejects_foreign_uris() {
        let challenge = secure_challenge();
        assert!(!challenge.matches_uri("digiid://example.com/cb?x=other"));
        assert!(!challenge.matches_uri("digiid://evil.example/cb?x=abc123"));
        assert!(!challenge.matches_uri("https://example.com/cb?x=abc123"));
        assert!(!challenge.matches_uri("digiid://example.com/other?x=abc123"));
        assert!(!challenge.matches_uri("not a uri"));
    }

    #[test]
    fn qr_url_embeds_the_uri() {
        let qr = secure_challenge().qr_url();
        assert!(qr.starts_with(config::QR_CHART_ENDPOINT));
        assert!(qr.contains("cht=qr"));
        assert!(qr.contains("digiid%3A%2F%2Fexample.com%2Fcb%3Fx%3Dabc123"));
    }

    #[test]
    fn challenge_serde_round_trips() {
        let challenge = secure_challenge();
        let json = serde_json::to_string(&challenge).unwrap();
        let back: Challenge = serde_json::from_str(&json).unwrap();
        assert_eq!(back, challenge);
    }
}
