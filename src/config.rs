//! # Protocol Constants
//!
//! Every magic number in the DigiID core lives here. Version bytes, the
//! signed-message magic, and the compact-signature layout are consensus
//! facts of the DigiByte network; changing any of them silently breaks
//! interoperability with every deployed wallet.

// ---------------------------------------------------------------------------
// Address Version Bytes
// ---------------------------------------------------------------------------

/// DigiByte mainnet P2PKH version byte. Addresses encoded under it start
/// with `D`.
pub const MAINNET_P2PKH_VERSION: u8 = 0x1E;

/// DigiByte mainnet P2SH version byte (multi-sig). Addresses start with `S`.
pub const MAINNET_P2SH_VERSION: u8 = 0x3F;

/// The historical P2SH version byte, shared with Bitcoin. Addresses start
/// with `3`. Still recognized on decode for wallets that predate the `S`
/// migration.
pub const LEGACY_P2SH_VERSION: u8 = 0x05;

/// WIF private keys carry `0x80 + <p2pkh version>` as their Base58Check
/// version byte.
pub const WIF_VERSION_OFFSET: u8 = 0x80;

// ---------------------------------------------------------------------------
// Signed Messages
// ---------------------------------------------------------------------------

/// Magic prefix mixed into every signed-message hash. The leading length
/// byte of this string (25, `0x19`) is serialized before it on the wire.
pub const MESSAGE_MAGIC: &str = "DigiByte Signed Message:\n";

/// A compact signature is `[v][r:32][s:32]`, 65 bytes before base64.
pub const COMPACT_SIGNATURE_LENGTH: usize = 65;

/// Lowest valid recovery byte.
pub const RECOVERY_ID_MIN: u8 = 27;

/// Highest valid recovery byte.
pub const RECOVERY_ID_MAX: u8 = 34;

/// Recovery bytes at or above this value signal that the signer's public
/// key should be rendered in compressed form.
pub const RECOVERY_ID_COMPRESSED: u8 = 31;

// ---------------------------------------------------------------------------
// QR Rendering
// ---------------------------------------------------------------------------

/// Chart endpoint used by the QR helper. Rendering is an external concern;
/// the core only assembles the URL.
pub const QR_CHART_ENDPOINT: &str = "https://chart.googleapis.com/chart";

/// Rendered QR size, `<width>x<height>` pixels.
pub const QR_CHART_SIZE: &str = "300x300";
