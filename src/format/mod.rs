//! The `Fe26.2` seal wire format.
//!
//! ```text
//! Fe26.2*<id>*<salt>*<iv>*<payload>*<expiration>*<mac-salt>*<mac-digest>
//! ```
//!
//! `iv`, `payload` and `mac-digest` are unpadded base64url; the salts are hex;
//! `expiration` is empty or absolute milliseconds since the epoch.

pub mod b64;
pub mod seal;

pub use seal::{ParsedSeal, SealFields, parse};

/// Literal first field of every seal, identifying the format version.
pub const MAC_PREFIX: &str = "Fe26.2";
/// Field separator.
pub const DELIMITER: char = '*';
/// Number of fields in a complete seal.
pub const FIELD_COUNT: usize = 8;
/// Skew applied when the configured value is 0.
pub const DEFAULT_SKEW_SEC: i64 = 60;
