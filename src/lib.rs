//! Password-derived, authenticated, URL-safe sealed tokens.
//!
//! [`seal`] turns any serializable value into an `Fe26.2` string that is
//! encrypted, integrity-protected and optionally expiring; [`unseal`] reverses
//! it for holders of the same password. The format interoperates with other
//! implementations of iron.

pub mod crypto;
pub mod error;
pub mod format;
pub mod password;

pub use crate::crypto::Algorithm;
pub use crate::error::{Error, Result};
pub use crate::password::{
    DEFAULT_PASSWORD_ID, Password, RawPassword, Secret, Specific, UnsealPassword,
};

use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::crypto::{KeyOptions, derive_key};
use crate::format::{SealFields, b64};

/// Key derivation parameters for one purpose (encryption or integrity).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SealParams {
    pub algorithm: Algorithm,
    pub iterations: u32,
    pub min_password_length: usize,
    pub salt_bits: usize,
}

impl SealParams {
    pub const DEFAULT_ENCRYPTION: SealParams = SealParams {
        algorithm: Algorithm::Aes256Cbc,
        iterations: 1,
        min_password_length: 32,
        salt_bits: 256,
    };

    pub const DEFAULT_INTEGRITY: SealParams = SealParams {
        algorithm: Algorithm::Sha256,
        iterations: 1,
        min_password_length: 32,
        salt_bits: 256,
    };

    fn key_options(&self, salt: Option<String>, iv: Option<Vec<u8>>) -> KeyOptions {
        KeyOptions {
            algorithm: self.algorithm,
            iterations: self.iterations,
            min_password_length: self.min_password_length,
            salt_bits: self.salt_bits,
            salt,
            iv,
        }
    }
}

/// Options shared by [`seal`] and [`unseal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SealOptions {
    pub encryption: SealParams,
    pub integrity: SealParams,
    /// Lifetime in milliseconds; 0 never expires.
    pub ttl: u64,
    /// Allowed clock skew in seconds when checking expiration.
    ///
    /// 0 selects the 60 second default, -1 disables the tolerance.
    pub timestamp_skew_sec: i64,
    /// Milliseconds added to the local clock.
    pub local_time_offset_ms: i64,
}

impl Default for SealOptions {
    fn default() -> Self {
        Self {
            encryption: SealParams::DEFAULT_ENCRYPTION,
            integrity: SealParams::DEFAULT_INTEGRITY,
            ttl: 0,
            timestamp_skew_sec: format::DEFAULT_SKEW_SEC,
            local_time_offset_ms: 0,
        }
    }
}

/// Current wall clock in milliseconds since the epoch.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Seal `value` with `password`.
pub fn seal<T>(value: &T, password: &RawPassword, options: &SealOptions) -> Result<String>
where
    T: Serialize + ?Sized,
{
    seal_at(value, password, options, now_ms())
}

/// [`seal`] against an explicit clock reading (`clock_ms`, before offset).
pub fn seal_at<T>(
    value: &T,
    password: &RawPassword,
    options: &SealOptions,
    clock_ms: i64,
) -> Result<String>
where
    T: Serialize + ?Sized,
{
    let now = clock_ms.saturating_add(options.local_time_offset_ms);

    let message = serde_json::to_string(value).map_err(Error::MarshallingFailed)?;
    let pass = password::normalise(password)?;

    let key = derive_key(&pass.encryption, &options.encryption.key_options(None, None))?;
    let encrypted = crypto::encrypt(&key, message.as_bytes())?;

    let expiration = match options.ttl {
        0 => None,
        ttl => Some(now.saturating_add(i64::try_from(ttl).unwrap_or(i64::MAX))),
    };

    debug!(
        id = %pass.id,
        encryption = %options.encryption.algorithm,
        expiration,
        "sealing value"
    );

    let fields = SealFields {
        id: pass.id.clone(),
        salt: key.salt().to_string(),
        iv: b64::encode(key.iv()),
        payload: b64::encode(&encrypted),
        expiration,
    };

    fields.build(&pass.integrity, &options.integrity.key_options(None, None))
}

/// Unseal a string produced by [`seal`] back into `T`.
pub fn unseal<T>(sealed: &str, password: &UnsealPassword, options: &SealOptions) -> Result<T>
where
    T: DeserializeOwned,
{
    unseal_at(sealed, password, options, now_ms())
}

/// [`unseal`] against an explicit clock reading (`clock_ms`, before offset).
pub fn unseal_at<T>(
    sealed: &str,
    password: &UnsealPassword,
    options: &SealOptions,
    clock_ms: i64,
) -> Result<T>
where
    T: DeserializeOwned,
{
    let now = clock_ms.saturating_add(options.local_time_offset_ms);

    let parsed = format::parse(sealed, now, options.timestamp_skew_sec)?;
    let pass = password::normalise_unseal(password, &parsed.fields.id)?;

    parsed.verify(&pass.integrity, &options.integrity.key_options(None, None))?;

    let encrypted = b64::decode(&parsed.fields.payload)?;
    let iv = b64::decode(&parsed.fields.iv)?;

    debug!(
        id = %parsed.fields.id,
        payload_len = encrypted.len(),
        "seal verified, decrypting"
    );

    let key_options = options
        .encryption
        .key_options(Some(parsed.fields.salt.clone()), Some(iv));
    let key = derive_key(&pass.encryption, &key_options)?;
    let decrypted = crypto::decrypt(&key, &encrypted)?;

    serde_json::from_slice(&decrypted).map_err(Error::UnmarshallingFailed)
}
