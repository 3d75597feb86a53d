use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::kdf::{Algorithm, KeyOptions, derive_key};
use crate::error::{Error, Result};
use crate::format::b64;
use crate::password::Password;

type HmacSha256 = Hmac<Sha256>;

/// Result of [`hmac_with_password`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacDigest {
    /// base64url digest without padding.
    pub digest: String,
    /// Salt the integrity key was derived with.
    pub salt: String,
}

/// HMAC-SHA-256 of `message` under a key derived from `password`.
pub fn hmac_with_password(
    password: &Password,
    options: &KeyOptions,
    message: &str,
) -> Result<MacDigest> {
    let key = derive_key(password, options)?;
    if key.algorithm() != Algorithm::Sha256 {
        return Err(Error::InvalidMacAlgorithm);
    }

    let mut mac =
        <HmacSha256 as Mac>::new_from_slice(key.key()).map_err(|_| Error::CipherCreationFailed)?;
    mac.update(message.as_bytes());

    Ok(MacDigest {
        digest: b64::encode(mac.finalize().into_bytes()),
        salt: key.salt().to_string(),
    })
}

/// Byte comparison whose running time depends only on the input lengths.
pub fn fixed_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
