use tracing::{debug, trace};

use super::{DEFAULT_SKEW_SEC, DELIMITER, FIELD_COUNT, MAC_PREFIX};
use crate::crypto::{KeyOptions, fixed_time_eq, hmac_with_password};
use crate::error::{Error, Result};
use crate::password::Password;

/// The authenticated part of a seal (everything before the MAC fields).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SealFields {
    pub id: String,
    /// Hex salt of the encryption key.
    pub salt: String,
    /// base64url IV.
    pub iv: String,
    /// base64url ciphertext.
    pub payload: String,
    /// Absolute expiry in milliseconds since the epoch.
    pub expiration: Option<i64>,
}

impl SealFields {
    /// `Fe26.2*id*salt*iv*payload*expiration`, the string the MAC covers.
    pub fn mac_base(&self) -> String {
        let expiration = self
            .expiration
            .map(|exp| exp.to_string())
            .unwrap_or_default();

        format!(
            "{MAC_PREFIX}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{expiration}",
            self.id, self.salt, self.iv, self.payload
        )
    }

    /// Authenticate the fields and return the complete seal string.
    pub fn build(&self, password: &Password, options: &KeyOptions) -> Result<String> {
        let base = self.mac_base();
        let mac = hmac_with_password(password, options, &base)?;

        Ok(format!(
            "{base}{DELIMITER}{}{DELIMITER}{}",
            mac.salt, mac.digest
        ))
    }
}

/// A seal split into its fields, not yet authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSeal {
    pub fields: SealFields,
    pub mac_salt: String,
    pub mac_digest: String,
}

impl ParsedSeal {
    /// Recompute the MAC with the seal's own mac-salt and compare in fixed time.
    pub fn verify(&self, password: &Password, options: &KeyOptions) -> Result<()> {
        let options = KeyOptions {
            salt: Some(self.mac_salt.clone()),
            ..options.clone()
        };
        let mac = hmac_with_password(password, &options, &self.fields.mac_base())?;

        if !fixed_time_eq(mac.digest.as_bytes(), self.mac_digest.as_bytes()) {
            debug!(id = %self.fields.id, "seal hmac mismatch");
            return Err(Error::BadSealHmac);
        }
        Ok(())
    }
}

/// Tolerance in milliseconds: `0` means the default, `-1` disables it.
pub fn skew_millis(timestamp_skew_sec: i64) -> i64 {
    let seconds = match timestamp_skew_sec {
        0 => DEFAULT_SKEW_SEC,
        -1 => 0,
        other => other,
    };
    seconds.saturating_mul(1000)
}

/// Split a seal and check its prefix and expiration against `now_ms`.
pub fn parse(sealed: &str, now_ms: i64, timestamp_skew_sec: i64) -> Result<ParsedSeal> {
    let parts: Vec<&str> = sealed.split(DELIMITER).collect();
    if parts.len() != FIELD_COUNT {
        trace!(fields = parts.len(), "wrong number of seal fields");
        return Err(Error::InvalidSeal);
    }
    if parts[0] != MAC_PREFIX {
        return Err(Error::InvalidSeal);
    }

    let expiration = match parts[5] {
        "" => None,
        raw => {
            let exp: i64 = raw.parse().map_err(|_| Error::InvalidSeal)?;
            if exp <= now_ms.saturating_sub(skew_millis(timestamp_skew_sec)) {
                debug!(expiration = exp, now = now_ms, "seal expired");
                return Err(Error::ExpiredSeal);
            }
            Some(exp)
        }
    };

    Ok(ParsedSeal {
        fields: SealFields {
            id: parts[1].to_string(),
            salt: parts[2].to_string(),
            iv: parts[3].to_string(),
            payload: parts[4].to_string(),
            expiration,
        },
        mac_salt: parts[6].to_string(),
        mac_digest: parts[7].to_string(),
    })
}
