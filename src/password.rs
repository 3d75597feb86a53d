//! Password shapes accepted by seal and unseal, and their normalisation.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;
use unicode_general_category::{GeneralCategory, get_general_category};
use zeroize::Zeroize;

use crate::error::{Error, Result};

/// Map key consulted when no entry matches a seal's password id.
pub const DEFAULT_PASSWORD_ID: &str = "default";

/// A password given as text (run through PBKDF2) or as a raw key buffer.
#[derive(Clone, PartialEq, Eq)]
pub enum Password {
    Text(String),
    Bytes(Vec<u8>),
}

impl Password {
    pub fn is_empty(&self) -> bool {
        match self {
            Password::Text(text) => text.is_empty(),
            Password::Bytes(bytes) => bytes.is_empty(),
        }
    }
}

impl Drop for Password {
    fn drop(&mut self) {
        match self {
            Password::Text(text) => text.zeroize(),
            Password::Bytes(bytes) => bytes.zeroize(),
        }
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Password::Text(_) => f.write_str("Password::Text(<redacted>)"),
            Password::Bytes(_) => f.write_str("Password::Bytes(<redacted>)"),
        }
    }
}

impl From<&str> for Password {
    fn from(text: &str) -> Self {
        Password::Text(text.to_string())
    }
}

impl From<String> for Password {
    fn from(text: String) -> Self {
        Password::Text(text)
    }
}

impl From<Vec<u8>> for Password {
    fn from(bytes: Vec<u8>) -> Self {
        Password::Bytes(bytes)
    }
}

impl From<&[u8]> for Password {
    fn from(bytes: &[u8]) -> Self {
        Password::Bytes(bytes.to_vec())
    }
}

/// A password tagged with an id, used for both encryption and integrity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secret {
    pub id: String,
    pub secret: Password,
}

/// Separate encryption and integrity passwords tagged with an id.
///
/// This is also the normalised form every other shape resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specific {
    pub id: String,
    pub encryption: Password,
    pub integrity: Password,
}

/// The password shapes accepted when sealing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawPassword {
    Bare(Password),
    Secret(Secret),
    Specific(Specific),
}

impl From<Password> for RawPassword {
    fn from(password: Password) -> Self {
        RawPassword::Bare(password)
    }
}

impl From<&str> for RawPassword {
    fn from(text: &str) -> Self {
        RawPassword::Bare(Password::from(text))
    }
}

impl From<String> for RawPassword {
    fn from(text: String) -> Self {
        RawPassword::Bare(Password::from(text))
    }
}

impl From<Secret> for RawPassword {
    fn from(secret: Secret) -> Self {
        RawPassword::Secret(secret)
    }
}

impl From<Specific> for RawPassword {
    fn from(specific: Specific) -> Self {
        RawPassword::Specific(specific)
    }
}

/// The password shapes accepted when unsealing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsealPassword {
    /// Used regardless of the id carried by the seal.
    Bare(Password),
    /// Looked up by the seal's id, falling back to [`DEFAULT_PASSWORD_ID`].
    ById(HashMap<String, RawPassword>),
}

impl From<Password> for UnsealPassword {
    fn from(password: Password) -> Self {
        UnsealPassword::Bare(password)
    }
}

impl From<&str> for UnsealPassword {
    fn from(text: &str) -> Self {
        UnsealPassword::Bare(Password::from(text))
    }
}

impl From<String> for UnsealPassword {
    fn from(text: String) -> Self {
        UnsealPassword::Bare(Password::from(text))
    }
}

impl From<HashMap<String, RawPassword>> for UnsealPassword {
    fn from(map: HashMap<String, RawPassword>) -> Self {
        UnsealPassword::ById(map)
    }
}

fn resolve(raw: &RawPassword) -> Result<Specific> {
    match raw {
        RawPassword::Bare(password) if !password.is_empty() => Ok(Specific {
            id: String::new(),
            encryption: password.clone(),
            integrity: password.clone(),
        }),
        RawPassword::Secret(secret) if !secret.secret.is_empty() => Ok(Specific {
            id: secret.id.clone(),
            encryption: secret.secret.clone(),
            integrity: secret.secret.clone(),
        }),
        RawPassword::Specific(specific)
            if !specific.encryption.is_empty() && !specific.integrity.is_empty() =>
        {
            Ok(specific.clone())
        }
        _ => Err(Error::PasswordRequired),
    }
}

/// Ids share the `*`-delimited wire format, so only letters are allowed.
fn validate_id(id: &str) -> Result<()> {
    if !id.chars().all(is_letter) {
        return Err(Error::PasswordInvalid);
    }
    Ok(())
}

// Unicode general category L only; letter numbers and marks are refused.
fn is_letter(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
    )
}

/// Resolve a seal-time password into its id, encryption and integrity parts.
pub fn normalise(raw: &RawPassword) -> Result<Specific> {
    let resolved = resolve(raw)?;
    validate_id(&resolved.id)?;
    Ok(resolved)
}

/// Resolve the password to unseal a seal carrying `password_id`.
///
/// Lookup order is the exact id, then `"default"`.
pub fn normalise_unseal(raw: &UnsealPassword, password_id: &str) -> Result<Specific> {
    match raw {
        UnsealPassword::Bare(password) => normalise(&RawPassword::Bare(password.clone())),
        UnsealPassword::ById(map) => {
            let found = match map.get(password_id) {
                Some(found) => found,
                None => {
                    debug!(id = password_id, "no password for id, trying default");
                    map.get(DEFAULT_PASSWORD_ID)
                        .ok_or(Error::PasswordRequired)?
                }
            };
            normalise(found)
        }
    }
}
