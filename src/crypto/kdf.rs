use std::fmt;
use std::str::FromStr;

use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;
use tracing::trace;
use zeroize::Zeroize;

use super::random::{random_bits, random_salt};
use crate::error::{Error, Result};
use crate::password::Password;

/// Algorithms a key can be derived for.
///
/// The numeric tags (0, 1, 2) match the order used by other implementations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// AES-256 in CBC mode.
    #[default]
    Aes256Cbc,
    /// AES-128 in CTR mode.
    Aes128Ctr,
    /// HMAC-SHA-256, integrity only.
    Sha256,
}

impl Algorithm {
    pub const fn key_bits(self) -> usize {
        match self {
            Algorithm::Aes256Cbc => 256,
            Algorithm::Aes128Ctr => 128,
            Algorithm::Sha256 => 256,
        }
    }

    pub const fn iv_bits(self) -> usize {
        match self {
            Algorithm::Aes256Cbc | Algorithm::Aes128Ctr => 128,
            Algorithm::Sha256 => 0,
        }
    }

    pub const fn key_len(self) -> usize {
        self.key_bits() / 8
    }

    pub const fn iv_len(self) -> usize {
        self.iv_bits() / 8
    }

    /// Display name, e.g. `AES-CBC`.
    pub const fn name(self) -> &'static str {
        match self {
            Algorithm::Aes256Cbc => "AES-CBC",
            Algorithm::Aes128Ctr => "AES-CTR",
            Algorithm::Sha256 => "SHA-256",
        }
    }

    /// Configuration name, e.g. `aes-256-cbc`.
    pub const fn id(self) -> &'static str {
        match self {
            Algorithm::Aes256Cbc => "aes-256-cbc",
            Algorithm::Aes128Ctr => "aes-128-ctr",
            Algorithm::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "aes-256-cbc" => Ok(Algorithm::Aes256Cbc),
            "aes-128-ctr" => Ok(Algorithm::Aes128Ctr),
            "sha256" => Ok(Algorithm::Sha256),
            other => Err(Error::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

impl TryFrom<u8> for Algorithm {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Algorithm::Aes256Cbc),
            1 => Ok(Algorithm::Aes128Ctr),
            2 => Ok(Algorithm::Sha256),
            other => Err(Error::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Options for a single key derivation.
///
/// The all-default value is treated as "no options supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyOptions {
    pub algorithm: Algorithm,
    /// PBKDF2 iterations, at least 1.
    pub iterations: u32,
    pub min_password_length: usize,
    /// Size of the generated salt; only used when `salt` is `None`.
    pub salt_bits: usize,
    pub salt: Option<String>,
    pub iv: Option<Vec<u8>>,
}

impl KeyOptions {
    fn is_unset(&self) -> bool {
        *self == KeyOptions::default()
    }
}

/// Key material produced by [`derive_key`].
///
/// The key bytes are wiped when the value is dropped.
pub struct DerivedKey {
    algorithm: Algorithm,
    key: Vec<u8>,
    salt: String,
    iv: Vec<u8>,
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("algorithm", &self.algorithm)
            .field("key", &"<redacted>")
            .field("salt", &self.salt)
            .field("iv", &self.iv)
            .finish()
    }
}

impl DerivedKey {
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Hex salt the key was derived with; empty for raw key buffers.
    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// Empty for [`Algorithm::Sha256`].
    pub fn iv(&self) -> &[u8] {
        &self.iv
    }
}

/// Derive a key (and IV where the algorithm needs one) from a password.
///
/// Text passwords go through PBKDF2-HMAC-SHA1 over the salt's UTF-8 bytes.
/// Byte passwords are used directly as the key.
pub fn derive_key(password: &Password, options: &KeyOptions) -> Result<DerivedKey> {
    if password.is_empty() {
        return Err(Error::PasswordRequired);
    }
    if options.is_unset() {
        return Err(Error::MissingParameters);
    }

    let algorithm = options.algorithm;

    let (key, salt) = match password {
        Password::Text(text) => {
            if options.iterations < 1 {
                return Err(Error::InvalidIterations);
            }
            if text.len() < options.min_password_length {
                return Err(Error::PasswordTooShort {
                    min: options.min_password_length,
                });
            }

            let salt = match options.salt.as_deref() {
                Some(salt) if !salt.is_empty() => salt.to_string(),
                _ => {
                    if options.salt_bits == 0 {
                        return Err(Error::MissingSalt);
                    }
                    random_salt(options.salt_bits)?
                }
            };

            let mut key = vec![0u8; algorithm.key_len()];
            pbkdf2_hmac::<Sha1>(text.as_bytes(), salt.as_bytes(), options.iterations, &mut key);
            (key, salt)
        }
        Password::Bytes(buffer) => {
            if buffer.len() < algorithm.key_len() {
                return Err(Error::PasswordBufferTooShort {
                    min: algorithm.key_len(),
                });
            }
            (buffer.clone(), String::new())
        }
    };

    let iv = match &options.iv {
        Some(iv) => {
            if iv.len() != algorithm.iv_len() {
                return Err(Error::InvalidIvLength {
                    expected: algorithm.iv_len(),
                    actual: iv.len(),
                });
            }
            iv.clone()
        }
        None if algorithm.iv_bits() > 0 => random_bits(algorithm.iv_bits())?,
        None => Vec::new(),
    };

    trace!(%algorithm, iterations = options.iterations, "derived key");

    Ok(DerivedKey {
        algorithm,
        key,
        salt,
        iv,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const PASSWORD: &str =
        "passwordpasswordpasswordpasswordpasswordpasswordpasswordpassword";
    pub(crate) const CBC_SALT: &str =
        "b27a06366ace6bb1560ea039a5595c352a429b87f3982542da9e830a32f5468e";
    pub(crate) const CBC_IV: [u8; 16] = [
        0xac, 0xc6, 0x9d, 0x62, 0x8a, 0x2b, 0x0e, 0x54, 0x55, 0x30, 0xd5, 0x82, 0xed, 0xdc, 0x49,
        0x27,
    ];
    const CBC_KEY: [u8; 32] = [
        0xf3, 0x23, 0x9f, 0x37, 0x55, 0x29, 0x34, 0xdd, 0xfb, 0xb3, 0x61, 0xbe, 0xa4, 0x7a, 0xab,
        0xc7, 0x6f, 0x62, 0x1e, 0xd2, 0x49, 0x25, 0x0e, 0x1d, 0x9d, 0xf5, 0x38, 0x20, 0x4b, 0xf1,
        0x63, 0x47,
    ];

    pub(crate) fn options(algorithm: Algorithm) -> KeyOptions {
        KeyOptions {
            algorithm,
            iterations: 2,
            min_password_length: 32,
            salt_bits: 256,
            salt: None,
            iv: None,
        }
    }

    fn password() -> Password {
        Password::from(PASSWORD)
    }

    #[test]
    fn missing_password_fails() {
        let opts = options(Algorithm::Aes256Cbc);
        assert!(matches!(
            derive_key(&Password::from(""), &opts),
            Err(Error::PasswordRequired)
        ));
        assert!(matches!(
            derive_key(&Password::Bytes(Vec::new()), &opts),
            Err(Error::PasswordRequired)
        ));
    }

    #[test]
    fn unset_options_fail() {
        assert!(matches!(
            derive_key(&Password::from("password"), &KeyOptions::default()),
            Err(Error::MissingParameters)
        ));
    }

    #[test]
    fn unknown_algorithm_tags_are_rejected() {
        assert!(matches!(
            Algorithm::try_from(3),
            Err(Error::UnsupportedAlgorithm(_))
        ));
        assert!(matches!(Algorithm::try_from(200), Err(Error::UnsupportedAlgorithm(_))));
        assert!(matches!(
            "aes-512-xts".parse::<Algorithm>(),
            Err(Error::UnsupportedAlgorithm(_))
        ));
        assert_eq!(Algorithm::try_from(1).unwrap(), Algorithm::Aes128Ctr);
        assert_eq!("sha256".parse::<Algorithm>().unwrap(), Algorithm::Sha256);
    }

    #[test]
    fn algorithm_sizes() {
        assert_eq!(Algorithm::Aes256Cbc.key_len(), 32);
        assert_eq!(Algorithm::Aes128Ctr.key_len(), 16);
        assert_eq!(Algorithm::Sha256.iv_len(), 0);
        assert_eq!(Algorithm::Aes128Ctr.name(), "AES-CTR");
    }

    #[test]
    fn short_password_fails() {
        let opts = options(Algorithm::Aes256Cbc);
        assert!(matches!(
            derive_key(&Password::from("password"), &opts),
            Err(Error::PasswordTooShort { min: 32 })
        ));
    }

    #[test]
    fn zero_iterations_fail() {
        let mut opts = options(Algorithm::Aes256Cbc);
        opts.iterations = 0;
        assert!(matches!(
            derive_key(&password(), &opts),
            Err(Error::InvalidIterations)
        ));
    }

    #[test]
    fn no_salt_and_no_salt_bits_fails() {
        let mut opts = options(Algorithm::Aes256Cbc);
        opts.salt_bits = 0;
        assert!(matches!(
            derive_key(&password(), &opts),
            Err(Error::MissingSalt)
        ));

        opts.salt_bits = 99_999_999_999;
        assert!(matches!(
            derive_key(&password(), &opts),
            Err(Error::InvalidSize(_))
        ));
    }

    #[test]
    fn generates_salt_and_iv() {
        let key = derive_key(&password(), &options(Algorithm::Aes256Cbc)).unwrap();
        assert_eq!(key.key().len(), 32);
        assert_eq!(key.salt().len(), 64);
        assert_eq!(key.iv().len(), 16);
    }

    #[test]
    fn supplied_iv_is_kept() {
        let mut opts = options(Algorithm::Aes256Cbc);
        opts.iv = Some((1..=16).collect());
        let key = derive_key(&password(), &opts).unwrap();
        assert_eq!(key.iv(), opts.iv.as_deref().unwrap());
    }

    #[test]
    fn wrong_iv_length_fails() {
        let mut opts = options(Algorithm::Aes256Cbc);
        opts.iv = Some(vec![1, 2, 3]);
        assert!(matches!(
            derive_key(&password(), &opts),
            Err(Error::InvalidIvLength {
                expected: 16,
                actual: 3
            })
        ));
    }

    #[test]
    fn mac_key_has_no_iv() {
        let key = derive_key(&password(), &options(Algorithm::Sha256)).unwrap();
        assert_eq!(key.key().len(), 32);
        assert!(key.iv().is_empty());
    }

    #[test]
    fn password_buffer_is_used_directly() {
        let opts = options(Algorithm::Aes256Cbc);

        let short = Password::Bytes((1..=16).collect());
        assert!(matches!(
            derive_key(&short, &opts),
            Err(Error::PasswordBufferTooShort { min: 32 })
        ));

        let buffer: Vec<u8> = (1..=32).collect();
        let key = derive_key(&Password::Bytes(buffer.clone()), &opts).unwrap();
        assert_eq!(key.key(), &buffer[..]);
        assert_eq!(key.salt(), "");
        assert_eq!(key.iv().len(), 16);
    }

    #[test]
    fn matches_reference_key_for_aes256cbc() {
        let mut opts = options(Algorithm::Aes256Cbc);
        opts.salt = Some(CBC_SALT.to_string());
        opts.iv = Some(CBC_IV.to_vec());

        let key = derive_key(&password(), &opts).unwrap();
        assert_eq!(key.algorithm(), Algorithm::Aes256Cbc);
        assert_eq!(key.key(), &CBC_KEY[..]);
        assert_eq!(key.salt(), CBC_SALT);
        assert_eq!(key.iv(), &CBC_IV[..]);
    }

    #[test]
    fn derivation_is_deterministic_for_fixed_salt() {
        let mut opts = options(Algorithm::Aes128Ctr);
        opts.salt = Some("abcdef".to_string());

        let k1 = derive_key(&password(), &opts).unwrap();
        let k2 = derive_key(&password(), &opts).unwrap();
        assert_eq!(k1.key(), k2.key());
        assert_eq!(k1.key().len(), 16);
    }

    #[test]
    fn debug_redacts_key() {
        let key = derive_key(&password(), &options(Algorithm::Sha256)).unwrap();
        assert!(format!("{key:?}").contains("<redacted>"));
    }
}
