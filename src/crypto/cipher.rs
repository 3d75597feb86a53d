//! AES-256-CBC and AES-128-CTR over a [`DerivedKey`].
//!
//! CBC padding follows PKCS#7 on the way in. On the way out only the last
//! byte is read as the padding length: the remaining padding bytes are not
//! checked. Seals produced by other implementations rely on this, and the
//! HMAC is always verified before decryption is attempted, but the unpadding
//! itself is neither validated nor constant-time.

use aes::{Aes128, Aes256};
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::NoPadding};
use ctr::cipher::StreamCipher;

use super::BLOCK_LEN;
use super::kdf::{Algorithm, DerivedKey};
use crate::error::{Error, Result};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;
type Aes128Ctr = ctr::Ctr128BE<Aes128>;

/// Append PKCS#7 padding; an aligned message gains a full block.
///
/// The padding length is stored in one byte, so `block_size` must be in
/// `1..=255`.
pub fn pad(message: &[u8], block_size: usize) -> Result<Vec<u8>> {
    let Ok(width) = u8::try_from(block_size) else {
        return Err(Error::InvalidBlockSize(block_size));
    };
    if width == 0 {
        return Err(Error::InvalidBlockSize(block_size));
    }
    let length = block_size - (message.len() % block_size);
    let mut padded = Vec::with_capacity(message.len() + length);
    padded.extend_from_slice(message);
    // length <= width, so it fits the byte
    padded.resize(message.len() + length, length as u8);
    Ok(padded)
}

/// Strip padding by trusting the final byte.
pub fn unpad(message: &[u8]) -> Result<&[u8]> {
    let Some(&last) = message.last() else {
        return Err(Error::DecryptionFailed);
    };
    let padding = last as usize;
    if padding > message.len() {
        return Err(Error::DecryptionFailed);
    }
    Ok(&message[..message.len() - padding])
}

/// Encrypt plaintext with the key and IV carried by `key`.
pub fn encrypt(key: &DerivedKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    match key.algorithm() {
        Algorithm::Aes256Cbc => {
            let cipher = Aes256CbcEnc::new_from_slices(key.key(), key.iv())
                .map_err(|_| Error::CipherCreationFailed)?;
            let padded = pad(plaintext, BLOCK_LEN)?;
            Ok(cipher.encrypt_padded_vec_mut::<NoPadding>(&padded))
        }
        Algorithm::Aes128Ctr => apply_ctr(key, plaintext),
        Algorithm::Sha256 => Err(Error::InvalidEncryptionAlgorithm),
    }
}

/// Decrypt ciphertext with the key and IV carried by `key`.
pub fn decrypt(key: &DerivedKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
    match key.algorithm() {
        Algorithm::Aes256Cbc => {
            let cipher = Aes256CbcDec::new_from_slices(key.key(), key.iv())
                .map_err(|_| Error::CipherCreationFailed)?;
            if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
                return Err(Error::DecryptionFailed);
            }
            let plaintext = cipher
                .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
                .map_err(|_| Error::DecryptionFailed)?;
            Ok(unpad(&plaintext)?.to_vec())
        }
        Algorithm::Aes128Ctr => apply_ctr(key, ciphertext),
        Algorithm::Sha256 => Err(Error::InvalidEncryptionAlgorithm),
    }
}

// Counter mode is its own inverse.
fn apply_ctr(key: &DerivedKey, input: &[u8]) -> Result<Vec<u8>> {
    let mut cipher =
        Aes128Ctr::new_from_slices(key.key(), key.iv()).map_err(|_| Error::CipherCreationFailed)?;
    let mut buf = input.to_vec();
    cipher.apply_keystream(&mut buf);
    Ok(buf)
}
