use super::MAX_RANDOM_BYTES;
use crate::error::{Error, Result};
use getrandom::fill;

/// Fill buffer with cryptographically secure random bytes
fn secure_random(buf: &mut [u8]) -> Result<()> {
    fill(buf).map_err(Error::GenerationFailed)
}

/// Generate `size` random bytes, `size` in `1..=2^31/8`.
pub fn random_bytes(size: usize) -> Result<Vec<u8>> {
    if size < 1 || size > MAX_RANDOM_BYTES {
        return Err(Error::InvalidSize(size));
    }

    let mut buf = vec![0u8; size];
    secure_random(&mut buf)?;
    Ok(buf)
}

/// Generate enough random bytes to hold `bits` bits.
pub fn random_bits(bits: usize) -> Result<Vec<u8>> {
    random_bytes(bits.div_ceil(8))
}

/// Lowercase hex, two digits per byte.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Generate a hex encoded salt of `bits` random bits.
pub fn random_salt(bits: usize) -> Result<String> {
    let bytes = random_bits(bits)?;
    Ok(bytes_to_hex(&bytes))
}
