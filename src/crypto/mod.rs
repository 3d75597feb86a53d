//! Cryptographic primitives behind the seal format.
//!
//! Provides key derivation, AES encryption, HMAC integrity and secure randomness.

pub mod cipher;
pub mod kdf;
pub mod mac;
pub mod random;

pub use cipher::{decrypt, encrypt, pad, unpad};
pub use kdf::{Algorithm, DerivedKey, KeyOptions, derive_key};
pub use mac::{MacDigest, fixed_time_eq, hmac_with_password};
pub use random::{bytes_to_hex, random_bits, random_bytes, random_salt};

/// AES block length (16 bytes / 128 bits).
pub const BLOCK_LEN: usize = 16;
/// Largest request accepted by the random source (2^31 bits).
pub const MAX_RANDOM_BYTES: usize = 2_147_483_648 / 8;
