//! Cryptographic Utilities
//!
//! Building blocks for opaque single-use tokens (email verification,
//! password reset) and token digests: the raw token is handed to the user
//! out-of-band, only its SHA-256 digest is ever stored.

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

/// Byte length of opaque tokens (matches 32 random bytes hex-encoded)
pub const OPAQUE_TOKEN_BYTES: usize = 32;

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Generate an opaque token: 32 random bytes, lowercase hex
pub fn generate_opaque_token() -> String {
    hex_encode(&random_bytes(OPAQUE_TOKEN_BYTES))
}

/// Compute SHA-256 hash
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute SHA-256 and return it as lowercase hex (storage form for digests)
pub fn sha256_hex(data: &[u8]) -> String {
    hex_encode(&sha256(data))
}

/// Encode bytes as lowercase hex
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Constant-time comparison to prevent timing attacks
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
