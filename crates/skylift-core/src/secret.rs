//! Secret key generation.

use std::fmt::Write;

use rand::RngCore;

/// Generate a secure random secret key: 64 random bytes as lowercase hex
/// (128 characters), suitable for SECRET_KEY_BASE.
pub fn generate_secret_key() -> String {
    let mut bytes = [0u8; 64];
    rand::thread_rng().fill_bytes(&mut bytes);
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}
