//! Salted password digests
//!
//! Stored credentials are `salt$hexdigest` where the digest is
//! SHA-256 over the salt followed by the password. The store never holds
//! a plaintext password, and two users with the same password get
//! different digests as long as their salts differ.

use sha2::{Digest, Sha256};

/// Separator between the salt and the hex digest in the stored form.
const SEPARATOR: char = '$';

/// Produce the stored `salt$hexdigest` form for a password.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{salt}{SEPARATOR}{}", hex::encode(hasher.finalize()))
}

/// Check a password attempt against a stored digest.
///
/// A stored value without a salt separator never verifies; that shape
/// means the record predates salting or was tampered with.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once(SEPARATOR) {
        Some((salt, _)) => hash_password(password, salt) == stored,
        None => false,
    }
}
