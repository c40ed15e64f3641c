// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password digests.
//!
//! A digest is SHA-256 over the password followed by the application-wide
//! salt, rendered as 64 lowercase hex characters. There is no per-user salt
//! and no work factor, so digests from the existing user base stay valid.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Hash a password with the application salt.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a password against a stored digest in constant time.
pub fn verify_password(password: &str, salt: &str, stored_digest: &str) -> bool {
    let computed = hash_password(password, salt);
    computed.as_bytes().ct_eq(stored_digest.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALT: &str = "default_salt";

    #[test]
    fn test_digest_shape() {
        let digest = hash_password("Secret123", SALT);
        assert_eq!(digest.len(), 64);
        assert!(digest
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_eq!(digest, hash_password("Secret123", SALT));
    }

    #[test]
    fn test_known_vector() {
        // sha256("abc") with an empty salt
        assert_eq!(
            hash_password("abc", ""),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_salt_changes_digest() {
        assert_ne!(
            hash_password("Secret123", SALT),
            hash_password("Secret123", "other_salt")
        );
    }

    #[test]
    fn test_verify_password() {
        let digest = hash_password("Secret123", SALT);
        assert!(verify_password("Secret123", SALT, &digest));
        assert!(!verify_password("Secret124", SALT, &digest));
        assert!(!verify_password("Secret123", "other_salt", &digest));

        let mut mutated = digest.clone();
        mutated.replace_range(0..1, if digest.starts_with('0') { "1" } else { "0" });
        assert!(!verify_password("Secret123", SALT, &mutated));
        assert!(!verify_password("Secret123", SALT, &digest[..63]));
        assert!(!verify_password("Secret123", SALT, ""));
    }
}
