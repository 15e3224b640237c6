//! Password hashing for stored credentials

/// Hash a plaintext password (argon2, per-call random salt, PHC string output)
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC hash string.
///
/// `Ok(false)` means the password does not match. `Err` means the stored hash
/// itself could not be parsed — the record is corrupt and the failure must not
/// be reported as a credential mismatch.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    let parsed = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("abc12345").expect("Failed to hash password");

        assert!(verify_password("abc12345", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("abc12345").expect("Failed to hash password");
        let second = hash_password("abc12345").expect("Failed to hash password");

        // Per-call random salt: same input, different output
        assert_ne!(first, second);
    }

    #[test]
    fn test_plaintext_never_stored() {
        let hash = hash_password("abc12345").expect("Failed to hash password");
        assert!(!hash.contains("abc12345"));
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_password("abc12345", "not-a-phc-string").is_err());
    }
}
