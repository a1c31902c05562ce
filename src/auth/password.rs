use bcrypt::{hash, verify, DEFAULT_COST};

/// Hash a password for storage. Salt generation is handled by bcrypt.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, DEFAULT_COST)
}

/// Compare a plaintext password against a stored bcrypt hash.
///
/// A malformed stored hash counts as a mismatch rather than an error: from
/// the caller's point of view the credential simply failed, which keeps the
/// failure indistinguishable from an unknown user.
pub fn verify_password(password: &str, hashed: &str) -> bool {
    match verify(password, hashed) {
        Ok(matched) => matched,
        Err(e) => {
            tracing::warn!("stored password hash could not be checked: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // bcrypt's MIN_COST (4) is private; mirror its value here
    const MIN_COST: u32 = 4;

    #[test]
    fn hash_and_verify_round_trip() {
        // MIN_COST keeps the test fast; production uses DEFAULT_COST
        let hashed = hash("hunter22", MIN_COST).expect("hash");
        assert!(verify_password("hunter22", &hashed));
        assert!(!verify_password("hunter23", &hashed));
    }

    #[test]
    fn malformed_hash_is_a_mismatch() {
        assert!(!verify_password("hunter22", "not-a-bcrypt-hash"));
    }
}
