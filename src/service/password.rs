use thiserror::Error;

/// bcrypt only reads this many bytes of input.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Hashing failed: {0}")]
    HashFailed(#[from] bcrypt::BcryptError),
}

/// Salted bcrypt hash of `password` at `cost`.
pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Check `password` against a stored bcrypt hash.
///
/// A malformed stored hash counts as a mismatch so callers only ever see
/// "matches" or "does not match".
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("TestPassword123!", TEST_COST).unwrap();
        assert!(hash.starts_with("$2"));
        assert!(verify_password("TestPassword123!", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_same_password_different_hashes() {
        let h1 = hash_password("password1", TEST_COST).unwrap();
        let h2 = hash_password("password1", TEST_COST).unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }

    #[test]
    fn test_invalid_cost_is_an_error() {
        assert!(hash_password("pw", 2).is_err());
    }
}
