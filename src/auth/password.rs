/// Hash a plaintext password. bcrypt output is 60 characters, which is what
/// the `password` column holds.
pub fn hash_password(plain: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(plain, cost)
}

/// Check a plaintext password against a stored hash. A malformed hash never
/// verifies.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    match bcrypt::verify(plain, hash) {
        Ok(ok) => ok,
        Err(e) => {
            tracing::warn!("Stored password hash is unreadable: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::PASSWORD_MAX;

    #[test]
    fn hash_fits_password_column_and_verifies() {
        let hash = hash_password("hunter2", 4).unwrap();
        assert_eq!(hash.len(), PASSWORD_MAX);
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn garbage_hash_does_not_verify() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }
}
