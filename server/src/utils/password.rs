use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;

use crate::utils::error::{AppError, AppResult};

/// Hash a plaintext password into an argon2 PHC string.
pub fn hash_password(plain: &str) -> AppResult<String> {
    if plain.trim().is_empty() {
        return Err(AppError::validation("Password is a required field"));
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_salted_phc_string() {
        let first = hash_password("hammer-time").unwrap();
        let second = hash_password("hammer-time").unwrap();

        assert!(first.starts_with("$argon2"));
        assert_ne!(first, second);
    }

    #[test]
    fn test_blank_password_is_rejected() {
        let err = hash_password("   ").unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
