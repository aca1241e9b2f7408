use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use crate::error::AppError;

/// Creates a fresh single-use confirmation code for the signup flow.
pub fn generate_confirmation_code() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Hashes a confirmation code for storage in `users.confirmation_code`.
pub fn hash_code(code: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = Argon2::default();

    let code_hash = argon2
        .hash_password(code.as_bytes(), &salt)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .to_string();

    Ok(code_hash)
}

pub fn verify_code(code: &str, code_hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(code_hash)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let result = Argon2::default().verify_password(code.as_bytes(), &parsed_hash);

    match result {
        Ok(_) => Ok(true),
        Err(_) => Ok(false),
    }
}
