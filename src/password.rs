//! Salted argon2id password hashing
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so the cost
//! parameters travel with each hash and can be raised through configuration without invalidating
//! existing passwords.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::error::PasswordError;

/// Hash a password using argon2id with a fresh random salt
pub fn hash_password(password: &str, params: &Params) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone());
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash, using the parameters recorded in the hash
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(stored).map_err(|_| PasswordError::MalformedHash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(_) => Err(PasswordError::MalformedHash),
    }
}

/// Cheap parameters so tests don't spend their time hashing
#[cfg(test)]
pub(crate) fn fast_params() -> Params {
    Params::new(1024, 1, 1, None).unwrap()
}
