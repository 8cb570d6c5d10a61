use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;

use super::AuthError;
use crate::config;

fn argon2() -> Result<Argon2<'static>, AuthError> {
    if config::config().security.insecure_password_hashing {
        // Minimal cost for development and tests only
        let params = Params::new(1024, 1, 1, None).map_err(|e| AuthError::PasswordHash(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    } else {
        Ok(Argon2::default())
    }
}

/// Hash into a PHC string with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// False for a wrong password and for anything that is not a PHC hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    match argon2() {
        Ok(argon2) => argon2.verify_password(password.as_bytes(), &parsed_hash).is_ok(),
        Err(_) => false,
    }
}
