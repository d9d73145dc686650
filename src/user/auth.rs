//! Password hashing.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::Rng;

const SALT_BYTES: usize = 16;

fn fresh_salt() -> Result<SaltString> {
    let mut bytes = [0u8; SALT_BYTES];
    rand::rng().fill(&mut bytes);
    SaltString::encode_b64(&bytes).map_err(|err| anyhow!("{}", err))
}

/// Hashes `plain` with a fresh random salt, returning a PHC string.
pub fn hash_password(plain: &str) -> Result<String> {
    let salt = fresh_salt()?;
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|err| anyhow!("{}", err))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, phc_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(phc_hash).map_err(|err| anyhow!("{}", err))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}
