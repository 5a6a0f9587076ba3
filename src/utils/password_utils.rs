//! Password hashing and verification

use argon2::{
    password_hash::{self, rand_core::OsRng, PasswordHashString, PasswordVerifier, SaltString},
    Argon2, PasswordHasher,
};
use derive_more::derive::Display;
use once_cell::sync::Lazy;
use std::str::FromStr;

static DEFAULT_HASHER: Lazy<Argon2<'static>> = Lazy::new(Argon2::default);

/// Hash of the empty password, verified against when the user does not
/// exist so that unknown emails take as long as wrong passwords
static EMPTY_HASH: Lazy<Option<PWHash>> = Lazy::new(|| hash("").ok());

/// A hashed password, in PHC string format
#[derive(Clone, Debug, Display)]
pub struct PWHash(PasswordHashString);

impl PWHash {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for PWHash {
    type Err = password_hash::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(PWHash(PasswordHashString::from_str(s)?))
    }
}

/// Hashes a clear-text password with Argon2id and a random salt
pub fn hash(password: &str) -> Result<PWHash, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = DEFAULT_HASHER
        .hash_password(password.as_bytes(), &salt)?
        .serialize();

    Ok(PWHash(hash))
}

/// Checks a password against the stored hash.
///
/// Without a stored hash the password is still checked against a dummy
/// one, so the response time does not reveal whether the user exists.
pub fn verify(password: &str, maybe_hash: Option<&PWHash>) -> bool {
    let Some(hash) = maybe_hash.or(EMPTY_HASH.as_ref()) else {
        return false;
    };

    let valid = DEFAULT_HASHER
        .verify_password(password.as_bytes(), &hash.0.password_hash())
        .is_ok();

    valid && maybe_hash.is_some()
}
