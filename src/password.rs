//! Salted and hashed passwords for user accounts.

use std::fmt::Display;

use bcrypt::{hash, verify};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A salted and hashed password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// An alias for the default encryption cost for hashing passwords.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash `password` with the specified `cost`.
    ///
    /// `cost` increases the rounds of hashing and therefore the time needed to verify a password.
    /// Pass in [PasswordHash::DEFAULT_COST] to use the recommended cost.
    ///
    /// # Errors
    ///
    /// This function will return an error if the password could not be hashed.
    pub fn new(password: &str, cost: u32) -> Result<Self, Error> {
        match hash(password, cost) {
            Ok(password_hash) => Ok(Self(password_hash)),
            Err(e) => Err(Error::HashingError(e.to_string())),
        }
    }

    /// Wrap a string that is already a password hash, e.g. one read from the database.
    pub fn new_unchecked(password_hash: &str) -> Self {
        Self(password_hash.to_string())
    }

    /// Check that `raw_password` matches the stored password hash.
    ///
    /// # Errors
    ///
    /// This function will return an error if the stored hash is malformed.
    pub fn verify(&self, raw_password: &str) -> Result<bool, Error> {
        verify(raw_password, &self.0).map_err(|e| Error::HashingError(e.to_string()))
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::PasswordHash;

    #[test]
    fn verify_accepts_correct_password() {
        let hash = PasswordHash::new("hunter2", 4).unwrap();

        assert_eq!(hash.verify("hunter2"), Ok(true));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = PasswordHash::new("hunter2", 4).unwrap();

        assert_eq!(hash.verify("hunter3"), Ok(false));
    }

    #[test]
    fn hashes_are_salted() {
        let first = PasswordHash::new("hunter2", 4).unwrap();
        let second = PasswordHash::new("hunter2", 4).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn malformed_hash_fails_to_verify() {
        let hash = PasswordHash::new_unchecked("not a bcrypt hash");

        assert!(matches!(hash.verify("hunter2"), Err(Error::HashingError(_))));
    }
}
