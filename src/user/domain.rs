//! Core user domain types.

use serde::{Deserialize, Serialize};

use crate::{
    Error, PasswordHash,
    validation::{ValidationErrors, required},
};

/// A staff member with an account.
///
/// Users are identified by their ID number, which cannot be changed once the
/// account exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's national ID or staff number.
    pub id_number: String,
    /// The name the user logs in with. Not required to be unique.
    pub username: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// The user's job title.
    pub position: String,
    /// The user's phone number.
    pub phone_number: String,
}

/// The details of an account that has not been created yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// The user's national ID or staff number. Must not already be registered.
    pub id_number: String,
    /// The name the user logs in with.
    pub username: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// The user's job title.
    pub position: String,
    /// The user's phone number.
    pub phone_number: String,
}

/// New profile details for an existing user.
///
/// The ID number selects the user to update, the password is left unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    /// The ID number of the user to update.
    pub id_number: String,
    /// The new username.
    pub username: String,
    /// The new job title.
    pub position: String,
    /// The new phone number.
    pub phone_number: String,
}

impl UserUpdate {
    /// Check that no field is blank.
    ///
    /// # Errors
    /// Returns an [Error::Validation] listing every blank field.
    pub fn validate(&self) -> Result<(), Error> {
        let mut errors = ValidationErrors::new();

        required(&self.username, "username", "Username is required", &mut errors);
        required(&self.position, "position", "Position is required", &mut errors);
        required(
            &self.phone_number,
            "phone_number",
            "Phone Number is required",
            &mut errors,
        );

        errors.into_result()
    }
}

impl From<&User> for UserUpdate {
    fn from(user: &User) -> Self {
        Self {
            id_number: user.id_number.clone(),
            username: user.username.clone(),
            position: user.position.clone(),
            phone_number: user.phone_number.clone(),
        }
    }
}
