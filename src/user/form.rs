//! Form data for signing up and logging in.

use serde::{Deserialize, Serialize};

use crate::{
    Error, PasswordHash,
    user::NewUser,
    validation::{ValidationErrors, required},
};

/// Raw form data for account creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignUpForm {
    /// The name to log in with.
    pub username: String,
    /// The plain text password, hashed by [SignUpForm::validate].
    pub password: String,
    /// The user's job title.
    pub position: String,
    /// The user's national ID or staff number.
    pub id_number: String,
    /// The user's phone number.
    pub phone_number: String,
}

impl SignUpForm {
    /// Validate the form and hash the password with `cost`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::Validation] with a message for each blank field,
    /// - or [Error::HashingError] if the password could not be hashed.
    pub fn validate(&self, cost: u32) -> Result<NewUser, Error> {
        let mut errors = ValidationErrors::new();

        let username = required(&self.username, "username", "Username is required", &mut errors);
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        }
        let position = required(&self.position, "position", "Position is required", &mut errors);
        let id_number = required(
            &self.id_number,
            "id_number",
            "ID Number is required",
            &mut errors,
        );
        let phone_number = required(
            &self.phone_number,
            "phone_number",
            "Phone Number is required",
            &mut errors,
        );

        let (Some(username), Some(position), Some(id_number), Some(phone_number)) =
            (username, position, id_number, phone_number)
        else {
            return Err(Error::Validation(errors));
        };
        errors.into_result()?;

        Ok(NewUser {
            id_number,
            username,
            password_hash: PasswordHash::new(&self.password, cost)?,
            position,
            phone_number,
        })
    }
}

/// Raw form data for logging in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogInForm {
    /// The name the user signed up with.
    pub username: String,
    /// The plain text password.
    pub password: String,
}

impl LogInForm {
    /// Check that both fields were filled in.
    ///
    /// # Errors
    /// Returns an [Error::Validation] with a message for each blank field.
    pub fn validate(&self) -> Result<(), Error> {
        let mut errors = ValidationErrors::new();

        required(&self.username, "username", "Username is required", &mut errors);
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        }

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::{LogInForm, SignUpForm};

    fn sign_up_form() -> SignUpForm {
        SignUpForm {
            username: "thabo".to_owned(),
            password: "hunter2".to_owned(),
            position: "Cashier".to_owned(),
            id_number: "0102".to_owned(),
            phone_number: "+266 5800 0000".to_owned(),
        }
    }

    #[test]
    fn sign_up_hashes_password() {
        let user = sign_up_form().validate(4).expect("form should be valid");

        assert_eq!(user.id_number, "0102");
        assert_ne!(user.password_hash.as_ref(), "hunter2");
        assert_eq!(user.password_hash.verify("hunter2"), Ok(true));
    }

    #[test]
    fn sign_up_reports_every_blank_field() {
        let result = SignUpForm::default().validate(4);

        let Err(Error::Validation(errors)) = result else {
            panic!("want validation error, got {result:?}");
        };
        assert_eq!(errors.get("username"), Some("Username is required"));
        assert_eq!(errors.get("password"), Some("Password is required"));
        assert_eq!(errors.get("position"), Some("Position is required"));
        assert_eq!(errors.get("id_number"), Some("ID Number is required"));
        assert_eq!(errors.get("phone_number"), Some("Phone Number is required"));
    }

    #[test]
    fn sign_up_rejects_missing_password_only() {
        let result = SignUpForm {
            password: String::new(),
            ..sign_up_form()
        }
        .validate(4);

        let Err(Error::Validation(errors)) = result else {
            panic!("want validation error, got {result:?}");
        };
        assert_eq!(errors.errors().len(), 1);
    }

    #[test]
    fn log_in_requires_both_fields() {
        let result = LogInForm {
            username: "thabo".to_owned(),
            password: String::new(),
        }
        .validate();

        let Err(Error::Validation(errors)) = result else {
            panic!("want validation error, got {result:?}");
        };
        assert_eq!(errors.get("password"), Some("Password is required"));
        assert_eq!(errors.get("username"), None);
    }
}
