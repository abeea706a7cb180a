//! Per-field validation errors for form input.
//!
//! Forms collect every problem with their fields before touching the store, so
//! that all messages can be shown next to their inputs at once.

use std::fmt::Display;

use serde::Serialize;

/// A problem with a single form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// The name of the form field, e.g. "price".
    pub field: &'static str,
    /// A human readable explanation of what is wrong with the field.
    pub message: String,
}

/// The collected field errors for one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Create an empty set of errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `field`.
    pub fn add(&mut self, field: &'static str, message: &str) {
        self.0.push(FieldError {
            field,
            message: message.to_owned(),
        });
    }

    /// Whether no errors have been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The message recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }

    /// All recorded errors in the order they were added.
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Turn the collected errors into a result.
    ///
    /// # Errors
    /// Returns [crate::Error::Validation] if any errors were recorded.
    pub fn into_result(self) -> Result<(), crate::Error> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(crate::Error::Validation(self))
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self
            .0
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect();

        write!(f, "{}", messages.join("; "))
    }
}

/// Returns the trimmed value, or records `message` against `field` if it is blank.
pub(crate) fn required(
    value: &str,
    field: &'static str,
    message: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let value = value.trim();

    if value.is_empty() {
        errors.add(field, message);
        None
    } else {
        Some(value.to_owned())
    }
}
