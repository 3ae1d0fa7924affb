//! Form validation for the circuits views.
//!
//! A cleaner reads a [`FormData`], collects every problem it finds into
//! [`FormErrors`] keyed by field name, and only yields a typed input when
//! the whole form is valid. Nothing is persisted here.

mod circuit;
mod circuit_type;
mod fields;
mod provider;
mod termination;

pub use circuit::{circuit_initial, clean_circuit, clean_circuit_bulk};
pub use circuit_type::{circuit_type_initial, clean_circuit_type};
pub use fields::Fields;
pub use provider::{clean_provider, clean_provider_bulk, provider_initial};
pub use termination::{clean_termination, termination_initial, TERM_SIDE_CHOICES};

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::kernel::store::StoreError;

/// Key for errors that belong to the form as a whole
pub const NON_FIELD_ERRORS: &str = "__all__";

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str = "Select a valid choice.";

/// Field-level validation messages, in the order they were found
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(IndexMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Every message, flattened as `field: message`.
    pub fn messages(&self) -> Vec<String> {
        self.0
            .iter()
            .flat_map(|(field, messages)| {
                messages.iter().map(move |m| {
                    if field == NON_FIELD_ERRORS {
                        m.clone()
                    } else {
                        format!("{}: {}", field, m)
                    }
                })
            })
            .collect()
    }

    /// `Ok(value)` if nothing was recorded.
    pub fn finish<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("validation failed: {0}")]
    Invalid(FormErrors),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<FormErrors> for FormError {
    fn from(errors: FormErrors) -> Self {
        FormError::Invalid(errors)
    }
}

/// Values rendered into a bound form
pub type FormValues = IndexMap<String, String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_keep_insertion_order() {
        let mut errors = FormErrors::new();
        errors.add("slug", "Enter a valid slug.");
        errors.add("name", REQUIRED);
        errors.add("slug", "Too long.");

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("slug"), ["Enter a valid slug.", "Too long."]);
        assert_eq!(
            errors.messages(),
            vec![
                "slug: Enter a valid slug.",
                "slug: Too long.",
                "name: This field is required.",
            ]
        );
    }

    #[test]
    fn test_finish() {
        assert_eq!(FormErrors::new().finish(5), Ok(5));
        let mut errors = FormErrors::new();
        errors.add(NON_FIELD_ERRORS, "Bad form.");
        assert_eq!(errors.clone().finish(5), Err(errors));
    }
}
