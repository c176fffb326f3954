//! Form validation.
//!
//! Each form is a typed struct deriving [`validator::Validate`] with one rule per field
//! (see [`rules`]). Rules that need more than their own field run afterwards through
//! [`FormSchema::cross_field`]. The outcome is a [`FieldErrors`] map keyed by the form's
//! camelCase field names, holding the first failing message per field.

pub mod forms;
pub mod rules;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use validator::{Validate, ValidationErrors};

pub use forms::{
    BillingForm, LoginForm, ProductForm, ReturnHeaderForm, ReturnItemForm, ShippingForm,
    ShopperForm, SignupForm,
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self { Self::default() }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    /// Records `message` unless the field already failed an earlier rule.
    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> { self.0.get(field).map(String::as_str) }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> { self.0.iter().map(|(k, v)| (k.as_str(), v.as_str())) }

    /// Adds another form's errors, keeping any message already recorded.
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, message) in other.0 {
            self.0.entry(field).or_insert(message);
        }
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, list) in errors.field_errors() {
            let Some(first) = list.first() else { continue };
            let message = first
                .message
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| first.code.to_string());
            out.insert(&camel_case(&field), message);
        }
        out
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.iter().map(|(field, msg)| format!("{field}: {msg}")).collect::<Vec<_>>().join("; ");
        write!(f, "{joined}")
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// A form whose derived field rules may be followed by checks spanning several fields.
pub trait FormSchema: Validate {
    fn cross_field(&self, _errors: &mut FieldErrors) {}

    fn check(&self) -> Result<(), FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => FieldErrors::from(e),
        };
        self.cross_field(&mut errors);
        errors.into_result()
    }
}
