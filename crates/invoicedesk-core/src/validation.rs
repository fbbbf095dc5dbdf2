//! Field rules for client drafts.
//!
//! Every rule runs independently; [`validate`] returns all failures at once so
//! the form can mark each offending field. Nothing here touches the network.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::client::{ClientDraft, Field};

/// `<non-whitespace>@<non-whitespace>.<non-whitespace>` anywhere in the value.
static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email regex is valid"));

/// Why a single field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("required")]
    Required,
    #[error("invalid format")]
    InvalidFormat,
}

impl FieldError {
    /// Human-readable message for `field`.
    pub fn message(&self, field: Field) -> String {
        match self {
            Self::Required => format!("{} is required", field.label()),
            Self::InvalidFormat => format!("{} is invalid", field.label()),
        }
    }
}

/// Per-field validation failures. Empty means the draft is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<FieldError> {
        self.0.get(&field).copied()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn insert(&mut self, field: Field, error: FieldError) {
        self.0.insert(field, error);
    }

    /// Drop the error for one field, leaving the others in place.
    pub fn clear(&mut self, field: Field) -> Option<FieldError> {
        self.0.remove(&field)
    }

    pub fn clear_all(&mut self) {
        self.0.clear();
    }

    pub fn message(&self, field: Field) -> Option<String> {
        self.get(field).map(|e| e.message(field))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, FieldError)> + '_ {
        self.0.iter().map(|(f, e)| (*f, *e))
    }

    /// Field name → message, in field order.
    pub fn messages(&self) -> BTreeMap<&'static str, String> {
        self.iter()
            .map(|(field, err)| (field.as_str(), err.message(field)))
            .collect()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(field, e)| e.message(field)).collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

/// Validate every field of `draft`.
pub fn validate(draft: &ClientDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for field in Field::ALL {
        if let Some(err) = validate_field(field, draft.get(field)) {
            errors.insert(field, err);
        }
    }
    errors
}

/// Validate one field's value in isolation.
pub fn validate_field(field: Field, value: &str) -> Option<FieldError> {
    match field {
        Field::Name | Field::TaxId => value.trim().is_empty().then_some(FieldError::Required),
        Field::Email => {
            if value.trim().is_empty() {
                Some(FieldError::Required)
            } else if !EMAIL_SHAPE.is_match(value) {
                Some(FieldError::InvalidFormat)
            } else {
                None
            }
        }
    }
}
