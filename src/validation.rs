//! Field-level input checks shared by the catalog and purchase services.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

pub const MAX_STRING_LEN: usize = 255;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .expect("email regex compiles")
});

/// Messages keyed by field name, serialized as `{"field": ["message", ...]}`.
#[derive(Debug, Default, Clone, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Required, non-blank text no longer than `max` characters.
    pub fn required_text(&mut self, field: &str, value: Option<&str>, max: Option<usize>) {
        match value.map(str::trim) {
            None | Some("") => self.add(field, format!("The {field} field is required.")),
            Some(v) => self.max_len(field, v, max),
        }
    }

    pub fn optional_text(&mut self, field: &str, value: Option<&str>, max: usize) {
        if let Some(v) = value {
            self.max_len(field, v.trim(), Some(max));
        }
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) {
        self.required_text(field, value, Some(MAX_STRING_LEN));
        let provided = value.map(str::trim).filter(|v| !v.is_empty());
        if provided.is_some_and(|v| !is_valid_email(v)) {
            self.add(field, format!("The {field} must be a valid email address."));
        }
    }

    pub fn non_negative_price(&mut self, field: &str, value: Option<Decimal>) {
        match value {
            None => self.add(field, format!("The {field} field is required.")),
            Some(v) if v.is_sign_negative() && !v.is_zero() => {
                self.add(field, format!("The {field} must be at least 0."))
            }
            Some(_) => {}
        }
    }

    pub fn rating(&mut self, field: &str, value: i32) {
        if !(1..=5).contains(&value) {
            self.add(field, format!("The {field} must be between 1 and 5."));
        }
    }

    fn max_len(&mut self, field: &str, value: &str, max: Option<usize>) {
        let Some(max) = max else { return };
        if value.chars().count() > max {
            self.add(
                field,
                format!("The {field} may not be greater than {max} characters."),
            );
        }
    }

    /// Turns collected messages into a `422` error.
    pub fn finish(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Trims optional text and collapses blank strings to `None`.
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
