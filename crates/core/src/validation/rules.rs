//! Validation rule, schema and result types.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::FieldValue;

// ---------------------------------------------------------------------------
// Default messages
// ---------------------------------------------------------------------------

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid format.";
pub const INVALID_VALUE_MESSAGE: &str = "Invalid value.";

pub fn max_length_message(max: usize) -> String {
    format!("Maximum length exceeded. Please enter no more than {max} characters.")
}

pub fn min_length_message(min: usize) -> String {
    format!("Minimum length not met. Please enter at least {min} characters.")
}

// ---------------------------------------------------------------------------
// Predicate
// ---------------------------------------------------------------------------

/// A custom validator over a field's value. Returns `true` when valid.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&FieldValue) -> bool + Send + Sync>);

impl Predicate {
    pub fn new(f: impl Fn(&FieldValue) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn accepts(&self, value: &FieldValue) -> bool {
        (self.0)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

// ---------------------------------------------------------------------------
// ValidationRule
// ---------------------------------------------------------------------------

/// Constraints for one field, built with the chained setters.
///
/// ```rust
/// use admission_core::validation::ValidationRule;
///
/// let rule = ValidationRule::new().required().trim().min_length(3);
/// assert!(rule.required);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValidationRule {
    pub required: bool,
    pub trim: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    pub validator: Option<Predicate>,
    /// Replaces the default message of every check except `required`.
    pub error: Option<String>,
}

impl ValidationRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn validator(mut self, f: impl Fn(&FieldValue) -> bool + Send + Sync + 'static) -> Self {
        self.validator = Some(Predicate::new(f));
        self
    }

    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }
}

// ---------------------------------------------------------------------------
// RuleSchema
// ---------------------------------------------------------------------------

/// Field rules in evaluation order.
#[derive(Debug, Clone, Default)]
pub struct RuleSchema {
    fields: Vec<(String, ValidationRule)>,
}

impl RuleSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. A repeated name replaces the earlier rule in place.
    pub fn field(mut self, name: impl Into<String>, rule: ValidationRule) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => *existing = rule,
            None => self.fields.push((name, rule)),
        }
        self
    }

    pub fn rule(&self, name: &str) -> Option<&ValidationRule> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, rule)| rule)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValidationRule)> {
        self.fields.iter().map(|(name, rule)| (name.as_str(), rule))
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// The kind of check that produced a violation, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    Required,
    Pattern,
    MaxLength,
    MinLength,
    Validator,
}

/// A single failing check on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub check: Check,
    pub message: String,
}

/// Every failing check of one evaluation, in schema and check order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub violations: Vec<FieldViolation>,
}

impl ValidationReport {
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldViolation> {
        self.violations.iter().filter(move |v| v.field == field)
    }

    /// Collapse into one message per field; the last failing check wins.
    pub fn to_error_map(&self) -> ErrorMap {
        let mut errors = ErrorMap::new();
        for violation in &self.violations {
            errors.insert(violation.field.clone(), violation.message.clone());
        }
        errors
    }
}

/// Field name to message. A missing key or an empty message means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorMap(BTreeMap<String, String>);

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .map(String::as_str)
            .filter(|message| !message.is_empty())
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// True when no field carries a non-empty message.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(String::is_empty)
    }

    /// Number of fields carrying a non-empty message.
    pub fn len(&self) -> usize {
        self.0.values().filter(|m| !m.is_empty()).count()
    }

    /// Fields carrying a non-empty message, in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter(|(_, message)| !message.is_empty())
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ErrorMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(field, message)| (field.into(), message.into()))
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
