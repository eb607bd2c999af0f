//! The admission form's fields and their rule schema.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{FieldValue, ProgramClass};
use crate::validation::{RuleSchema, ValidationRule};

// ── Field names ──────────────────────────────────────────────────────

pub const FIELD_NAME: &str = "name";
pub const FIELD_MOBILE_NUMBER: &str = "mobileNumber";
pub const FIELD_ADDRESS: &str = "address";
pub const FIELD_SELECTED_CLASS: &str = "selectedClass";
pub const FIELD_DOCUMENTS: &str = "documents";

/// Every field of the form, in evaluation order.
pub const FIELDS: &[&str] = &[
    FIELD_NAME,
    FIELD_MOBILE_NUMBER,
    FIELD_ADDRESS,
    FIELD_SELECTED_CLASS,
    FIELD_DOCUMENTS,
];

// ── Constraints ──────────────────────────────────────────────────────

pub const NAME_MIN_LENGTH: usize = 3;

/// Input cap applied by the UI widget, not a validation rule.
pub const NAME_INPUT_MAX_LENGTH: usize = 50;

pub const MOBILE_NUMBER_LENGTH: usize = 10;

pub const ADDRESS_MIN_LENGTH: usize = 10;

/// Upload extensions accepted for documents (compared lowercase).
pub const ALLOWED_DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png"];

pub const INVALID_CLASS_MESSAGE: &str = "Please select a valid class.";

pub const INVALID_DOCUMENTS_MESSAGE: &str =
    "Invalid file types or no documents uploaded. Please upload PDF, JPG, JPEG, or PNG files.";

static MOBILE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{10}$").expect("valid regex"));

// ── Schema ───────────────────────────────────────────────────────────

/// Build the rule schema for the admission form.
pub fn admission_schema() -> RuleSchema {
    RuleSchema::new()
        .field(
            FIELD_NAME,
            ValidationRule::new()
                .required()
                .trim()
                .min_length(NAME_MIN_LENGTH),
        )
        .field(
            FIELD_MOBILE_NUMBER,
            ValidationRule::new()
                .required()
                .pattern(MOBILE_NUMBER_RE.clone())
                .max_length(MOBILE_NUMBER_LENGTH),
        )
        .field(
            FIELD_ADDRESS,
            ValidationRule::new()
                .required()
                .min_length(ADDRESS_MIN_LENGTH),
        )
        .field(
            FIELD_SELECTED_CLASS,
            ValidationRule::new()
                .required()
                .validator(is_known_class)
                .error(INVALID_CLASS_MESSAGE),
        )
        .field(
            FIELD_DOCUMENTS,
            ValidationRule::new()
                .required()
                .validator(has_allowed_documents)
                .error(INVALID_DOCUMENTS_MESSAGE),
        )
}

fn is_known_class(value: &FieldValue) -> bool {
    value
        .as_text()
        .is_some_and(|s| s.parse::<ProgramClass>().is_ok())
}

/// Non-empty list where every file has an allowed extension.
pub fn has_allowed_documents(value: &FieldValue) -> bool {
    value.as_files().is_some_and(|files| {
        !files.is_empty()
            && files
                .iter()
                .all(|file| ALLOWED_DOCUMENT_EXTENSIONS.contains(&file.extension().as_str()))
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
