//! Rule evaluator: pure logic, no I/O.

use super::rules::{
    max_length_message, min_length_message, Check, ErrorMap, FieldViolation, RuleSchema,
    ValidationReport, ValidationRule, INVALID_FORMAT_MESSAGE, INVALID_VALUE_MESSAGE,
    REQUIRED_MESSAGE,
};
use crate::types::{FieldValue, Record};

/// Evaluate every field of `schema` against `record`, keeping one message per
/// failing field.
pub fn validate(schema: &RuleSchema, record: &Record) -> ErrorMap {
    evaluate(schema, record).to_error_map()
}

/// Evaluate every field of `schema` against `record`, keeping every failing
/// check.
pub fn evaluate(schema: &RuleSchema, record: &Record) -> ValidationReport {
    let mut violations = Vec::new();

    for (field, rule) in schema.iter() {
        evaluate_field(field, rule, record.get(field), &mut violations);
    }

    ValidationReport { violations }
}

fn evaluate_field(
    field: &str,
    rule: &ValidationRule,
    value: Option<&FieldValue>,
    out: &mut Vec<FieldViolation>,
) {
    let value = match value {
        Some(v) if rule.trim => Some(v.trimmed()),
        Some(v) => Some(v.clone()),
        None => None,
    };

    // A failed required check ends evaluation of the field.
    if rule.required && value.as_ref().map_or(true, FieldValue::is_empty) {
        out.push(violation(field, Check::Required, REQUIRED_MESSAGE.to_string()));
        return;
    }
    let Some(value) = value else {
        return;
    };

    let checks = [
        evaluate_pattern(rule, &value),
        evaluate_max_length(rule, &value),
        evaluate_min_length(rule, &value),
        evaluate_validator(rule, &value),
    ];
    out.extend(
        checks
            .into_iter()
            .flatten()
            .map(|(check, message)| violation(field, check, message)),
    );
}

fn violation(field: &str, check: Check, message: String) -> FieldViolation {
    FieldViolation {
        field: field.to_string(),
        check,
        message,
    }
}

fn message_or(rule: &ValidationRule, default: impl FnOnce() -> String) -> String {
    rule.error.clone().unwrap_or_else(default)
}

fn evaluate_pattern(rule: &ValidationRule, value: &FieldValue) -> Option<(Check, String)> {
    let pattern = rule.pattern.as_ref()?;
    let text = value.as_text()?; // patterns only apply to text
    if pattern.is_match(text) {
        None
    } else {
        Some((
            Check::Pattern,
            message_or(rule, || INVALID_FORMAT_MESSAGE.to_string()),
        ))
    }
}

fn evaluate_max_length(rule: &ValidationRule, value: &FieldValue) -> Option<(Check, String)> {
    let max = rule.max_length?;
    if value.len() > max {
        Some((Check::MaxLength, message_or(rule, || max_length_message(max))))
    } else {
        None
    }
}

fn evaluate_min_length(rule: &ValidationRule, value: &FieldValue) -> Option<(Check, String)> {
    let min = rule.min_length?;
    if value.len() < min {
        Some((Check::MinLength, message_or(rule, || min_length_message(min))))
    } else {
        None
    }
}

fn evaluate_validator(rule: &ValidationRule, value: &FieldValue) -> Option<(Check, String)> {
    let validator = rule.validator.as_ref()?;
    if !value.is_present() || validator.accepts(value) {
        None
    } else {
        Some((
            Check::Validator,
            message_or(rule, || INVALID_VALUE_MESSAGE.to_string()),
        ))
    }
}
