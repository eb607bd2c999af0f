//! Declarative field validation.
//!
//! [`rules`] holds the schema and result types, [`evaluator`] the pure
//! evaluation logic that turns a schema plus a record into an [`ErrorMap`].

pub mod evaluator;
pub mod rules;

pub use evaluator::{evaluate, validate};
pub use rules::{
    Check, ErrorMap, FieldViolation, Predicate, RuleSchema, ValidationReport, ValidationRule,
};
