//! Admission form core: field types, the declarative rule engine, the
//! admission rule schema, and the asynchronous document constraint check.
//!
//! Everything here is pure logic apart from [`documents`], whose simulated
//! scanner suspends on an injectable [`documents::Sleeper`].

pub mod documents;
pub mod error;
pub mod schema;
pub mod types;
pub mod validation;

pub use documents::{check_documents, DocumentError, DocumentScanner, SimulatedScanner};
pub use error::CoreError;
pub use types::{FieldValue, FileDescriptor, ProgramClass, Record};
pub use validation::{evaluate, validate, ErrorMap, RuleSchema, ValidationReport, ValidationRule};
