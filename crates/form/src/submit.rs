//! The submission side effect and the application snapshot it receives.

use std::future::Future;

use admission_core::schema::{
    FIELD_ADDRESS, FIELD_DOCUMENTS, FIELD_MOBILE_NUMBER, FIELD_NAME, FIELD_SELECTED_CLASS,
};
use admission_core::{CoreError, ErrorMap, FileDescriptor, ProgramClass, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// General error shown when the submission side effect fails.
pub const GENERAL_SUBMIT_ERROR: &str =
    "An error occurred while submitting the form. Please try again later.";

/// A validated application, ready to hand to a [`Submitter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionApplication {
    /// Reference issued when the application is built (UUID v7).
    pub reference: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub name: String,
    pub mobile_number: String,
    pub address: String,
    pub selected_class: ProgramClass,
    pub documents: Vec<FileDescriptor>,
}

impl AdmissionApplication {
    /// Snapshot the form record. Text values are copied as stored.
    pub fn from_record(record: &Record) -> Result<Self, CoreError> {
        let selected_class = text(record, FIELD_SELECTED_CLASS)?.parse::<ProgramClass>()?;
        let documents = record
            .get(FIELD_DOCUMENTS)
            .and_then(|v| v.as_files())
            .map(<[FileDescriptor]>::to_vec)
            .unwrap_or_default();

        Ok(Self {
            reference: Uuid::now_v7(),
            submitted_at: Utc::now(),
            name: text(record, FIELD_NAME)?.to_string(),
            mobile_number: text(record, FIELD_MOBILE_NUMBER)?.to_string(),
            address: text(record, FIELD_ADDRESS)?.to_string(),
            selected_class,
            documents,
        })
    }
}

fn text<'a>(record: &'a Record, field: &str) -> Result<&'a str, CoreError> {
    match record.get(field) {
        None => Ok(""),
        Some(value) => value.as_text().ok_or_else(|| CoreError::WrongValueKind {
            field: field.to_string(),
            expected: "text",
        }),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The side effect itself failed (network, storage, ...).
    #[error("Submission failed: {0}")]
    Failed(String),

    /// The record could not be turned into an application.
    #[error(transparent)]
    InvalidApplication(#[from] CoreError),
}

/// Result of one submit attempt.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The side effect ran and succeeded.
    Submitted(AdmissionApplication),
    /// Validation failed; the side effect never ran.
    Rejected(ErrorMap),
    /// The side effect ran and failed; the general error is set.
    Failed(SubmitError),
}

/// Performs the submission side effect.
pub trait Submitter: Send + Sync {
    fn submit(
        &self,
        application: &AdmissionApplication,
    ) -> impl Future<Output = Result<(), SubmitError>> + Send;
}

/// Logs the application instead of sending it anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSubmitter;

impl Submitter for LoggingSubmitter {
    async fn submit(&self, application: &AdmissionApplication) -> Result<(), SubmitError> {
        tracing::info!(
            reference = %application.reference,
            name = %application.name,
            class = %application.selected_class,
            documents = application.documents.len(),
            "Form submitted"
        );
        Ok(())
    }
}
