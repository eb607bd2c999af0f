//! Admission form orchestration.
//!
//! [`AdmissionForm`] owns the field values and the derived error state. The
//! host UI feeds it field edits, document selections and submit requests,
//! and reads back the [`ErrorMap`](admission_core::ErrorMap), the submitting
//! flag and the general error.
//!
//! - [`form`]: the state owner and its event handlers.
//! - [`submit`]: the [`Submitter`] seam and the submitted application.
//! - [`config`]: environment-driven settings for the document scanner.

pub mod config;
pub mod form;
pub mod submit;

pub use config::FormConfig;
pub use form::{AdmissionForm, DocumentCheckOutcome, DocumentCheckTicket};
pub use submit::{AdmissionApplication, LoggingSubmitter, SubmitError, SubmitOutcome, Submitter};
