//! The form state owner.
//!
//! [`AdmissionForm`] holds the field values, the error map derived from
//! them, the verdict of the current document check and the submitting flag.
//! Every handler recomputes the error map from the values as they are after
//! the event, so the map never lags one edit behind.
//!
//! Document checks are split in three steps so that field edits can keep
//! flowing while a scan is in flight:
//!
//! 1. [`AdmissionForm::select_documents`] stores the files and issues a
//!    [`DocumentCheckTicket`] stamped with a new generation.
//! 2. [`DocumentCheckTicket::run`] awaits the scanner without touching the
//!    form.
//! 3. [`AdmissionForm::apply_document_outcome`] merges the outcome, unless a
//!    newer selection has been made since, in which case it is dropped.

use std::sync::Arc;

use admission_core::documents::{check_documents, DocumentError, DocumentScanner};
use admission_core::schema::{admission_schema, FIELDS, FIELD_DOCUMENTS};
use admission_core::{
    validate, CoreError, ErrorMap, FieldValue, FileDescriptor, Record, RuleSchema,
};
use tokio::sync::watch;

use crate::submit::{
    AdmissionApplication, SubmitError, SubmitOutcome, Submitter, GENERAL_SUBMIT_ERROR,
};

// ---------------------------------------------------------------------------
// Document check handoff
// ---------------------------------------------------------------------------

/// A pending document check for one selection.
#[derive(Debug, Clone)]
pub struct DocumentCheckTicket {
    pub generation: u64,
    pub files: Vec<FileDescriptor>,
}

impl DocumentCheckTicket {
    /// Scan the ticket's files.
    pub async fn run<D: DocumentScanner>(self, scanner: &D) -> DocumentCheckOutcome {
        let result = check_documents(&self.files, scanner).await;
        DocumentCheckOutcome {
            generation: self.generation,
            result,
        }
    }
}

/// The resolved verdict of a document check.
#[derive(Debug, Clone)]
pub struct DocumentCheckOutcome {
    pub generation: u64,
    pub result: Result<(), DocumentError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ScanState {
    Idle,
    Pending,
    Passed,
    Failed(String),
}

// ---------------------------------------------------------------------------
// Submitting flag
// ---------------------------------------------------------------------------

/// Raises the submitting flag for its lifetime.
struct SubmittingGuard(Arc<watch::Sender<bool>>);

impl SubmittingGuard {
    fn engage(flag: &Arc<watch::Sender<bool>>) -> Self {
        flag.send_replace(true);
        Self(Arc::clone(flag))
    }
}

impl Drop for SubmittingGuard {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}

// ---------------------------------------------------------------------------
// AdmissionForm
// ---------------------------------------------------------------------------

pub struct AdmissionForm {
    schema: RuleSchema,
    values: Record,
    errors: ErrorMap,
    general_error: Option<String>,
    document_generation: u64,
    document_scan: ScanState,
    submitting: Arc<watch::Sender<bool>>,
}

impl Default for AdmissionForm {
    fn default() -> Self {
        Self::new()
    }
}

impl AdmissionForm {
    /// An empty admission form. No errors are shown until the first event.
    pub fn new() -> Self {
        let (submitting, _) = watch::channel(false);
        Self {
            schema: admission_schema(),
            values: empty_values(),
            errors: ErrorMap::new(),
            general_error: None,
            document_generation: 0,
            document_scan: ScanState::Idle,
            submitting: Arc::new(submitting),
        }
    }

    // -- Outbound state ---------------------------------------------------

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn general_error(&self) -> Option<&str> {
        self.general_error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        *self.submitting.borrow()
    }

    /// Watch the submitting flag, e.g. to disable controls.
    pub fn subscribe_submitting(&self) -> watch::Receiver<bool> {
        self.submitting.subscribe()
    }

    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Generation of the newest document selection.
    pub fn document_generation(&self) -> u64 {
        self.document_generation
    }

    /// Whether a document check for the current selection is still out.
    pub fn is_checking_documents(&self) -> bool {
        self.document_scan == ScanState::Pending
    }

    // -- Inbound events ---------------------------------------------------

    /// Store a text field's new value and recompute errors.
    pub fn change_field(
        &mut self,
        field: &str,
        value: impl Into<String>,
    ) -> Result<(), CoreError> {
        let rule = self
            .schema
            .rule(field)
            .ok_or_else(|| CoreError::UnknownField(field.to_string()))?;
        if matches!(self.values.get(field), Some(FieldValue::Files(_))) {
            return Err(CoreError::WrongValueKind {
                field: field.to_string(),
                expected: "file list",
            });
        }

        let mut value = FieldValue::Text(value.into());
        if rule.trim {
            value = value.trimmed();
        }
        self.values.insert(field.to_string(), value);
        self.recompute();
        tracing::debug!(field, errors = self.errors.len(), "Field changed");
        Ok(())
    }

    /// Replace the document selection and issue a check for it.
    pub fn select_documents(&mut self, files: Vec<FileDescriptor>) -> DocumentCheckTicket {
        self.document_generation += 1;
        self.document_scan = ScanState::Pending;
        self.values
            .insert(FIELD_DOCUMENTS.to_string(), FieldValue::Files(files.clone()));
        self.recompute();
        tracing::debug!(
            generation = self.document_generation,
            file_count = files.len(),
            "Documents selected"
        );
        DocumentCheckTicket {
            generation: self.document_generation,
            files,
        }
    }

    /// Merge a document check outcome. Returns `false` if it was stale.
    pub fn apply_document_outcome(&mut self, outcome: DocumentCheckOutcome) -> bool {
        if outcome.generation != self.document_generation {
            tracing::debug!(
                stale = outcome.generation,
                current = self.document_generation,
                "Discarding superseded document check"
            );
            return false;
        }

        self.document_scan = match outcome.result {
            Ok(()) => ScanState::Passed,
            Err(e) => ScanState::Failed(e.to_string()),
        };
        self.recompute();
        true
    }

    /// Select documents, wait for the check and merge it in one step.
    pub async fn select_and_check_documents<D: DocumentScanner>(
        &mut self,
        files: Vec<FileDescriptor>,
        scanner: &D,
    ) -> bool {
        let outcome = self.select_documents(files).run(scanner).await;
        self.apply_document_outcome(outcome)
    }

    /// Validate and, if clean, run the submission side effect.
    pub async fn submit<T: Submitter>(&mut self, submitter: &T) -> SubmitOutcome {
        let _submitting = SubmittingGuard::engage(&self.submitting);
        self.general_error = None;
        self.recompute();

        if !self.errors.is_empty() {
            tracing::debug!(errors = self.errors.len(), "Submission blocked by validation");
            return SubmitOutcome::Rejected(self.errors.clone());
        }

        let result = match AdmissionApplication::from_record(&self.values) {
            Ok(application) => submitter.submit(&application).await.map(|()| application),
            Err(e) => Err(SubmitError::from(e)),
        };

        match result {
            Ok(application) => {
                tracing::info!(reference = %application.reference, "Application submitted");
                self.reset();
                SubmitOutcome::Submitted(application)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Form submission error");
                self.general_error = Some(GENERAL_SUBMIT_ERROR.to_string());
                SubmitOutcome::Failed(e)
            }
        }
    }

    // -- Internals --------------------------------------------------------

    fn recompute(&mut self) {
        let mut errors = validate(&self.schema, &self.values);
        if let ScanState::Failed(message) = &self.document_scan {
            errors.insert(FIELD_DOCUMENTS, message.clone());
        }
        self.errors = errors;
    }

    /// Back to a pristine form. Outstanding document checks become stale.
    fn reset(&mut self) {
        self.values = empty_values();
        self.errors = ErrorMap::new();
        self.document_generation += 1;
        self.document_scan = ScanState::Idle;
    }
}

fn empty_values() -> Record {
    FIELDS
        .iter()
        .map(|&field| {
            let value = if field == FIELD_DOCUMENTS {
                FieldValue::Files(Vec::new())
            } else {
                FieldValue::default()
            };
            (field.to_string(), value)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use admission_core::documents::{
        ImmediateSleeper, SimulatedScanner, MAX_DOCUMENT_SIZE_BYTES, SCAN_FAILED_MESSAGE,
    };
    use admission_core::schema::{
        FIELD_ADDRESS, FIELD_MOBILE_NUMBER, FIELD_NAME, INVALID_DOCUMENTS_MESSAGE,
    };
    use admission_core::validation::rules::REQUIRED_MESSAGE;

    use super::*;
    use crate::config::FormConfig;

    /// Rejects every selection with a fixed reason.
    struct RejectingScanner(&'static str);

    impl DocumentScanner for RejectingScanner {
        async fn scan(&self, _files: &[FileDescriptor]) -> Result<(), DocumentError> {
            Err(DocumentError::ScanFailed(self.0.to_string()))
        }
    }

    fn scanner() -> SimulatedScanner<ImmediateSleeper> {
        SimulatedScanner::with_sleeper(
            MAX_DOCUMENT_SIZE_BYTES,
            Duration::from_secs(1),
            ImmediateSleeper,
        )
    }

    const TOO_LARGE: &str = "One or more documents exceed the maximum allowed size (1MB).";

    #[test]
    fn new_form_is_pristine() {
        let form = AdmissionForm::new();
        assert!(form.errors().is_empty());
        assert!(!form.is_submitting());
        assert_eq!(form.value(FIELD_DOCUMENTS), Some(&FieldValue::Files(vec![])));
    }

    #[test]
    fn change_recomputes_with_new_value() {
        let mut form = AdmissionForm::new();
        form.change_field(FIELD_MOBILE_NUMBER, "1234567890").unwrap();
        assert!(!form.errors().has_error(FIELD_MOBILE_NUMBER));
        assert_eq!(form.errors().get(FIELD_NAME), Some(REQUIRED_MESSAGE));

        form.change_field(FIELD_MOBILE_NUMBER, "12345").unwrap();
        assert!(form.errors().has_error(FIELD_MOBILE_NUMBER));
    }

    #[test]
    fn name_is_stored_trimmed() {
        let mut form = AdmissionForm::new();
        form.change_field(FIELD_NAME, "  Asha  ").unwrap();
        assert_eq!(form.value(FIELD_NAME), Some(&FieldValue::text("Asha")));
        form.change_field(FIELD_ADDRESS, "  padded  ").unwrap();
        assert_eq!(form.value(FIELD_ADDRESS), Some(&FieldValue::text("  padded  ")));
    }

    #[test]
    fn unknown_field_is_an_error() {
        let mut form = AdmissionForm::new();
        assert_eq!(
            form.change_field("nickname", "Ash"),
            Err(CoreError::UnknownField("nickname".to_string()))
        );
    }

    #[test]
    fn documents_cannot_be_set_as_text() {
        let mut form = AdmissionForm::new();
        assert_eq!(
            form.change_field(FIELD_DOCUMENTS, "id.pdf"),
            Err(CoreError::WrongValueKind {
                field: FIELD_DOCUMENTS.to_string(),
                expected: "file list",
            })
        );
    }

    #[test]
    fn selection_runs_sync_validator_immediately() {
        let mut form = AdmissionForm::new();
        form.select_documents(vec![FileDescriptor::new("photo.gif", 10)]);
        assert!(form.is_checking_documents());
        assert_eq!(form.errors().get(FIELD_DOCUMENTS), Some(INVALID_DOCUMENTS_MESSAGE));
    }

    #[tokio::test]
    async fn failed_scan_overrides_sync_verdict_and_survives_edits() {
        let mut form = AdmissionForm::new();
        let ticket = form.select_documents(vec![FileDescriptor::new("scan.pdf", 2_000_000)]);
        assert!(!form.errors().has_error(FIELD_DOCUMENTS));

        let outcome = ticket.run(&scanner()).await;
        assert!(form.apply_document_outcome(outcome));
        assert_eq!(form.errors().get(FIELD_DOCUMENTS), Some(TOO_LARGE));

        form.change_field(FIELD_NAME, "Asha").unwrap();
        assert_eq!(form.errors().get(FIELD_DOCUMENTS), Some(TOO_LARGE));
    }

    #[tokio::test]
    async fn passing_scan_keeps_sync_verdict() {
        let mut form = AdmissionForm::new();
        let applied = form
            .select_and_check_documents(vec![FileDescriptor::new("photo.gif", 10)], &scanner())
            .await;
        assert!(applied);
        assert!(!form.is_checking_documents());
        assert_eq!(form.errors().get(FIELD_DOCUMENTS), Some(INVALID_DOCUMENTS_MESSAGE));
    }

    #[tokio::test]
    async fn stale_outcome_is_discarded() {
        let mut form = AdmissionForm::new();
        let first = form.select_documents(vec![FileDescriptor::new("big.pdf", 2_000_000)]);
        let second = form.select_documents(vec![FileDescriptor::new("small.pdf", 500_000)]);

        let second_outcome = second.run(&scanner()).await;
        assert!(form.apply_document_outcome(second_outcome));

        let first_outcome = first.run(&scanner()).await;
        assert!(!form.apply_document_outcome(first_outcome));
        assert!(!form.errors().has_error(FIELD_DOCUMENTS));
    }

    #[tokio::test]
    async fn new_selection_clears_previous_scan_failure() {
        let mut form = AdmissionForm::new();
        form.select_and_check_documents(
            vec![FileDescriptor::new("big.pdf", 2_000_000)],
            &scanner(),
        )
        .await;
        assert!(form.errors().has_error(FIELD_DOCUMENTS));

        form.select_documents(vec![FileDescriptor::new("small.pdf", 1)]);
        assert!(!form.errors().has_error(FIELD_DOCUMENTS));
    }

    #[tokio::test]
    async fn scanner_failure_without_reason_uses_fallback_message() {
        let mut form = AdmissionForm::new();
        let applied = form
            .select_and_check_documents(
                vec![FileDescriptor::new("id.pdf", 10)],
                &RejectingScanner(""),
            )
            .await;
        assert!(applied);
        assert_eq!(form.errors().get(FIELD_DOCUMENTS), Some(SCAN_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn scanner_failure_reason_is_shown() {
        let mut form = AdmissionForm::new();
        form.select_and_check_documents(
            vec![FileDescriptor::new("id.pdf", 10)],
            &RejectingScanner("Virus detected."),
        )
        .await;
        assert_eq!(form.errors().get(FIELD_DOCUMENTS), Some("Virus detected."));
    }

    #[tokio::test]
    async fn configured_scanner_waits_on_the_timer() {
        let delay = Duration::from_millis(10);
        let config = FormConfig {
            document_scan_delay: delay,
            ..FormConfig::default()
        };
        let mut form = AdmissionForm::new();

        let started = Instant::now();
        let applied = form
            .select_and_check_documents(
                vec![FileDescriptor::new("scan.pdf", 2_000_000)],
                &config.scanner(),
            )
            .await;

        assert!(started.elapsed() >= delay);
        assert!(applied);
        assert_eq!(form.errors().get(FIELD_DOCUMENTS), Some(TOO_LARGE));
    }
}
