//! Application input files and the report printed for them.

use std::path::Path;

use admission_core::schema::{
    FIELD_ADDRESS, FIELD_MOBILE_NUMBER, FIELD_NAME, FIELD_SELECTED_CLASS,
};
use admission_core::{DocumentScanner, ErrorMap, FileDescriptor};
use admission_form::{AdmissionForm, SubmitOutcome};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Field values as a host UI would have collected them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationInput {
    pub name: String,
    pub mobile_number: String,
    pub address: String,
    pub selected_class: String,
    pub documents: Vec<FileDescriptor>,
}

impl ApplicationInput {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Malformed application in {}", path.display()))
    }

    /// Replay the input as UI events: one edit per text field, then the
    /// document selection and its check.
    pub async fn apply<D: DocumentScanner>(
        &self,
        form: &mut AdmissionForm,
        scanner: &D,
    ) -> anyhow::Result<()> {
        for (field, value) in [
            (FIELD_NAME, &self.name),
            (FIELD_MOBILE_NUMBER, &self.mobile_number),
            (FIELD_ADDRESS, &self.address),
            (FIELD_SELECTED_CLASS, &self.selected_class),
        ] {
            form.change_field(field, value.as_str())?;
        }
        form.select_and_check_documents(self.documents.clone(), scanner)
            .await;
        Ok(())
    }
}

/// What the runner prints after submitting.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReport {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<Uuid>,
    pub errors: ErrorMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_error: Option<String>,
}

impl SubmitReport {
    pub fn new(outcome: &SubmitOutcome, form: &AdmissionForm) -> Self {
        let (status, reference) = match outcome {
            SubmitOutcome::Submitted(application) => ("submitted", Some(application.reference)),
            SubmitOutcome::Rejected(_) => ("rejected", None),
            SubmitOutcome::Failed(_) => ("failed", None),
        };
        Self {
            status,
            reference,
            errors: form.errors().iter().collect(),
            general_error: form.general_error().map(str::to_string),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "submitted"
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use admission_core::documents::{
        ImmediateSleeper, SimulatedScanner, MAX_DOCUMENT_SIZE_BYTES,
    };
    use admission_form::LoggingSubmitter;

    use super::*;

    fn write_input(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    fn scanner() -> SimulatedScanner<ImmediateSleeper> {
        SimulatedScanner::with_sleeper(
            MAX_DOCUMENT_SIZE_BYTES,
            Duration::ZERO,
            ImmediateSleeper,
        )
    }

    const VALID: &str = r#"{
        "name": "Asha Verma",
        "mobileNumber": "9876543210",
        "address": "12 Lake Road, Pune",
        "selectedClass": "BCA 1st",
        "documents": [{"name": "id.pdf", "size": 1000}]
    }"#;

    #[test]
    fn loads_camel_case_input() {
        let file = write_input(VALID);
        let input = ApplicationInput::load(file.path()).unwrap();
        assert_eq!(input.mobile_number, "9876543210");
        assert_eq!(input.documents, vec![FileDescriptor::new("id.pdf", 1000)]);
    }

    #[test]
    fn missing_keys_default_to_empty() {
        let file = write_input(r#"{"name": "Asha"}"#);
        let input = ApplicationInput::load(file.path()).unwrap();
        assert_eq!(input.address, "");
        assert!(input.documents.is_empty());
    }

    #[test]
    fn malformed_input_names_the_file() {
        let file = write_input("not json");
        let err = ApplicationInput::load(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Malformed application"));
    }

    #[tokio::test]
    async fn valid_input_submits() {
        let input: ApplicationInput = serde_json::from_str(VALID).unwrap();
        let mut form = AdmissionForm::new();
        input.apply(&mut form, &scanner()).await.unwrap();

        let outcome = form.submit(&LoggingSubmitter).await;
        let report = SubmitReport::new(&outcome, &form);
        assert!(report.is_success());
        assert!(report.reference.is_some());
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn invalid_input_reports_errors() {
        let input = ApplicationInput {
            mobile_number: "12345".into(),
            ..Default::default()
        };
        let mut form = AdmissionForm::new();
        input.apply(&mut form, &scanner()).await.unwrap();

        let outcome = form.submit(&LoggingSubmitter).await;
        let report = SubmitReport::new(&outcome, &form);
        assert_eq!(report.status, "rejected");
        assert!(report.errors.has_error(FIELD_MOBILE_NUMBER));

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("reference").is_none());
        assert_eq!(json["errors"]["mobileNumber"], "Invalid format.");
    }
}
