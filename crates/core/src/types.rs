use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Current field values keyed by field name.
pub type Record = HashMap<String, FieldValue>;

// ---------------------------------------------------------------------------
// FileDescriptor
// ---------------------------------------------------------------------------

/// An uploaded file as reported by the host UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// File name including its extension (e.g. "transcript.pdf").
    pub name: String,
    /// File size in bytes.
    pub size: u64,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    /// Lowercase text after the last `.`; the whole name if there is no dot.
    pub fn extension(&self) -> String {
        self.name
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }
}

// ---------------------------------------------------------------------------
// FieldValue
// ---------------------------------------------------------------------------

/// The value of one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Files(Vec<FileDescriptor>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Length used by the length checks: characters for text, count for files.
    pub fn len(&self) -> usize {
        match self {
            Self::Text(s) => s.chars().count(),
            Self::Files(files) => files.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a custom validator should see this value at all.
    ///
    /// Empty text counts as absent; any file list, even an empty one, is
    /// present.
    pub fn is_present(&self) -> bool {
        match self {
            Self::Text(s) => !s.is_empty(),
            Self::Files(_) => true,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Files(_) => None,
        }
    }

    pub fn as_files(&self) -> Option<&[FileDescriptor]> {
        match self {
            Self::Text(_) => None,
            Self::Files(files) => Some(files),
        }
    }

    /// Copy of the value with surrounding whitespace removed from text.
    pub fn trimmed(&self) -> Self {
        match self {
            Self::Text(s) => Self::Text(s.trim().to_string()),
            Self::Files(files) => Self::Files(files.clone()),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<FileDescriptor>> for FieldValue {
    fn from(files: Vec<FileDescriptor>) -> Self {
        Self::Files(files)
    }
}

// ---------------------------------------------------------------------------
// ProgramClass
// ---------------------------------------------------------------------------

/// The programs an applicant can apply for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgramClass {
    #[serde(rename = "BCA 1st")]
    Bca1st,
    #[serde(rename = "MCA 1st")]
    Mca1st,
    #[serde(rename = "MCA 2nd")]
    Mca2nd,
}

impl ProgramClass {
    pub const ALL: [ProgramClass; 3] = [Self::Bca1st, Self::Mca1st, Self::Mca2nd];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bca1st => "BCA 1st",
            Self::Mca1st => "MCA 1st",
            Self::Mca2nd => "MCA 2nd",
        }
    }
}

impl std::fmt::Display for ProgramClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgramClass {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|class| class.as_str() == s)
            .ok_or_else(|| CoreError::UnknownClass(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased_last_segment() {
        assert_eq!(FileDescriptor::new("Scan.Final.PDF", 1).extension(), "pdf");
        assert_eq!(FileDescriptor::new("photo.jpeg", 1).extension(), "jpeg");
    }

    #[test]
    fn extension_of_dotless_name_is_the_name() {
        assert_eq!(FileDescriptor::new("README", 1).extension(), "readme");
    }

    #[test]
    fn text_length_counts_characters() {
        assert_eq!(FieldValue::text("Zoë").len(), 3);
    }

    #[test]
    fn empty_file_list_is_present_but_empty() {
        let value = FieldValue::Files(vec![]);
        assert!(value.is_present());
        assert!(value.is_empty());
        assert!(!FieldValue::text("").is_present());
    }

    #[test]
    fn trimmed_strips_whitespace() {
        assert_eq!(FieldValue::text("  Asha ").trimmed(), FieldValue::text("Asha"));
    }

    #[test]
    fn program_class_parses_display_names() {
        assert_eq!("MCA 2nd".parse::<ProgramClass>(), Ok(ProgramClass::Mca2nd));
        assert_eq!(
            "PhD".parse::<ProgramClass>(),
            Err(CoreError::UnknownClass("PhD".to_string()))
        );
    }

    #[test]
    fn field_value_deserializes_untagged() {
        let text: FieldValue = serde_json::from_str(r#""hello""#).unwrap();
        assert_eq!(text, FieldValue::text("hello"));

        let files: FieldValue =
            serde_json::from_str(r#"[{"name": "id.pdf", "size": 10}]"#).unwrap();
        assert_eq!(files, FieldValue::Files(vec![FileDescriptor::new("id.pdf", 10)]));
    }
}
