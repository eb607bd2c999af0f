#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field {field} expects a {expected} value")]
    WrongValueKind {
        field: String,
        expected: &'static str,
    },

    #[error("Unknown class: {0}")]
    UnknownClass(String),
}
