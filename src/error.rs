use thiserror::Error;

pub type ModexResult<T> = Result<T, ModexError>;

#[derive(Error, Debug)]
pub enum ModexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read workbook: {0}")]
    Workbook(#[from] calamine::XlsxError),

    #[error("Failed to update workbook: {0}")]
    Spreadsheet(String),

    #[error("Invalid reference `{reference}`: {reason}")]
    Reference { reference: String, reason: String },

    #[error("Unresolved reference: {0}")]
    UnresolvedReference(String),

    #[error("Invalid diff payload: {0}")]
    InvalidDiff(String),

    #[error("Value shape does not match range {range}: {reason}")]
    ShapeMismatch { range: String, reason: String },

    #[error("Watch error: {0}")]
    Watch(String),
}

impl ModexError {
    pub(crate) fn reference(reference: &str, reason: impl Into<String>) -> Self {
        ModexError::Reference {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }
}
