//! Upload-side checks run before a contributed log is accepted.
//!
//! Column checks go through the same resolver the parser uses, so the
//! required-column list cannot drift between the two.

use crate::core::resolver::{read_header, resolve_columns};
use crate::schema::ColumnSchema;
use serde::{Deserialize, Serialize};

/// Message shown when required columns are absent.
pub const INVALID_FORMAT: &str = "Invalid CSV format detected";

/// Message shown for an empty upload.
pub const EMPTY_FILE: &str = "CSV file is empty";

/// Outcome of checking a file's header against a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub missing_columns: Vec<String>,
}

impl ValidationReport {
    fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
            missing_columns: Vec::new(),
        }
    }

    fn invalid(error: &str, missing_columns: Vec<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(error.to_string()),
            missing_columns,
        }
    }

    /// Convert into a `Result` for fail-fast callers.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_valid {
            Ok(())
        } else if self.missing_columns.is_empty() {
            Err(ValidationError::EmptyFile)
        } else {
            Err(ValidationError::MissingColumns {
                missing: self.missing_columns,
            })
        }
    }
}

/// Reasons an upload is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("CSV file is empty")]
    EmptyFile,
    #[error("Invalid CSV format detected: missing {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },
    #[error("Please select a valid CSV file ('{0}' is not .csv)")]
    NotCsv(String),
}

/// Check that `text` carries every column `schema` requires.
pub fn validate_columns(text: &str, schema: &ColumnSchema) -> ValidationReport {
    let Some(header) = read_header(text) else {
        return ValidationReport::invalid(EMPTY_FILE, Vec::new());
    };
    let header: Vec<&str> = header.iter().collect();

    let map = resolve_columns(&header, schema);
    let missing: Vec<String> = map
        .missing_required()
        .into_iter()
        .map(str::to_string)
        .collect();

    if missing.is_empty() {
        ValidationReport::valid()
    } else {
        tracing::debug!(missing = ?missing, "Upload is missing required columns");
        ValidationReport::invalid(INVALID_FORMAT, missing)
    }
}

/// Accept only file names ending in `.csv`, in any case.
pub fn validate_file_name(name: &str) -> Result<(), ValidationError> {
    if name.to_lowercase().ends_with(".csv") {
        Ok(())
    } else {
        Err(ValidationError::NotCsv(name.to_string()))
    }
}

/// File name check followed by the column check.
pub fn validate_upload(name: &str, text: &str, schema: &ColumnSchema) -> Result<(), ValidationError> {
    validate_file_name(name)?;
    validate_columns(text, schema).into_result()
}
