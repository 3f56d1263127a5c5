//! Header-to-index resolution.
//!
//! Columns are matched by exact header text, so a log may list them in any
//! order. A declared column that is absent resolves to `None`; it is up to the
//! caller to decide whether that is fatal.

use crate::schema::{Channel, ColumnSchema};
use csv::{Reader, ReaderBuilder, StringRecord};

/// CSV reader over log text, trimmed as a whole first.
///
/// Quotes have no special meaning and rows may be of any width, so short
/// rows reach the caller and can be skipped there. Both `\n` and `\r\n`
/// line endings are accepted and blank lines are ignored.
pub fn log_reader(text: &str) -> Reader<&[u8]> {
    ReaderBuilder::new()
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_reader(text.trim().as_bytes())
}

/// The header row, or `None` when the text is blank.
pub fn read_header(text: &str) -> Option<StringRecord> {
    log_reader(text).records().next()?.ok()
}

/// Position of `name` in the header, if present.
pub fn find_column(header: &[&str], name: &str) -> Option<usize> {
    header.iter().position(|h| *h == name)
}

/// A declared column together with where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub channel: Channel,
    pub header: String,
    pub required: bool,
    pub index: Option<usize>,
}

/// Result of resolving a [`ColumnSchema`] against a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    columns: Vec<ResolvedColumn>,
    header_width: usize,
}

impl ColumnMap {
    /// Index of the channel's column, or `None` if undeclared or absent.
    pub fn index(&self, channel: Channel) -> Option<usize> {
        self.columns
            .iter()
            .find(|c| c.channel == channel)
            .and_then(|c| c.index)
    }

    /// Number of fields in the header row.
    pub fn header_width(&self) -> usize {
        self.header_width
    }

    pub fn columns(&self) -> &[ResolvedColumn] {
        &self.columns
    }

    /// Headers of required columns that were not found.
    pub fn missing_required(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.required && c.index.is_none())
            .map(|c| c.header.as_str())
            .collect()
    }

    /// Headers of optional columns that were not found.
    pub fn missing_optional(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| !c.required && c.index.is_none())
            .map(|c| c.header.as_str())
            .collect()
    }

    /// True when every required column is present.
    pub fn is_complete(&self) -> bool {
        self.columns.iter().all(|c| !c.required || c.index.is_some())
    }
}

/// Map each channel declared by `schema` to its column in `header`.
pub fn resolve_columns(header: &[&str], schema: &ColumnSchema) -> ColumnMap {
    let columns = schema
        .columns()
        .iter()
        .map(|spec| ResolvedColumn {
            channel: spec.channel,
            header: spec.header.clone(),
            required: spec.required,
            index: find_column(header, &spec.header),
        })
        .collect();

    ColumnMap {
        columns,
        header_width: header.len(),
    }
}
