//! Column layouts of the sensor and prediction logs.
//!
//! This module contains:
//! - Header names and the [`ColumnSchema`] / [`PredictionSchema`] declarations
//! - The built-in [`SchemaVariant`]s and the policies they select

pub mod columns;
pub mod variant;

// Re-export commonly used types
pub use columns::{Channel, ColumnSchema, ColumnSpec, PredictionSchema};
pub use variant::{AlignmentPolicy, MissingValuePolicy, SchemaVariant, UnknownName};
