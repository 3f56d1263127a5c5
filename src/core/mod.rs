//! Core log parsing.
//!
//! This module contains:
//! - Column resolution from a header row
//! - Row decoding and normalization into aligned series
//! - Merging a prediction log onto a motion log

pub mod decoder;
pub mod parser;
pub mod resolver;
pub mod series;

// Re-export commonly used types
pub use decoder::{decode_motion, decode_predictions};
pub use parser::{ParseError, ParserOptions, SensorLogParser};
pub use resolver::{log_reader, read_header, resolve_columns, ColumnMap, ResolvedColumn};
pub use series::{
    Axes, ClassSeries, DistanceSample, DistanceSeries, NormalizedSeries, PredictionSeries, Sample,
};
