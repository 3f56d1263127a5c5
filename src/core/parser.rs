//! The configurable sensor log parser.

use crate::core::decoder::{decode_motion, decode_predictions};
use crate::core::series::{NormalizedSeries, PredictionSeries};
use crate::schema::{
    AlignmentPolicy, ColumnSchema, MissingValuePolicy, PredictionSchema, SchemaVariant,
};
use serde::{Deserialize, Serialize};

/// Errors raised while turning log text into a [`NormalizedSeries`].
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("log is empty")]
    EmptyInput,
    #[error("missing required columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },
    #[error("no prediction schema configured")]
    NoPredictionSchema,
    #[error("motion log has {motion} rows but prediction log has {predictions}")]
    RowCountMismatch { motion: usize, predictions: usize },
}

/// Everything that shapes how a log is decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserOptions {
    pub schema: ColumnSchema,
    pub missing_value_policy: MissingValuePolicy,
    pub prediction_schema: Option<PredictionSchema>,
    pub alignment: AlignmentPolicy,
}

impl ParserOptions {
    /// Options matching a built-in variant, with the default alignment policy.
    pub fn for_variant(variant: SchemaVariant) -> Self {
        Self {
            schema: variant.column_schema(),
            missing_value_policy: variant.missing_value_policy(),
            prediction_schema: variant.prediction_schema(),
            alignment: AlignmentPolicy::default(),
        }
    }
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self::for_variant(SchemaVariant::default())
    }
}

/// Turns raw sensor log text into normalized series.
///
/// The parser holds only its options, so one instance can be shared and
/// used for any number of independent parses.
#[derive(Debug, Clone, Default)]
pub struct SensorLogParser {
    options: ParserOptions,
}

impl SensorLogParser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    pub fn for_variant(variant: SchemaVariant) -> Self {
        Self::new(ParserOptions::for_variant(variant))
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse a motion/distance log.
    pub fn parse(&self, motion_text: &str) -> Result<NormalizedSeries, ParseError> {
        decode_motion(
            motion_text,
            &self.options.schema,
            self.options.missing_value_policy,
        )
    }

    /// Parse a prediction log on its own time axis.
    pub fn parse_predictions(&self, text: &str) -> Result<PredictionSeries, ParseError> {
        let schema = self
            .options
            .prediction_schema
            .as_ref()
            .ok_or(ParseError::NoPredictionSchema)?;
        decode_predictions(text, schema)
    }

    /// Parse a motion log and its prediction log, then align them.
    pub fn parse_with_predictions(
        &self,
        motion_text: &str,
        prediction_text: &str,
    ) -> Result<NormalizedSeries, ParseError> {
        let series = self.parse(motion_text)?;
        let predictions = self.parse_predictions(prediction_text)?;
        series.attach_predictions(predictions, self.options.alignment)
    }
}
