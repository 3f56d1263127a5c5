//! Schema variants and the policies that distinguish them.

use crate::schema::columns::{ColumnSchema, PredictionSchema};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a raw distance reading of exactly zero is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingValuePolicy {
    /// Zero means the sensor saw nothing; emit the missing marker
    ZeroAsMissing,
    /// Zero is a real reading
    #[default]
    ZeroAsLiteral,
}

impl MissingValuePolicy {
    /// Apply the policy to a parsed distance value. `None` is the missing marker.
    pub fn apply(self, value: f64) -> Option<f64> {
        match self {
            MissingValuePolicy::ZeroAsMissing if value == 0.0 => None,
            _ => Some(value),
        }
    }
}

/// Reconciliation when a prediction log and a motion log differ in row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentPolicy {
    /// Keep every motion row; pad or cut predictions to fit
    #[default]
    PadMissing,
    /// Cut every sequence to the shorter of the two
    Truncate,
    /// Refuse to merge
    Reject,
}

impl FromStr for AlignmentPolicy {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pad" | "pad-missing" | "pad_missing" => Ok(AlignmentPolicy::PadMissing),
            "truncate" => Ok(AlignmentPolicy::Truncate),
            "reject" => Ok(AlignmentPolicy::Reject),
            other => Err(UnknownName(other.to_string())),
        }
    }
}

/// A known combination of expected columns and missing-value policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVariant {
    /// One distance sensor, no predictions
    #[default]
    SingleSensor,
    /// Left/right sensors, zero readings are blind spots, prediction set A
    DualZeroAsMissing,
    /// Left/right sensors, zero readings kept, prediction set B
    DualZeroAsLiteral,
}

impl SchemaVariant {
    pub const ALL: [SchemaVariant; 3] = [
        SchemaVariant::SingleSensor,
        SchemaVariant::DualZeroAsMissing,
        SchemaVariant::DualZeroAsLiteral,
    ];

    pub fn column_schema(self) -> ColumnSchema {
        match self {
            SchemaVariant::SingleSensor => ColumnSchema::single_sensor(),
            SchemaVariant::DualZeroAsMissing | SchemaVariant::DualZeroAsLiteral => {
                ColumnSchema::dual_sensor()
            }
        }
    }

    pub fn missing_value_policy(self) -> MissingValuePolicy {
        match self {
            SchemaVariant::DualZeroAsMissing => MissingValuePolicy::ZeroAsMissing,
            SchemaVariant::SingleSensor | SchemaVariant::DualZeroAsLiteral => {
                MissingValuePolicy::ZeroAsLiteral
            }
        }
    }

    pub fn prediction_schema(self) -> Option<PredictionSchema> {
        match self {
            SchemaVariant::SingleSensor => None,
            SchemaVariant::DualZeroAsMissing => Some(PredictionSchema::set_a()),
            SchemaVariant::DualZeroAsLiteral => Some(PredictionSchema::set_b()),
        }
    }

    /// Short name used on the command line and in query strings.
    pub fn name(self) -> &'static str {
        match self {
            SchemaVariant::SingleSensor => "single",
            SchemaVariant::DualZeroAsMissing => "dual-missing",
            SchemaVariant::DualZeroAsLiteral => "dual-literal",
        }
    }

    /// Template file handed to contributors: the header plus one example row.
    pub fn template_csv(self) -> String {
        let example = match self {
            SchemaVariant::SingleSensor => "0,0.01,-0.02,0.98,0.5,-1.2,0.3,42.5",
            SchemaVariant::DualZeroAsMissing | SchemaVariant::DualZeroAsLiteral => {
                "0,0.01,-0.02,0.98,0.5,-1.2,0.3,42.5,40.1"
            }
        };
        format!("{}\n{}\n", self.column_schema().header_line(), example)
    }
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SchemaVariant {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" | "single-sensor" | "single_sensor" => Ok(SchemaVariant::SingleSensor),
            "dual-missing" | "dual_zero_as_missing" => Ok(SchemaVariant::DualZeroAsMissing),
            "dual-literal" | "dual_zero_as_literal" => Ok(SchemaVariant::DualZeroAsLiteral),
            other => Err(UnknownName(other.to_string())),
        }
    }
}

/// Unrecognized variant or policy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown name '{0}'")]
pub struct UnknownName(pub String);
