//! SensorLog Dashboard - ingestion and normalization of sensor logs.
//!
//! This library turns the CSV logs written by a wearable motion rig
//! (accelerometer, gyroscope, ultrasonic distance, optional model
//! prediction scores) into time-aligned series ready for charting.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   SensorLog Dashboard                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌──────────────────┐   │
//! │  │   Column    │──▶│    Row      │──▶│ NormalizedSeries │   │
//! │  │  Resolver   │   │  Decoder    │   │  (+ predictions) │   │
//! │  └─────────────┘   └─────────────┘   └──────────────────┘   │
//! │         │                                 │      │          │
//! │         ▼                                 ▼      ▼          │
//! │  ┌─────────────┐                  ┌─────────┐ ┌─────────┐   │
//! │  │ Validation  │                  │ Summary │ │ Export  │   │
//! │  └─────────────┘                  └─────────┘ └─────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use sensorlog_dashboard::{SchemaVariant, SensorLogParser};
//!
//! let text = "Timestamp(ms),AccelX(g),AccelY(g),AccelZ(g),GyroX(deg/s),GyroY(deg/s),GyroZ(deg/s),Distance(cm)\n\
//!             1000,0.1,0.2,0.3,1,2,3,50\n\
//!             1500,0.1,0.2,0.3,1,2,3,55";
//!
//! let parser = SensorLogParser::for_variant(SchemaVariant::SingleSensor);
//! let series = parser.parse(text).unwrap();
//! assert_eq!(series.time, vec![0.0, 0.5]);
//! assert_eq!(series.distance.primary(), &[Some(50.0), Some(55.0)]);
//! ```

pub mod config;
pub mod core;
pub mod export;
pub mod predict;
pub mod schema;
pub mod summary;
pub mod validation;

#[cfg(feature = "server")]
pub mod server;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use self::core::{NormalizedSeries, ParseError, ParserOptions, PredictionSeries, SensorLogParser};
pub use export::{ExportError, ExportRow, ExportTable, EXPORT_HEADER};
pub use schema::{
    AlignmentPolicy, Channel, ColumnSchema, MissingValuePolicy, PredictionSchema, SchemaVariant,
};
pub use summary::{summarize, LogSummary};
pub use validation::{validate_columns, ValidationError, ValidationReport};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SensorLogParser>();
        assert_send_sync::<NormalizedSeries>();
    }
}
