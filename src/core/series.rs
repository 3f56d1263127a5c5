//! Normalized, index-aligned output of the parser.
//!
//! Every sequence in a [`NormalizedSeries`] has the same length and index `i`
//! refers to the same logical sample everywhere. Distance and prediction
//! values use `None` as the missing marker; a field that failed to parse is
//! `NaN`. Both serialize to JSON `null`, which chart consumers skip.

use crate::core::parser::ParseError;
use crate::schema::AlignmentPolicy;
use serde::Serialize;

/// Three parallel axis sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Axes {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl Axes {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            z: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, x: f64, y: f64, z: f64) {
        self.x.push(x);
        self.y.push(y);
        self.z.push(z);
    }

    /// Values of all three axes at `index`.
    pub fn at(&self, index: usize) -> Option<[f64; 3]> {
        Some([
            *self.x.get(index)?,
            *self.y.get(index)?,
            *self.z.get(index)?,
        ])
    }

    fn lengths(&self) -> [usize; 3] {
        [self.x.len(), self.y.len(), self.z.len()]
    }

    fn truncate(&mut self, len: usize) {
        self.x.truncate(len);
        self.y.truncate(len);
        self.z.truncate(len);
    }
}

/// Ultrasonic distance readings for one or two sensors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistanceSeries {
    Single { values: Vec<Option<f64>> },
    Dual {
        left: Vec<Option<f64>>,
        right: Vec<Option<f64>>,
    },
}

impl DistanceSeries {
    /// Reading(s) at `index`.
    pub fn at(&self, index: usize) -> Option<DistanceSample> {
        match self {
            DistanceSeries::Single { values } => values.get(index).map(|v| DistanceSample::Single(*v)),
            DistanceSeries::Dual { left, right } => Some(DistanceSample::Dual {
                left: *left.get(index)?,
                right: *right.get(index)?,
            }),
        }
    }

    /// The channel used where only one distance fits (single, or left of a pair).
    pub fn primary(&self) -> &[Option<f64>] {
        match self {
            DistanceSeries::Single { values } => values,
            DistanceSeries::Dual { left, .. } => left,
        }
    }

    fn lengths(&self) -> Vec<usize> {
        match self {
            DistanceSeries::Single { values } => vec![values.len()],
            DistanceSeries::Dual { left, right } => vec![left.len(), right.len()],
        }
    }

    fn truncate(&mut self, len: usize) {
        match self {
            DistanceSeries::Single { values } => values.truncate(len),
            DistanceSeries::Dual { left, right } => {
                left.truncate(len);
                right.truncate(len);
            }
        }
    }
}

/// Distance reading(s) of one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DistanceSample {
    Single(Option<f64>),
    Dual {
        left: Option<f64>,
        right: Option<f64>,
    },
}

/// One named probability channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// A prediction log decoded on its own time axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PredictionSeries {
    /// Seconds since the first prediction row
    pub time: Vec<f64>,
    pub classes: Vec<ClassSeries>,
}

impl PredictionSeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Values of a class by name.
    pub fn class(&self, name: &str) -> Option<&[Option<f64>]> {
        self.classes
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }
}

/// Parsed sensor log ready for charting or export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedSeries {
    /// Seconds since the first row, rounded to two decimals
    pub time: Vec<f64>,
    pub accel: Axes,
    pub gyro: Axes,
    pub distance: DistanceSeries,
    /// Prediction channels aligned to `time`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Vec<ClassSeries>>,
}

impl NormalizedSeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Time values formatted the way they are shown on the chart axis.
    pub fn time_labels(&self) -> Vec<String> {
        self.time.iter().map(|t| format!("{t:.2}")).collect()
    }

    /// Values of a prediction class by name.
    pub fn prediction(&self, name: &str) -> Option<&[Option<f64>]> {
        self.prediction
            .as_ref()?
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Every channel's value at `index`, for live-value display.
    pub fn sample(&self, index: usize) -> Option<Sample> {
        let prediction = self
            .prediction
            .as_ref()
            .map(|classes| {
                classes
                    .iter()
                    .map(|c| (c.name.clone(), c.values.get(index).copied().flatten()))
                    .collect()
            })
            .unwrap_or_default();

        Some(Sample {
            index,
            time: *self.time.get(index)?,
            accel: self.accel.at(index)?,
            gyro: self.gyro.at(index)?,
            distance: self.distance.at(index)?,
            prediction,
        })
    }

    /// Whether every sequence has the same length as `time`.
    pub fn is_aligned(&self) -> bool {
        let len = self.len();
        let prediction_ok = self
            .prediction
            .as_ref()
            .map_or(true, |classes| classes.iter().all(|c| c.values.len() == len));

        self.accel.lengths().iter().all(|&l| l == len)
            && self.gyro.lengths().iter().all(|&l| l == len)
            && self.distance.lengths().iter().all(|&l| l == len)
            && prediction_ok
    }

    /// Merge a separately decoded prediction log onto this series.
    ///
    /// The prediction rows are matched to motion rows by position; the
    /// prediction file's own time axis is dropped. `policy` decides what
    /// happens when the row counts differ.
    pub fn attach_predictions(
        mut self,
        predictions: PredictionSeries,
        policy: AlignmentPolicy,
    ) -> Result<Self, ParseError> {
        let motion_rows = self.len();
        let prediction_rows = predictions.len();

        if motion_rows != prediction_rows {
            match policy {
                AlignmentPolicy::Reject => {
                    return Err(ParseError::RowCountMismatch {
                        motion: motion_rows,
                        predictions: prediction_rows,
                    });
                }
                AlignmentPolicy::Truncate => {
                    tracing::warn!(
                        motion_rows,
                        prediction_rows,
                        "Row count mismatch, truncating to the shorter log"
                    );
                }
                AlignmentPolicy::PadMissing => {
                    tracing::warn!(
                        motion_rows,
                        prediction_rows,
                        "Row count mismatch, fitting predictions to the motion log"
                    );
                }
            }
        }

        let target = match policy {
            AlignmentPolicy::Truncate => motion_rows.min(prediction_rows),
            _ => motion_rows,
        };

        if target < motion_rows {
            self.time.truncate(target);
            self.accel.truncate(target);
            self.gyro.truncate(target);
            self.distance.truncate(target);
        }

        let classes = predictions
            .classes
            .into_iter()
            .map(|mut class| {
                class.values.resize(target, None);
                class
            })
            .collect();
        self.prediction = Some(classes);

        debug_assert!(self.is_aligned());
        Ok(self)
    }
}

/// All channel values of a single sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub index: usize,
    pub time: f64,
    pub accel: [f64; 3],
    pub gyro: [f64; 3],
    pub distance: DistanceSample,
    pub prediction: Vec<(String, Option<f64>)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(rows: usize) -> NormalizedSeries {
        let mut accel = Axes::default();
        let mut gyro = Axes::default();
        let mut time = Vec::new();
        let mut values = Vec::new();
        for i in 0..rows {
            time.push(i as f64 * 0.5);
            accel.push(0.1, 0.2, 0.3);
            gyro.push(1.0, 2.0, 3.0);
            values.push(Some(50.0 + i as f64));
        }
        NormalizedSeries {
            time,
            accel,
            gyro,
            distance: DistanceSeries::Single { values },
            prediction: None,
        }
    }

    fn predictions(rows: usize) -> PredictionSeries {
        PredictionSeries {
            time: (0..rows).map(|i| i as f64).collect(),
            classes: vec![ClassSeries {
                name: "Fall".to_string(),
                values: vec![Some(0.25); rows],
            }],
        }
    }

    #[test]
    fn test_pad_missing_keeps_motion_rows() {
        let merged = series(4)
            .attach_predictions(predictions(2), AlignmentPolicy::PadMissing)
            .unwrap();

        assert_eq!(merged.len(), 4);
        assert!(merged.is_aligned());
        assert_eq!(
            merged.prediction("Fall").unwrap(),
            &[Some(0.25), Some(0.25), None, None]
        );
    }

    #[test]
    fn test_pad_missing_cuts_extra_predictions() {
        let merged = series(2)
            .attach_predictions(predictions(5), AlignmentPolicy::PadMissing)
            .unwrap();
        assert_eq!(merged.prediction("Fall").unwrap().len(), 2);
        assert!(merged.is_aligned());
    }

    #[test]
    fn test_truncate_shortens_everything() {
        let merged = series(5)
            .attach_predictions(predictions(3), AlignmentPolicy::Truncate)
            .unwrap();

        assert_eq!(merged.len(), 3);
        assert_eq!(merged.distance.primary().len(), 3);
        assert!(merged.is_aligned());
    }

    #[test]
    fn test_reject_mismatch() {
        let err = series(5)
            .attach_predictions(predictions(3), AlignmentPolicy::Reject)
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::RowCountMismatch {
                motion: 5,
                predictions: 3
            }
        ));

        assert!(series(3)
            .attach_predictions(predictions(3), AlignmentPolicy::Reject)
            .is_ok());
    }

    #[test]
    fn test_sample_lookup() {
        let merged = series(2)
            .attach_predictions(predictions(2), AlignmentPolicy::PadMissing)
            .unwrap();
        let sample = merged.sample(1).unwrap();

        assert_eq!(sample.time, 0.5);
        assert_eq!(sample.accel, [0.1, 0.2, 0.3]);
        assert_eq!(sample.distance, DistanceSample::Single(Some(51.0)));
        assert_eq!(sample.prediction, vec![("Fall".to_string(), Some(0.25))]);
        assert!(merged.sample(2).is_none());
    }

    #[test]
    fn test_time_labels() {
        assert_eq!(series(3).time_labels(), vec!["0.00", "0.50", "1.00"]);
    }
}
