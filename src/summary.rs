//! Dashboard summary statistics over a parsed log.
//!
//! Non-finite samples (unparseable fields) and missing distance readings are
//! left out of every statistic.

use crate::core::series::{Axes, NormalizedSeries};
use serde::Serialize;
use statrs::statistics::Statistics;

/// Number of magnitude outliers reported per sensor.
pub const OUTLIER_COUNT: usize = 3;

/// Mean and spread of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisStats {
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
}

/// Summary of an accelerometer or gyroscope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorSummary {
    pub x: AxisStats,
    pub y: AxisStats,
    pub z: AxisStats,
    /// Largest `sqrt(x² + y² + z²)` values, descending
    pub top_magnitudes: Vec<f64>,
}

/// Summary of the primary distance channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceSummary {
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Samples carrying the missing marker
    pub missing: usize,
}

/// Everything shown in the dashboard summary panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogSummary {
    pub rows: usize,
    pub duration_secs: f64,
    /// Average sample rate, if at least two distinct timestamps exist
    pub sample_rate_hz: Option<f64>,
    pub accel: SensorSummary,
    pub gyro: SensorSummary,
    pub distance: DistanceSummary,
}

fn finite(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

fn non_nan(value: f64) -> Option<f64> {
    (!value.is_nan()).then_some(value)
}

fn axis_stats(values: &[f64]) -> AxisStats {
    let values = finite(values);
    let std_dev = if values.len() > 1 {
        non_nan(values.iter().std_dev())
    } else {
        None
    };
    AxisStats {
        mean: non_nan(values.iter().mean()),
        std_dev,
    }
}

/// Per-sample vector magnitudes, skipping samples with a non-finite axis.
pub fn magnitudes(axes: &Axes) -> Vec<f64> {
    axes.x
        .iter()
        .zip(&axes.y)
        .zip(&axes.z)
        .map(|((x, y), z)| (x * x + y * y + z * z).sqrt())
        .filter(|m| m.is_finite())
        .collect()
}

/// The `n` largest values, descending.
fn top_n(mut values: Vec<f64>, n: usize) -> Vec<f64> {
    values.sort_by(|a, b| b.total_cmp(a));
    values.truncate(n);
    values
}

fn sensor_summary(axes: &Axes) -> SensorSummary {
    SensorSummary {
        x: axis_stats(&axes.x),
        y: axis_stats(&axes.y),
        z: axis_stats(&axes.z),
        top_magnitudes: top_n(magnitudes(axes), OUTLIER_COUNT),
    }
}

fn distance_summary(values: &[Option<f64>]) -> DistanceSummary {
    let present: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    let missing = values.iter().filter(|v| v.is_none()).count();

    if present.is_empty() {
        return DistanceSummary {
            mean: None,
            min: None,
            max: None,
            missing,
        };
    }
    DistanceSummary {
        mean: non_nan(present.iter().mean()),
        min: Some(present.iter().copied().fold(f64::INFINITY, f64::min)),
        max: Some(present.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
        missing,
    }
}

/// Average rate over strictly increasing consecutive timestamps.
pub fn estimate_sample_rate(time: &[f64]) -> Option<f64> {
    let deltas: Vec<f64> = time
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .filter(|d| *d > 1e-9)
        .collect();
    if deltas.is_empty() {
        return None;
    }
    let mean_delta = deltas.iter().mean();
    (mean_delta > 0.0).then(|| 1.0 / mean_delta)
}

/// Compute the summary for a parsed log.
pub fn summarize(series: &NormalizedSeries) -> LogSummary {
    LogSummary {
        rows: series.len(),
        duration_secs: series.time.last().copied().unwrap_or(0.0),
        sample_rate_hz: estimate_sample_rate(&series.time),
        accel: sensor_summary(&series.accel),
        gyro: sensor_summary(&series.gyro),
        distance: distance_summary(series.distance.primary()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SensorLogParser;
    use crate::schema::SchemaVariant;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_summary_basic() {
        let text = "Timestamp(ms),AccelX(g),AccelY(g),AccelZ(g),GyroX(deg/s),GyroY(deg/s),GyroZ(deg/s),Distance(cm)\n\
                    0,3,4,0,0,0,1,10\n\
                    100,0,0,1,0,2,0,20\n\
                    200,1,2,2,x,0,0,30\n\
                    300,0,0,0,0,0,5,40";
        let series = SensorLogParser::for_variant(SchemaVariant::SingleSensor)
            .parse(text)
            .unwrap();
        let summary = summarize(&series);

        assert_eq!(summary.rows, 4);
        assert!(approx(summary.duration_secs, 0.3));
        assert!(approx(summary.sample_rate_hz.unwrap(), 10.0));
        assert_eq!(summary.accel.top_magnitudes, vec![5.0, 3.0, 1.0]);
        assert!(approx(summary.accel.x.mean.unwrap(), 1.0));
        // The unparseable gyro row is dropped from magnitudes and means.
        assert_eq!(summary.gyro.top_magnitudes, vec![5.0, 2.0, 1.0]);
        assert!(approx(summary.gyro.x.mean.unwrap(), 0.0));
        assert!(approx(summary.distance.mean.unwrap(), 25.0));
        assert_eq!(summary.distance.min, Some(10.0));
        assert_eq!(summary.distance.max, Some(40.0));
        assert_eq!(summary.distance.missing, 0);
    }

    #[test]
    fn test_summary_counts_missing_distance() {
        let text = "Timestamp(ms),AccelX(g),AccelY(g),AccelZ(g),GyroX(deg/s),GyroY(deg/s),GyroZ(deg/s),DistanceLeft(cm),DistanceRight(cm)\n\
                    0,0,0,1,0,0,0,0,12\n\
                    50,0,0,1,0,0,0,14,0";
        let series = SensorLogParser::for_variant(SchemaVariant::DualZeroAsMissing)
            .parse(text)
            .unwrap();
        let summary = summarize(&series);

        assert_eq!(summary.distance.missing, 1);
        assert_eq!(summary.distance.mean, Some(14.0));
    }

    #[test]
    fn test_sample_rate_needs_two_distinct_times() {
        assert_eq!(estimate_sample_rate(&[]), None);
        assert_eq!(estimate_sample_rate(&[0.0]), None);
        assert_eq!(estimate_sample_rate(&[0.0, 0.0]), None);
    }

    #[test]
    fn test_single_value_has_no_spread() {
        let stats = axis_stats(&[2.0]);
        assert_eq!(stats.mean, Some(2.0));
        assert_eq!(stats.std_dev, None);
        assert_eq!(axis_stats(&[]).mean, None);
    }
}
