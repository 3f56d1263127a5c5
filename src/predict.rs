//! Placeholder scorer for the live demo.
//!
//! Until a trained model is wired in, each sample is scored by rotating a
//! fixed set of probabilities on a 20 second cycle, changing every 5 seconds.

use serde::{Deserialize, Serialize};

/// Scores handed out in rotation.
pub const SAMPLE_PREDICTIONS: [f64; 4] = [0.125, 0.2, 0.375, 0.3];

/// Length of one full rotation, in whole seconds.
const CYCLE_SECS: i64 = 20;

/// Seconds each rotation step lasts.
const STEP_SECS: i64 = 5;

/// A sample submitted for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiveSample {
    /// Seconds since the start of the stream
    pub time: f64,
}

/// Scores for the four live-demo classes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LivePrediction {
    pub shaking: f64,
    pub posture: f64,
    pub fall: f64,
    pub normal: f64,
}

/// Score a sample taken `time` seconds into the stream.
///
/// Whole seconds are taken with half-to-even rounding, so 4.5 s still falls in
/// the first step.
pub fn placeholder_prediction(time: f64) -> LivePrediction {
    let step = ((time.round_ties_even() as i64).rem_euclid(CYCLE_SECS) / STEP_SECS) as usize;
    let score = |offset: usize| SAMPLE_PREDICTIONS[(step + offset) % SAMPLE_PREDICTIONS.len()];

    LivePrediction {
        shaking: score(0),
        posture: score(1),
        fall: score(2),
        normal: score(3),
    }
}

/// Score a batch, keeping request order.
pub fn predict_batch(samples: &[LiveSample]) -> Vec<LivePrediction> {
    samples
        .iter()
        .map(|s| placeholder_prediction(s.time))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_steps() {
        let first = placeholder_prediction(0.0);
        assert_eq!(first.shaking, 0.125);
        assert_eq!(first.normal, 0.3);

        let second = placeholder_prediction(5.2);
        assert_eq!(second.shaking, 0.2);
        assert_eq!(second.posture, 0.375);
        assert_eq!(second.fall, 0.3);
        assert_eq!(second.normal, 0.125);

        assert_eq!(placeholder_prediction(19.4).shaking, 0.3);
        assert_eq!(placeholder_prediction(20.0), first);
    }

    #[test]
    fn test_half_seconds_round_to_even() {
        assert_eq!(placeholder_prediction(4.5).shaking, 0.125);
        assert_eq!(placeholder_prediction(5.5).shaking, 0.2);
        assert_eq!(placeholder_prediction(14.5).shaking, 0.375);
        assert_eq!(placeholder_prediction(15.5).shaking, 0.3);
        assert_eq!(placeholder_prediction(-0.5), placeholder_prediction(0.0));
    }

    #[test]
    fn test_scores_sum_to_one() {
        for t in 0..40 {
            let p = placeholder_prediction(t as f64);
            let sum = p.shaking + p.posture + p.fall + p.normal;
            assert!((sum - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(placeholder_prediction(0.0)).unwrap();
        assert_eq!(json["Shaking"], 0.125);
        assert_eq!(json["Fall"], 0.375);
    }

    #[test]
    fn test_batch_keeps_order() {
        let batch = predict_batch(&[LiveSample { time: 10.0 }, LiveSample { time: 0.0 }]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].shaking, 0.375);
        assert_eq!(batch[1].shaking, 0.125);
    }
}
