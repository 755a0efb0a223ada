//! Trend analysis
//!
//! A coarse two-point heuristic: only the oldest and the newest reading of
//! the most recent `window` readings are compared. One point is scored for
//! each of heart rate down, oxygen up and temperature down (strict changes
//! only). Two or more points is improving, one is stable, zero is worsening.
//!
//! This is a finite difference, not a statistical trend test. A single noisy
//! reading at either end flips the verdict.

use crate::config::DEFAULT_TREND_WINDOW;
use crate::types::{Trend, VitalReading};

/// Two-point trend analyzer over a fixed look-back
#[derive(Debug, Clone, Copy)]
pub struct TrendAnalyzer {
    window: usize,
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_TREND_WINDOW)
    }
}

impl TrendAnalyzer {
    /// `window` is both the minimum number of readings and the look-back length
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(2),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Judge the direction of a chronologically ordered window
    pub fn trend(&self, readings: &[VitalReading]) -> Trend {
        if readings.len() < self.window {
            return Trend::InsufficientData;
        }

        let recent = &readings[readings.len() - self.window..];
        let (Some(oldest), Some(newest)) = (recent.first(), recent.last()) else {
            return Trend::InsufficientData;
        };

        let comparisons = [
            compare(oldest.heart_rate(), newest.heart_rate(), |a, b| b < a),
            compare(oldest.oxygen_saturation(), newest.oxygen_saturation(), |a, b| b > a),
            compare(oldest.temperature_c(), newest.temperature_c(), |a, b| b < a),
        ];

        if comparisons.iter().all(Option::is_none) {
            return Trend::InsufficientData;
        }

        let score = comparisons.iter().filter(|c| **c == Some(true)).count();
        match score {
            0 => Trend::Worsening,
            1 => Trend::Stable,
            _ => Trend::Improving,
        }
    }
}

/// `None` when the vital is unknown at either end
fn compare<T: Copy>(
    oldest: Option<T>,
    newest: Option<T>,
    improved: fn(T, T) -> bool,
) -> Option<bool> {
    Some(improved(oldest?, newest?))
}
