//! Band classification
//!
//! Maps each vital of a reading onto its discrete clinical band. Bands
//! partition every vital's domain: each known value lands in exactly one
//! band, unknown values land in `Unknown`.
//!
//! | Vital | Band | Condition |
//! |---|---|---|
//! | Heart rate | Low / Normal / High | `< 60` / `60..=100` / `> 100` |
//! | Oxygen | Normal / Mild / Moderate / Severe | `>= 87` / `83..=86` / `79..=82` / `< 79` |
//! | Temperature | Hypothermic / Normal | `< 36.0` / `36.0..=37.0` |
//! | | LowGrade / Mild / Moderate / High fever | `..=38.0` / `..=38.4` / `..=39.0` / `> 39.0` |
//!
//! Oxygen cut-offs come from [`OxygenBaseline`] and default to a high-altitude
//! baseline.

use crate::config::OxygenBaseline;
use crate::types::{HeartRateBand, OxygenBand, TemperatureBand, VitalBands, VitalReading};

const HEART_RATE_LOW_BELOW: i32 = 60;
const HEART_RATE_HIGH_ABOVE: i32 = 100;

const TEMPERATURE_NORMAL_MIN: f64 = 36.0;
const TEMPERATURE_NORMAL_MAX: f64 = 37.0;
const TEMPERATURE_LOW_GRADE_MAX: f64 = 38.0;
const TEMPERATURE_MILD_MAX: f64 = 38.4;
const TEMPERATURE_MODERATE_MAX: f64 = 39.0;

/// Classification engine parameterized by an oxygen baseline
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier {
    oxygen: OxygenBaseline,
}

impl Classifier {
    pub fn new(oxygen: OxygenBaseline) -> Self {
        Self { oxygen }
    }

    /// Classify all three vitals of a reading
    pub fn classify(&self, reading: &VitalReading) -> VitalBands {
        VitalBands {
            heart_rate: classify_heart_rate(reading.heart_rate()),
            oxygen: self.classify_oxygen(reading.oxygen_saturation()),
            temperature: classify_temperature(reading.temperature_c()),
        }
    }

    /// Classify a possibly missing reading
    pub fn classify_latest(&self, reading: Option<&VitalReading>) -> VitalBands {
        reading.map_or(VitalBands::UNKNOWN, |r| self.classify(r))
    }

    pub fn classify_oxygen(&self, spo2: Option<i32>) -> OxygenBand {
        match spo2 {
            None => OxygenBand::Unknown,
            Some(v) if v >= self.oxygen.normal_min => OxygenBand::Normal,
            Some(v) if v >= self.oxygen.mild_min => OxygenBand::MildHypoxia,
            Some(v) if v >= self.oxygen.moderate_min => OxygenBand::ModerateHypoxia,
            Some(_) => OxygenBand::SevereHypoxia,
        }
    }
}

pub fn classify_heart_rate(bpm: Option<i32>) -> HeartRateBand {
    match bpm {
        None => HeartRateBand::Unknown,
        Some(v) if v < HEART_RATE_LOW_BELOW => HeartRateBand::Low,
        Some(v) if v <= HEART_RATE_HIGH_ABOVE => HeartRateBand::Normal,
        Some(_) => HeartRateBand::High,
    }
}

pub fn classify_temperature(celsius: Option<f64>) -> TemperatureBand {
    match celsius {
        Some(v) if v.is_finite() => {
            if v < TEMPERATURE_NORMAL_MIN {
                TemperatureBand::Hypothermic
            } else if v <= TEMPERATURE_NORMAL_MAX {
                TemperatureBand::Normal
            } else if v <= TEMPERATURE_LOW_GRADE_MAX {
                TemperatureBand::LowGradeFever
            } else if v <= TEMPERATURE_MILD_MAX {
                TemperatureBand::MildFever
            } else if v <= TEMPERATURE_MODERATE_MAX {
                TemperatureBand::ModerateFever
            } else {
                TemperatureBand::HighFever
            }
        }
        _ => TemperatureBand::Unknown,
    }
}
