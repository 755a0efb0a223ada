//! Risk evaluation
//!
//! Combines the three vitals into one ordinal risk level. Tiers are checked
//! from most to least severe and the first one any known vital crosses wins,
//! so the worst vital always decides the result. Risk tiers are coarser than
//! the classification bands and are configured separately.

use crate::config::{RiskThresholds, RiskTier};
use crate::types::{RiskLevel, VitalReading};

/// Worst-vital-wins risk evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskEvaluator {
    thresholds: RiskThresholds,
}

impl RiskEvaluator {
    pub fn new(thresholds: RiskThresholds) -> Self {
        Self { thresholds }
    }

    /// Evaluate the risk of a possibly missing reading.
    ///
    /// A missing reading, or one with no known vital, is `Unknown`.
    pub fn evaluate(&self, reading: Option<&VitalReading>) -> RiskLevel {
        let Some(reading) = reading.filter(|r| !r.is_empty()) else {
            return RiskLevel::Unknown;
        };

        let t = &self.thresholds;
        [
            (RiskLevel::Critical, &t.critical),
            (RiskLevel::High, &t.high),
            (RiskLevel::Medium, &t.medium),
        ]
        .into_iter()
        .find(|(_, tier)| crosses(reading, tier))
        .map_or(RiskLevel::Low, |(level, _)| level)
    }
}

fn crosses(reading: &VitalReading, tier: &RiskTier) -> bool {
    reading.oxygen_saturation().is_some_and(|o| o < tier.oxygen_below)
        || reading
            .temperature_c()
            .is_some_and(|t| t >= tier.temperature_at_or_above)
        || reading.heart_rate().is_some_and(|h| h > tier.heart_rate_above)
}
