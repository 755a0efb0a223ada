//! Engine configuration
//!
//! Thresholds live here rather than inline so the engine can be reused at
//! another altitude or with another clinical policy. Defaults reproduce the
//! reference deployment.

use crate::error::VitalError;
use serde::{Deserialize, Serialize};

/// Default number of readings kept by the store
pub const DEFAULT_STORE_CAPACITY: usize = 60;

/// Default trend window (minimum readings, and how far back the trend looks)
pub const DEFAULT_TREND_WINDOW: usize = 6;

/// Default number of points on each dashboard chart
pub const DEFAULT_CHART_POINTS: usize = 40;

/// Default number of readings summarized by the history reply
pub const DEFAULT_HISTORY_POINTS: usize = 10;

/// Altitude-adjusted oxygenation baseline.
///
/// Each field is the inclusive lower bound of its band; anything below
/// `moderate_min` is severe hypoxia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OxygenBaseline {
    pub normal_min: i32,
    pub mild_min: i32,
    pub moderate_min: i32,
}

impl Default for OxygenBaseline {
    fn default() -> Self {
        Self {
            normal_min: 87,
            mild_min: 83,
            moderate_min: 79,
        }
    }
}

/// One tier of the risk evaluation. A vital crossing any limit triggers the tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskTier {
    pub oxygen_below: i32,
    pub temperature_at_or_above: f64,
    pub heart_rate_above: i32,
}

/// Risk tiers, most severe first.
///
/// Missing tiers, or missing limits inside a tier, take that tier's default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "ThresholdFields")]
pub struct RiskThresholds {
    pub critical: RiskTier,
    pub high: RiskTier,
    pub medium: RiskTier,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            critical: RiskTier {
                oxygen_below: 80,
                temperature_at_or_above: 39.5,
                heart_rate_above: 130,
            },
            high: RiskTier {
                oxygen_below: 85,
                temperature_at_or_above: 38.5,
                heart_rate_above: 110,
            },
            medium: RiskTier {
                oxygen_below: 90,
                temperature_at_or_above: 37.5,
                heart_rate_above: 100,
            },
        }
    }
}

/// Wire shape of one tier with every limit optional
#[derive(Default, Deserialize)]
#[serde(default)]
struct TierFields {
    oxygen_below: Option<i32>,
    temperature_at_or_above: Option<f64>,
    heart_rate_above: Option<i32>,
}

impl TierFields {
    fn or(self, fallback: RiskTier) -> RiskTier {
        RiskTier {
            oxygen_below: self.oxygen_below.unwrap_or(fallback.oxygen_below),
            temperature_at_or_above: self
                .temperature_at_or_above
                .unwrap_or(fallback.temperature_at_or_above),
            heart_rate_above: self.heart_rate_above.unwrap_or(fallback.heart_rate_above),
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct ThresholdFields {
    critical: TierFields,
    high: TierFields,
    medium: TierFields,
}

impl From<ThresholdFields> for RiskThresholds {
    fn from(fields: ThresholdFields) -> Self {
        let defaults = RiskThresholds::default();
        Self {
            critical: fields.critical.or(defaults.critical),
            high: fields.high.or(defaults.high),
            medium: fields.medium.or(defaults.medium),
        }
    }
}

/// Full engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub store_capacity: usize,
    pub trend_window: usize,
    pub chart_points: usize,
    pub history_points: usize,
    pub oxygen: OxygenBaseline,
    pub risk: RiskThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store_capacity: DEFAULT_STORE_CAPACITY,
            trend_window: DEFAULT_TREND_WINDOW,
            chart_points: DEFAULT_CHART_POINTS,
            history_points: DEFAULT_HISTORY_POINTS,
            oxygen: OxygenBaseline::default(),
            risk: RiskThresholds::default(),
        }
    }
}

impl EngineConfig {
    /// Load and validate a configuration from JSON. Missing keys take defaults.
    pub fn from_json(json: &str) -> Result<Self, VitalError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, VitalError> {
        serde_json::to_string_pretty(self).map_err(VitalError::JsonError)
    }

    /// Check that thresholds describe a consistent partition
    pub fn validate(&self) -> Result<(), VitalError> {
        if self.store_capacity == 0 {
            return Err(VitalError::InvalidConfig(
                "store_capacity must be at least 1".to_string(),
            ));
        }
        if self.trend_window < 2 {
            return Err(VitalError::InvalidConfig(
                "trend_window must be at least 2".to_string(),
            ));
        }

        let o = &self.oxygen;
        if !(o.normal_min > o.mild_min && o.mild_min > o.moderate_min && o.moderate_min > 0) {
            return Err(VitalError::InvalidConfig(format!(
                "oxygen baseline must descend: normal_min {} > mild_min {} > moderate_min {} > 0",
                o.normal_min, o.mild_min, o.moderate_min
            )));
        }
        if o.normal_min > 100 {
            return Err(VitalError::InvalidConfig(format!(
                "oxygen normal_min {} exceeds 100",
                o.normal_min
            )));
        }

        let r = &self.risk;
        let tiers = [
            ("critical/high", &r.critical, &r.high),
            ("high/medium", &r.high, &r.medium),
        ];
        for (name, more, less) in tiers {
            if more.oxygen_below > less.oxygen_below
                || more.temperature_at_or_above < less.temperature_at_or_above
                || more.heart_rate_above < less.heart_rate_above
            {
                return Err(VitalError::InvalidConfig(format!(
                    "risk tiers {name} are not ordered by severity"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = EngineConfig::from_json(r#"{"store_capacity": 30}"#).unwrap();
        assert_eq!(config.store_capacity, 30);
        assert_eq!(config.trend_window, DEFAULT_TREND_WINDOW);
        assert_eq!(config.oxygen, OxygenBaseline::default());
    }

    #[test]
    fn test_sea_level_baseline_accepted() {
        let json = r#"{"oxygen": {"normal_min": 95, "mild_min": 91, "moderate_min": 86}}"#;
        let config = EngineConfig::from_json(json).unwrap();
        assert_eq!(config.oxygen.normal_min, 95);
    }

    #[test]
    fn test_nested_partial_json_takes_defaults() {
        let config = EngineConfig::from_json(r#"{"oxygen": {"normal_min": 95}}"#).unwrap();
        assert_eq!(config.oxygen.normal_min, 95);
        assert_eq!(config.oxygen.mild_min, OxygenBaseline::default().mild_min);

        let json = r#"{"risk": {"critical": {"heart_rate_above": 140}}}"#;
        let config = EngineConfig::from_json(json).unwrap();
        let defaults = RiskThresholds::default();
        assert_eq!(config.risk.critical.heart_rate_above, 140);
        assert_eq!(config.risk.critical.oxygen_below, defaults.critical.oxygen_below);
        assert_eq!(config.risk.high, defaults.high);
        assert_eq!(config.risk.medium, defaults.medium);
    }

    #[test]
    fn test_rejects_unordered_oxygen() {
        let json = r#"{"oxygen": {"normal_min": 80, "mild_min": 83, "moderate_min": 79}}"#;
        assert!(matches!(
            EngineConfig::from_json(json),
            Err(VitalError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_unordered_risk_tiers() {
        let mut config = EngineConfig::default();
        config.risk.high.heart_rate_above = 140;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let config = EngineConfig {
            store_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_round_trip() {
        let config = EngineConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }
}
