//! Core types for the Vitalia engine
//!
//! This module defines the data that flows through the engine: readings as
//! they arrive from the device, the discrete bands and risk levels derived
//! from them, and the dashboard snapshot handed back to the polling client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped sample of heart rate, blood oxygen and body temperature.
///
/// A field is `None` when the device did not report it. Zero is never a
/// physiological value for these vitals, so zero (and non-finite
/// temperatures) are folded into `None` at construction. Fields are private:
/// a reading cannot change after it has been created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ReadingFields")]
pub struct VitalReading {
    heart_rate: Option<i32>,
    oxygen_saturation: Option<i32>,
    temperature_c: Option<f64>,
    timestamp: DateTime<Utc>,
}

/// Wire shape of a reading; every deserialized reading passes through
/// [`VitalReading::new`].
#[derive(Deserialize)]
struct ReadingFields {
    heart_rate: Option<i32>,
    oxygen_saturation: Option<i32>,
    temperature_c: Option<f64>,
    timestamp: DateTime<Utc>,
}

impl From<ReadingFields> for VitalReading {
    fn from(fields: ReadingFields) -> Self {
        VitalReading::new(
            fields.heart_rate,
            fields.oxygen_saturation,
            fields.temperature_c,
            fields.timestamp,
        )
    }
}

impl VitalReading {
    /// Create a reading, treating zero and non-finite values as unknown
    pub fn new(
        heart_rate: Option<i32>,
        oxygen_saturation: Option<i32>,
        temperature_c: Option<f64>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            heart_rate: heart_rate.filter(|v| *v != 0),
            oxygen_saturation: oxygen_saturation.filter(|v| *v != 0),
            temperature_c: temperature_c.filter(|v| v.is_finite() && *v != 0.0),
            timestamp,
        }
    }

    /// Heart rate in beats per minute
    pub fn heart_rate(&self) -> Option<i32> {
        self.heart_rate
    }

    /// Blood oxygen saturation in percent
    pub fn oxygen_saturation(&self) -> Option<i32> {
        self.oxygen_saturation
    }

    /// Body temperature in degrees Celsius
    pub fn temperature_c(&self) -> Option<f64> {
        self.temperature_c
    }

    /// Capture time
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Same vitals with another capture time
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// True when none of the three vitals is known
    pub fn is_empty(&self) -> bool {
        self.heart_rate.is_none() && self.oxygen_saturation.is_none() && self.temperature_c.is_none()
    }
}

/// Dashboard card colour for a band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    Green,
    Yellow,
    Red,
    Unknown,
}

/// Heart-rate classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeartRateBand {
    Low,
    Normal,
    High,
    Unknown,
}

impl HeartRateBand {
    pub fn is_known(&self) -> bool {
        !matches!(self, HeartRateBand::Unknown)
    }

    pub fn indicator(&self) -> Indicator {
        match self {
            HeartRateBand::Low => Indicator::Yellow,
            HeartRateBand::Normal => Indicator::Green,
            HeartRateBand::High => Indicator::Red,
            HeartRateBand::Unknown => Indicator::Unknown,
        }
    }
}

/// Oxygenation classification against an altitude-adjusted baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OxygenBand {
    Normal,
    MildHypoxia,
    ModerateHypoxia,
    SevereHypoxia,
    Unknown,
}

impl OxygenBand {
    pub fn is_known(&self) -> bool {
        !matches!(self, OxygenBand::Unknown)
    }

    /// Any of the three hypoxia bands
    pub fn is_hypoxic(&self) -> bool {
        matches!(
            self,
            OxygenBand::MildHypoxia | OxygenBand::ModerateHypoxia | OxygenBand::SevereHypoxia
        )
    }

    pub fn indicator(&self) -> Indicator {
        match self {
            OxygenBand::Normal => Indicator::Green,
            OxygenBand::MildHypoxia => Indicator::Yellow,
            OxygenBand::ModerateHypoxia | OxygenBand::SevereHypoxia => Indicator::Red,
            OxygenBand::Unknown => Indicator::Unknown,
        }
    }
}

/// Body temperature classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureBand {
    Hypothermic,
    Normal,
    LowGradeFever,
    MildFever,
    ModerateFever,
    HighFever,
    Unknown,
}

impl TemperatureBand {
    pub fn is_known(&self) -> bool {
        !matches!(self, TemperatureBand::Unknown)
    }

    /// Any of the four fever bands
    pub fn is_fever(&self) -> bool {
        matches!(
            self,
            TemperatureBand::LowGradeFever
                | TemperatureBand::MildFever
                | TemperatureBand::ModerateFever
                | TemperatureBand::HighFever
        )
    }

    pub fn indicator(&self) -> Indicator {
        match self {
            TemperatureBand::Normal => Indicator::Green,
            TemperatureBand::Hypothermic | TemperatureBand::LowGradeFever => Indicator::Yellow,
            TemperatureBand::MildFever
            | TemperatureBand::ModerateFever
            | TemperatureBand::HighFever => Indicator::Red,
            TemperatureBand::Unknown => Indicator::Unknown,
        }
    }
}

/// The three bands of one reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VitalBands {
    pub heart_rate: HeartRateBand,
    pub oxygen: OxygenBand,
    pub temperature: TemperatureBand,
}

impl VitalBands {
    /// Bands for a missing reading
    pub const UNKNOWN: VitalBands = VitalBands {
        heart_rate: HeartRateBand::Unknown,
        oxygen: OxygenBand::Unknown,
        temperature: TemperatureBand::Unknown,
    };

    /// True when no band is known
    pub fn all_unknown(&self) -> bool {
        !self.heart_rate.is_known() && !self.oxygen.is_known() && !self.temperature.is_known()
    }

    pub fn indicators(&self) -> Indicators {
        Indicators {
            heart_rate: self.heart_rate.indicator(),
            oxygen: self.oxygen.indicator(),
            temperature: self.temperature.indicator(),
        }
    }
}

/// Card colours for the three vitals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicators {
    pub heart_rate: Indicator,
    pub oxygen: Indicator,
    pub temperature: Indicator,
}

/// Overall severity derived from all vitals.
///
/// `Unknown` sorts below `Low`; among the known levels each one strictly
/// dominates the ones before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Unknown,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Unknown => "unknown",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

/// Coarse direction of the recent readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Stable,
    Worsening,
    InsufficientData,
}

/// Category a chat utterance is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Status,
    Risk,
    Alert,
    Recommendation,
    Nutrition,
    History,
    Trend,
    Summary,
    Fallback,
}

/// Values the ingest boundary accepted but considers implausible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlausibilityFlag {
    HeartRateOutOfRange,
    OxygenOutOfRange,
    TemperatureOutOfRange,
    NoVitals,
}

/// Snapshot producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Chart series for the scrolling graphs, oldest first.
///
/// Unknown values are kept as `None` so the three series stay aligned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartSeries {
    pub timestamps: Vec<String>,
    pub heart_rate: Vec<Option<i32>>,
    pub oxygen_saturation: Vec<Option<i32>>,
    pub temperature_c: Vec<Option<f64>>,
}

/// Everything the dashboard needs from one poll
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub snapshot_version: String,
    pub producer: SnapshotProducer,
    pub computed_at_utc: String,
    pub reading: Option<VitalReading>,
    pub bands: VitalBands,
    pub indicators: Indicators,
    pub risk: RiskLevel,
    pub trend: Trend,
    pub diagnosis: String,
    pub alert: String,
    pub chart: ChartSeries,
}
