//! Device ingest
//!
//! Parses the JSON body the device posts (`{heart_rate, spo2, temperature}`)
//! into a [`VitalReading`]. The device firmware sends numbers, but nulls,
//! missing keys and numeric strings also occur:
//! - null, missing, zero or non-finite values become unknown
//! - values outside plausible ranges are kept and reported as flags
//! - readings are stamped with the receive time; a device clock is never trusted
//!
//! Plausibility is judged here, at the boundary. The evaluation core never
//! rejects a value.

use crate::error::VitalError;
use crate::types::{PlausibilityFlag, VitalReading};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::RangeInclusive;

const HEART_RATE_PLAUSIBLE: RangeInclusive<i32> = 0..=300;
const OXYGEN_PLAUSIBLE: RangeInclusive<i32> = 0..=100;
const TEMPERATURE_PLAUSIBLE: RangeInclusive<f64> = 30.0..=45.0;

/// Result of ingesting one device report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestOutcome {
    pub reading: VitalReading,
    pub flags: Vec<PlausibilityFlag>,
}

/// Parser for device reports
pub struct Ingestor;

impl Ingestor {
    /// Parse a device JSON body. `received_at` stamps the reading; any
    /// `timestamp` key in the body is ignored.
    pub fn parse(json: &str, received_at: DateTime<Utc>) -> Result<IngestOutcome, VitalError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value, received_at)
    }

    /// Build a reading from an already parsed JSON body
    pub fn from_value(
        value: &Value,
        received_at: DateTime<Utc>,
    ) -> Result<IngestOutcome, VitalError> {
        let body = value.as_object().ok_or_else(|| {
            VitalError::ParseError("device report must be a JSON object".to_string())
        })?;

        let heart_rate = number_field(body.get("heart_rate"), "heart_rate")?.map(round_to_i32);
        let spo2 = number_field(body.get("spo2"), "spo2")?.map(round_to_i32);
        let temperature = number_field(body.get("temperature"), "temperature")?;

        let reading = VitalReading::new(heart_rate, spo2, temperature, received_at);
        let flags = Self::plausibility(&reading);

        if flags.is_empty() {
            info!(
                "ingested reading hr={:?} spo2={:?} temp={:?}",
                reading.heart_rate(),
                reading.oxygen_saturation(),
                reading.temperature_c()
            );
        } else {
            warn!("ingested reading with plausibility flags {flags:?}: {reading:?}");
        }

        Ok(IngestOutcome { reading, flags })
    }

    /// Flags for values outside plausible ranges
    pub fn plausibility(reading: &VitalReading) -> Vec<PlausibilityFlag> {
        let mut flags = Vec::new();

        if reading.is_empty() {
            flags.push(PlausibilityFlag::NoVitals);
            return flags;
        }
        if reading
            .heart_rate()
            .is_some_and(|v| !HEART_RATE_PLAUSIBLE.contains(&v))
        {
            flags.push(PlausibilityFlag::HeartRateOutOfRange);
        }
        if reading
            .oxygen_saturation()
            .is_some_and(|v| !OXYGEN_PLAUSIBLE.contains(&v))
        {
            flags.push(PlausibilityFlag::OxygenOutOfRange);
        }
        if reading
            .temperature_c()
            .is_some_and(|v| !TEMPERATURE_PLAUSIBLE.contains(&v))
        {
            flags.push(PlausibilityFlag::TemperatureOutOfRange);
        }

        flags
    }
}

/// Read a numeric field that may be absent, null, a number or a numeric string
fn number_field(value: Option<&Value>, name: &str) -> Result<Option<f64>, VitalError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| VitalError::ParseError(format!("{name} is not a number: {s:?}"))),
        Some(other) => Err(VitalError::ParseError(format!(
            "{name} has unsupported type: {other}"
        ))),
    }
}

fn round_to_i32(v: f64) -> i32 {
    // `as` saturates at the i32 bounds and maps NaN to 0 (unknown)
    v.round() as i32
}
