//! Dashboard snapshot encoding
//!
//! Builds the payload the polling dashboard reads: latest reading, bands and
//! card colours, risk, trend, diagnosis text and the chart series.

use crate::classify::Classifier;
use crate::error::VitalError;
use crate::narrative::NarrativeComposer;
use crate::risk::RiskEvaluator;
use crate::types::{ChartSeries, DashboardSnapshot, SnapshotProducer, Trend, VitalReading};
use crate::{PRODUCER_NAME, VITALIA_VERSION};
use chrono::Utc;
use uuid::Uuid;

/// Current snapshot schema version
pub const SNAPSHOT_VERSION: &str = "1.0.0";

/// Snapshot encoder with a stable per-instance identifier
pub struct SnapshotEncoder {
    instance_id: String,
}

impl Default for SnapshotEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Encode a snapshot.
    ///
    /// `chart_window` is plotted as-is. The trend verdict is computed by the
    /// caller over its own window, which may be longer than the chart.
    pub fn encode(
        &self,
        latest: Option<&VitalReading>,
        chart_window: &[VitalReading],
        trend: Trend,
        classifier: &Classifier,
        risk: &RiskEvaluator,
    ) -> DashboardSnapshot {
        let bands = classifier.classify_latest(latest);
        let risk = risk.evaluate(latest);

        DashboardSnapshot {
            snapshot_version: SNAPSHOT_VERSION.to_string(),
            producer: SnapshotProducer {
                name: PRODUCER_NAME.to_string(),
                version: VITALIA_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            reading: latest.cloned(),
            bands,
            indicators: bands.indicators(),
            risk,
            trend,
            diagnosis: NarrativeComposer::status(&bands),
            alert: NarrativeComposer::alert(risk),
            chart: build_chart(chart_window),
        }
    }

    /// Encode to a JSON string
    pub fn encode_to_json(
        &self,
        latest: Option<&VitalReading>,
        chart_window: &[VitalReading],
        trend: Trend,
        classifier: &Classifier,
        risk: &RiskEvaluator,
    ) -> Result<String, VitalError> {
        let snapshot = self.encode(latest, chart_window, trend, classifier, risk);
        serde_json::to_string(&snapshot).map_err(VitalError::JsonError)
    }
}

fn build_chart(window: &[VitalReading]) -> ChartSeries {
    let mut chart = ChartSeries::default();
    for reading in window {
        chart.timestamps.push(reading.timestamp().to_rfc3339());
        chart.heart_rate.push(reading.heart_rate());
        chart.oxygen_saturation.push(reading.oxygen_saturation());
        chart.temperature_c.push(reading.temperature_c());
    }
    chart
}
