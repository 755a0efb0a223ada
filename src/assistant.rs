//! Assistant orchestration
//!
//! This module provides the stateful entry point used by hosts: it owns the
//! engine configuration and shares an injected [`ReadingStore`] with whoever
//! else feeds or reads it.
//!
//! Flows:
//! 1. Ingest - device JSON → [`Ingestor`] → store append
//! 2. Chat - message → store snapshot → [`QueryRouter`] → reply text
//! 3. Poll - store snapshot → [`SnapshotEncoder`] → dashboard JSON

use crate::classify::Classifier;
use crate::config::EngineConfig;
use crate::encoder::SnapshotEncoder;
use crate::error::VitalError;
use crate::ingest::{IngestOutcome, Ingestor};
use crate::risk::RiskEvaluator;
use crate::router::{QueryRouter, RoutedReply};
use crate::store::ReadingStore;
use crate::trend::TrendAnalyzer;
use crate::types::{DashboardSnapshot, VitalReading};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Chat request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
}

/// Chat response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Stateful assistant over a shared reading store.
///
/// The assistant holds no mutable state of its own, so `&self` methods can be
/// called from several threads at once.
pub struct VitalsAssistant {
    store: Arc<ReadingStore>,
    config: EngineConfig,
    classifier: Classifier,
    risk: RiskEvaluator,
    trend: TrendAnalyzer,
    router: QueryRouter,
    encoder: SnapshotEncoder,
}

impl Default for VitalsAssistant {
    fn default() -> Self {
        let config = EngineConfig::default();
        let store = Arc::new(ReadingStore::new(config.store_capacity));
        Self::build(store, config)
    }
}

impl VitalsAssistant {
    /// Create an assistant over an existing store
    pub fn new(store: Arc<ReadingStore>, config: EngineConfig) -> Result<Self, VitalError> {
        config.validate()?;
        Ok(Self::build(store, config))
    }

    /// Create an assistant with its own store sized from the configuration
    pub fn with_config(config: EngineConfig) -> Result<Self, VitalError> {
        let store = Arc::new(ReadingStore::new(config.store_capacity));
        Self::new(store, config)
    }

    /// Restore an assistant from a store saved with [`Self::save_store`].
    ///
    /// The restored store uses `config.store_capacity`, not the saved capacity.
    pub fn from_saved_store(json: &str, config: EngineConfig) -> Result<Self, VitalError> {
        config.validate()?;
        let store = ReadingStore::from_json_with_capacity(json, config.store_capacity)?;
        Self::new(Arc::new(store), config)
    }

    /// Save the reading store to JSON
    pub fn save_store(&self) -> Result<String, VitalError> {
        self.store.to_json()
    }

    fn build(store: Arc<ReadingStore>, config: EngineConfig) -> Self {
        Self {
            store,
            classifier: Classifier::new(config.oxygen),
            risk: RiskEvaluator::new(config.risk),
            trend: TrendAnalyzer::new(config.trend_window),
            router: QueryRouter::from_config(&config),
            encoder: SnapshotEncoder::new(),
            config,
        }
    }

    pub fn store(&self) -> &Arc<ReadingStore> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse a device report and append it to the store
    pub fn ingest_json(&self, json: &str) -> Result<IngestOutcome, VitalError> {
        let outcome = Ingestor::parse(json, Utc::now())?;
        self.store.append(outcome.reading.clone());
        Ok(outcome)
    }

    /// Append an already built reading
    pub fn ingest(&self, reading: VitalReading) {
        self.store.append(reading);
    }

    /// Reply text for a chat message
    pub fn reply(&self, message: &str) -> String {
        self.dispatch(message).text
    }

    /// Reply for a chat message with the intent that produced it
    pub fn dispatch(&self, message: &str) -> RoutedReply {
        let depth = self.config.trend_window.max(self.config.history_points);
        let (latest, window) = self.store.snapshot(depth);
        self.router.dispatch(message, latest.as_ref(), &window)
    }

    /// Handle a chat body `{"message": ...}` and return `{"reply": ...}`.
    /// A blank message gets the fallback reply.
    pub fn chat_json(&self, body: &str) -> Result<String, VitalError> {
        let request: ChatRequest = serde_json::from_str(body)?;
        let message = request
            .message
            .ok_or_else(|| VitalError::MissingField("message".to_string()))?;
        let response = ChatResponse {
            reply: self.reply(message.trim()),
        };
        serde_json::to_string(&response).map_err(VitalError::JsonError)
    }

    /// Dashboard snapshot of the current store
    pub fn snapshot(&self) -> DashboardSnapshot {
        let depth = self.config.chart_points.max(self.config.trend_window);
        let (latest, window) = self.store.snapshot(depth);
        let skip = window.len().saturating_sub(self.config.chart_points);
        self.encoder.encode(
            latest.as_ref(),
            &window[skip..],
            self.trend.trend(&window),
            &self.classifier,
            &self.risk,
        )
    }

    /// Dashboard snapshot as JSON
    pub fn snapshot_json(&self) -> Result<String, VitalError> {
        serde_json::to_string(&self.snapshot()).map_err(VitalError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrative::INSUFFICIENT_DATA;
    use crate::router::FALLBACK_REPLY;
    use crate::types::{Intent, PlausibilityFlag, RiskLevel, Trend};
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use std::thread;

    fn reading_at(second: i64, hr: i32, spo2: i32, temp: f64) -> VitalReading {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        VitalReading::new(Some(hr), Some(spo2), Some(temp), start + Duration::seconds(second))
    }

    #[test]
    fn test_end_to_end_normal_reading() {
        let assistant = VitalsAssistant::default();
        let outcome = assistant
            .ingest_json(r#"{"heart_rate": 72, "spo2": 91, "temperature": 36.5}"#)
            .unwrap();
        assert!(outcome.flags.is_empty());

        let snapshot = assistant.snapshot();
        assert_eq!(snapshot.risk, RiskLevel::Low);
        assert_eq!(
            snapshot.diagnosis,
            "Heart rate is normal. Oxygenation is normal for the altitude. Temperature is normal."
        );
        assert!(assistant.reply("any alerts?").starts_with("No alerts"));
    }

    #[test]
    fn test_end_to_end_critical_reading() {
        let assistant = VitalsAssistant::default();
        assistant
            .ingest_json(r#"{"heart_rate": 135, "spo2": 78, "temperature": 39.8}"#)
            .unwrap();

        let routed = assistant.dispatch("ALERT status");
        assert_eq!(routed.intent, Intent::Alert);
        assert!(routed.text.starts_with("URGENT"));
        assert_eq!(assistant.snapshot().risk, RiskLevel::Critical);
    }

    #[test]
    fn test_no_data_yet() {
        let assistant = VitalsAssistant::default();
        assert_eq!(assistant.reply("how am I?"), INSUFFICIENT_DATA);
        assert_eq!(assistant.snapshot().risk, RiskLevel::Unknown);
    }

    #[test]
    fn test_trend_over_ingested_readings() {
        let assistant = VitalsAssistant::default();
        let points = [
            (110, 84, 38.6),
            (106, 85, 38.4),
            (102, 86, 38.2),
            (98, 87, 38.0),
            (94, 88, 37.6),
        ];
        for (i, (hr, spo2, temp)) in points.iter().enumerate() {
            assistant.ingest(reading_at(i as i64, *hr, *spo2, *temp));
        }
        assert_eq!(
            assistant.reply("trend"),
            "There are not enough readings yet to judge a trend."
        );

        assistant.ingest(reading_at(5, 90, 89, 37.2));
        assert_eq!(assistant.snapshot().trend, Trend::Improving);
        assert!(assistant.reply("am I improving?").contains("improving"));
    }

    #[test]
    fn test_shared_store_is_seen_by_assistant() {
        let store = Arc::new(ReadingStore::new(10));
        let assistant =
            VitalsAssistant::new(Arc::clone(&store), EngineConfig::default()).unwrap();

        store.append(reading_at(0, 120, 95, 36.8));
        assert_eq!(
            assistant.reply("heart"),
            "Heart rate is elevated. Oxygenation is normal for the altitude. Temperature is normal."
        );
    }

    #[test]
    fn test_chat_json() {
        let assistant = VitalsAssistant::default();
        assistant.ingest(reading_at(0, 72, 91, 36.5));

        let reply = assistant.chat_json(r#"{"message": "what should I eat?"}"#).unwrap();
        let parsed: ChatResponse = serde_json::from_str(&reply).unwrap();
        assert_eq!(parsed.reply, crate::narrative::GENERAL_DIET);

        let reply = assistant.chat_json(r#"{"message": "   "}"#).unwrap();
        let parsed: ChatResponse = serde_json::from_str(&reply).unwrap();
        assert_eq!(parsed.reply, FALLBACK_REPLY);

        assert!(matches!(
            assistant.chat_json("{}"),
            Err(VitalError::MissingField(_))
        ));
        assert!(matches!(
            assistant.chat_json("nope"),
            Err(VitalError::JsonError(_))
        ));
    }

    #[test]
    fn test_implausible_ingest_is_stored() {
        let assistant = VitalsAssistant::default();
        let outcome = assistant
            .ingest_json(r#"{"heart_rate": 350, "spo2": 95, "temperature": 36.6}"#)
            .unwrap();
        assert_eq!(outcome.flags, vec![PlausibilityFlag::HeartRateOutOfRange]);
        assert_eq!(assistant.store().len(), 1);
    }

    #[test]
    fn test_chart_is_bounded() {
        let config = EngineConfig {
            chart_points: 4,
            ..Default::default()
        };
        let assistant = VitalsAssistant::with_config(config).unwrap();
        for i in 0..10 {
            assistant.ingest(reading_at(i, 70 + i as i32, 90, 36.6));
        }
        let snapshot = assistant.snapshot();
        assert_eq!(snapshot.chart.heart_rate, vec![Some(76), Some(77), Some(78), Some(79)]);
        // Trend still sees six readings even though the chart shows four
        assert_eq!(snapshot.trend, Trend::Worsening);
    }

    #[test]
    fn test_save_and_restore_store() {
        let assistant = VitalsAssistant::default();
        assistant.ingest(reading_at(0, 135, 78, 39.8));
        let saved = assistant.save_store().unwrap();

        let restored =
            VitalsAssistant::from_saved_store(&saved, EngineConfig::default()).unwrap();
        assert_eq!(restored.store().len(), 1);
        assert!(restored.reply("alert").starts_with("URGENT"));
    }

    #[test]
    fn test_restored_store_uses_configured_capacity() {
        let assistant = VitalsAssistant::default();
        for i in 0..3 {
            assistant.ingest(reading_at(i, 80 + i as i32, 92, 36.7));
        }
        let saved = assistant.save_store().unwrap();

        let config = EngineConfig {
            store_capacity: 2,
            ..Default::default()
        };
        let restored = VitalsAssistant::from_saved_store(&saved, config).unwrap();
        assert_eq!(restored.store().capacity(), restored.config().store_capacity);
        assert_eq!(restored.store().len(), 2);
        assert_eq!(restored.store().latest().unwrap().heart_rate(), Some(82));
    }

    #[test]
    fn test_device_clock_cannot_reorder_readings() {
        let assistant = VitalsAssistant::default();
        assistant
            .ingest_json(r#"{"heart_rate": 70, "timestamp": "2030-01-01T00:00:00Z"}"#)
            .unwrap();
        assistant.ingest_json(r#"{"heart_rate": 71}"#).unwrap();

        let window = assistant.store().recent_window(2);
        assert_eq!(window.len(), 2);
        assert!(window[0].timestamp() <= window[1].timestamp());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = EngineConfig {
            trend_window: 1,
            ..Default::default()
        };
        assert!(VitalsAssistant::with_config(config).is_err());
    }

    #[test]
    fn test_concurrent_ingest_and_chat() {
        let assistant = Arc::new(VitalsAssistant::default());

        let writer = {
            let assistant = Arc::clone(&assistant);
            thread::spawn(move || {
                for i in 0..200 {
                    assistant.ingest(reading_at(i, 80, 92, 36.7));
                }
            })
        };
        let reader = {
            let assistant = Arc::clone(&assistant);
            thread::spawn(move || {
                for _ in 0..200 {
                    let reply = assistant.reply("status");
                    assert!(
                        reply == INSUFFICIENT_DATA
                            || reply == "Heart rate is normal. Oxygenation is normal for the altitude. Temperature is normal."
                    );
                }
            })
        };

        writer.join().unwrap();
        reader.join().unwrap();
        assert_eq!(assistant.store().len(), 60);
    }
}
