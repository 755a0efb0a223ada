//! Chat routing
//!
//! Maps a free-text utterance onto one of a closed set of intents by
//! case-insensitive keyword match against a static keyword table, then
//! composes the reply for that intent. The table is checked in priority
//! order and the first matching row wins, so an utterance carrying keywords
//! from several rows always resolves the same way. Keywords cover English
//! and Spanish.
//!
//! A keyword only matches where a word starts, so "risk" does not fire inside
//! "brisk". Keywords may be stems: "recommend" also matches "recommendation".

use crate::classify::Classifier;
use crate::config::{EngineConfig, DEFAULT_HISTORY_POINTS};
use crate::narrative::NarrativeComposer;
use crate::risk::RiskEvaluator;
use crate::trend::TrendAnalyzer;
use crate::types::{Intent, RiskLevel, VitalReading};
use log::debug;
use serde::{Deserialize, Serialize};

/// Keyword table in priority order. Keywords are lowercase.
pub const ROUTES: &[(Intent, &[&str])] = &[
    (
        Intent::Summary,
        &["summary", "overview", "full report", "resumen", "informe completo"],
    ),
    (
        Intent::Alert,
        &["alert", "alarm", "emergency", "urgent", "alarma", "emergencia", "urgente"],
    ),
    (Intent::Risk, &["risk", "danger", "riesgo", "peligro"]),
    (
        Intent::Trend,
        &[
            "trend",
            "improving",
            "getting better",
            "getting worse",
            "worsening",
            "evolution",
            "tendencia",
            "mejorando",
            "empeorando",
            "evolución",
        ],
    ),
    (
        Intent::History,
        &[
            "history",
            "previous readings",
            "past readings",
            "last readings",
            "historial",
            "lecturas anteriores",
            "últimas lecturas",
        ],
    ),
    (
        Intent::Nutrition,
        &[
            "nutrition",
            "diet",
            "food",
            "what should i eat",
            "what to eat",
            "nutrición",
            "dieta",
            "comida",
            "alimenta",
        ],
    ),
    (
        Intent::Recommendation,
        &[
            "recommend",
            "advice",
            "advise",
            "suggest",
            "what should i do",
            "recomend",
            "recomienda",
            "consejo",
            "qué hago",
        ],
    ),
    (
        Intent::Status,
        &[
            "status",
            "how am i",
            "vitals",
            "vital signs",
            "heart",
            "pulse",
            "oxygen",
            "spo2",
            "temperature",
            "fever",
            "diagnos",
            "estado",
            "cómo estoy",
            "como estoy",
            "signos",
            "pulso",
            "corazón",
            "oxígeno",
            "oxigeno",
            "temperatura",
            "fiebre",
            "diagnós",
        ],
    ),
];

/// Reply when no keyword matches
pub const FALLBACK_REPLY: &str = "I can tell you about your current status, your risk level \
and any alerts, give care or nutrition recommendations, review your reading history and \
trend, or put it all together in a summary.";

/// Routed reply with the intent that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutedReply {
    pub intent: Intent,
    pub text: String,
}

/// Keyword router bound to the engine configuration
#[derive(Debug, Clone, Copy)]
pub struct QueryRouter {
    classifier: Classifier,
    risk: RiskEvaluator,
    trend: TrendAnalyzer,
    history_points: usize,
}

impl Default for QueryRouter {
    fn default() -> Self {
        Self {
            classifier: Classifier::default(),
            risk: RiskEvaluator::default(),
            trend: TrendAnalyzer::default(),
            history_points: DEFAULT_HISTORY_POINTS,
        }
    }
}

impl QueryRouter {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            classifier: Classifier::new(config.oxygen),
            risk: RiskEvaluator::new(config.risk),
            trend: TrendAnalyzer::new(config.trend_window),
            history_points: config.history_points.max(1),
        }
    }

    /// Intent of an utterance; `Fallback` when nothing matches
    pub fn intent(utterance: &str) -> Intent {
        let lowered = utterance.to_lowercase();
        ROUTES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| starts_word(&lowered, k)))
            .map_or(Intent::Fallback, |(intent, _)| *intent)
    }

    /// Final reply text for an utterance
    pub fn route(
        &self,
        utterance: &str,
        latest: Option<&VitalReading>,
        window: &[VitalReading],
    ) -> String {
        self.dispatch(utterance, latest, window).text
    }

    /// Route an utterance and keep the chosen intent alongside the reply
    pub fn dispatch(
        &self,
        utterance: &str,
        latest: Option<&VitalReading>,
        window: &[VitalReading],
    ) -> RoutedReply {
        let intent = Self::intent(utterance);
        debug!("routed utterance to {intent:?}");

        let bands = self.classifier.classify_latest(latest);
        let text = match intent {
            Intent::Status => NarrativeComposer::status(&bands),
            Intent::Risk => self.risk_reply(latest),
            Intent::Alert => NarrativeComposer::alert(self.risk.evaluate(latest)),
            Intent::Recommendation => NarrativeComposer::care(&bands),
            Intent::Nutrition => NarrativeComposer::nutrition(&bands),
            Intent::History => {
                let skip = window.len().saturating_sub(self.history_points);
                NarrativeComposer::history(&window[skip..])
            }
            Intent::Trend => NarrativeComposer::trend(self.trend.trend(window)),
            Intent::Summary => NarrativeComposer::summary(
                &bands,
                self.risk.evaluate(latest),
                self.trend.trend(window),
            ),
            Intent::Fallback => FALLBACK_REPLY.to_string(),
        };

        RoutedReply { intent, text }
    }

    fn risk_reply(&self, latest: Option<&VitalReading>) -> String {
        let level = self.risk.evaluate(latest);
        match level {
            RiskLevel::Unknown => NarrativeComposer::alert(level),
            _ => format!(
                "Your current risk level is {}. {}",
                level.as_str(),
                NarrativeComposer::alert(level)
            ),
        }
    }
}

/// True when `keyword` occurs in `text` at the start of a word
fn starts_word(text: &str, keyword: &str) -> bool {
    text.match_indices(keyword).any(|(i, _)| {
        text[..i]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrative::INSUFFICIENT_DATA;
    use chrono::{Duration, Utc};

    fn reading(hr: i32, spo2: i32, temp: f64) -> VitalReading {
        VitalReading::new(Some(hr), Some(spo2), Some(temp), Utc::now())
    }

    #[test]
    fn test_keyword_intents() {
        let cases = [
            ("How am I doing?", Intent::Status),
            ("¿Cuál es mi ESTADO?", Intent::Status),
            ("what is my risk", Intent::Risk),
            ("any alerts?", Intent::Alert),
            ("What do you recommend?", Intent::Recommendation),
            ("what should I eat today", Intent::Nutrition),
            ("show my history", Intent::History),
            ("am I improving?", Intent::Trend),
            ("give me a summary", Intent::Summary),
            ("tell me a joke", Intent::Fallback),
            ("", Intent::Fallback),
        ];
        for (utterance, expected) in cases {
            assert_eq!(QueryRouter::intent(utterance), expected, "{utterance}");
        }
    }

    #[test]
    fn test_priority_resolves_conflicts() {
        // summary beats risk, risk beats status, alert beats risk
        assert_eq!(QueryRouter::intent("summary of my risk"), Intent::Summary);
        assert_eq!(QueryRouter::intent("is my heart rate a risk"), Intent::Risk);
        assert_eq!(QueryRouter::intent("risk alert"), Intent::Alert);
        assert_eq!(QueryRouter::intent("diet advice"), Intent::Nutrition);
    }

    #[test]
    fn test_keywords_match_at_word_start_only() {
        assert_eq!(QueryRouter::intent("brisk walk advice"), Intent::Recommendation);
        assert_eq!(QueryRouter::intent("is everything ok?"), Intent::Fallback);
        assert_eq!(QueryRouter::intent("any recommendations?"), Intent::Recommendation);
        assert_eq!(QueryRouter::intent("¿riesgo?"), Intent::Risk);
        assert_eq!(QueryRouter::intent("my heartbeat"), Intent::Status);
    }

    #[test]
    fn test_keywords_are_lowercase() {
        for (_, keywords) in ROUTES {
            for keyword in keywords.iter() {
                assert_eq!(*keyword, keyword.to_lowercase());
            }
        }
    }

    #[test]
    fn test_route_is_deterministic() {
        let router = QueryRouter::default();
        let latest = reading(105, 84, 38.2);
        let window = vec![latest.clone()];
        let first = router.dispatch("full report please", Some(&latest), &window);
        for _ in 0..5 {
            assert_eq!(router.dispatch("full report please", Some(&latest), &window), first);
        }
        assert_eq!(first.intent, Intent::Summary);
    }

    #[test]
    fn test_status_reply() {
        let router = QueryRouter::default();
        let latest = reading(72, 91, 36.5);
        assert_eq!(
            router.route("status", Some(&latest), &[]),
            "Heart rate is normal. Oxygenation is normal for the altitude. Temperature is normal."
        );
    }

    #[test]
    fn test_risk_reply_names_level() {
        let router = QueryRouter::default();
        let latest = reading(135, 78, 39.8);
        let text = router.route("risk?", Some(&latest), &[]);
        assert!(text.starts_with("Your current risk level is critical."));
        assert!(text.contains("URGENT"));
    }

    #[test]
    fn test_no_data_replies() {
        let router = QueryRouter::default();
        for utterance in ["status", "risk", "alert", "advice", "diet", "history", "summary"] {
            assert_eq!(router.route(utterance, None, &[]), INSUFFICIENT_DATA, "{utterance}");
        }
        assert_eq!(
            router.route("trend", None, &[]),
            NarrativeComposer::trend(crate::types::Trend::InsufficientData)
        );
        assert_eq!(router.route("hello", None, &[]), FALLBACK_REPLY);
    }

    #[test]
    fn test_history_uses_last_points() {
        let config = EngineConfig {
            history_points: 2,
            ..Default::default()
        };
        let router = QueryRouter::from_config(&config);
        let start = Utc::now();
        let window: Vec<_> = [60, 70, 80]
            .iter()
            .enumerate()
            .map(|(i, hr)| {
                VitalReading::new(Some(*hr), None, None, start + Duration::seconds(i as i64))
            })
            .collect();
        assert_eq!(
            router.route("history", window.last(), &window),
            "Across the last 2 readings: heart rate between 70 and 80 bpm."
        );
    }
}
