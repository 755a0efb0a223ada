//! Narrative composition
//!
//! Turns bands, risk and trend verdicts into fixed English sentences. Every
//! narrative is deterministic: clauses follow the order heart rate, oxygen,
//! temperature and are joined by single spaces. Clauses for unknown vitals
//! are left out; a narrative with nothing known to narrate returns
//! [`INSUFFICIENT_DATA`] instead of a partial sentence.

use crate::types::{
    HeartRateBand, OxygenBand, RiskLevel, TemperatureBand, Trend, VitalBands, VitalReading,
};

/// Reply when there is nothing known to narrate
pub const INSUFFICIENT_DATA: &str = "I don't have enough patient data yet.";

/// Closing clause of every nutrition narrative
pub const GENERAL_DIET: &str =
    "Keep a balanced diet with plenty of water, fruit and vegetables.";

const NO_CARE_NEEDED: &str =
    "Your readings don't call for any specific care right now; keep your usual routine.";

/// Stateless composer of the narrative kinds
pub struct NarrativeComposer;

impl NarrativeComposer {
    /// One clause per known vital describing its band
    pub fn status(bands: &VitalBands) -> String {
        let clauses: Vec<&str> = [
            heart_rate_status(bands.heart_rate),
            oxygen_status(bands.oxygen),
            temperature_status(bands.temperature),
        ]
        .into_iter()
        .flatten()
        .collect();

        join_or_insufficient(&clauses)
    }

    /// Single sentence keyed by risk level
    pub fn alert(risk: RiskLevel) -> String {
        let text = match risk {
            RiskLevel::Critical => {
                "URGENT: seek medical care immediately, your vital signs are in a critical range."
            }
            RiskLevel::High => {
                "Important warning: your vital signs show significant abnormalities, contact a health professional soon."
            }
            RiskLevel::Medium => {
                "Preventive notice: some readings are outside the ideal range, rest and keep monitoring."
            }
            RiskLevel::Low => "No alerts: your vital signs are within expected ranges.",
            RiskLevel::Unknown => INSUFFICIENT_DATA,
        };
        text.to_string()
    }

    /// General care advice; each clause is triggered independently
    pub fn care(bands: &VitalBands) -> String {
        if bands.all_unknown() {
            return INSUFFICIENT_DATA.to_string();
        }

        let mut clauses = Vec::new();

        match bands.heart_rate {
            HeartRateBand::High => clauses.push(
                "Rest and stay hydrated, and avoid physical exertion until your heart rate settles.",
            ),
            HeartRateBand::Low => clauses.push(
                "If you feel dizzy or faint, sit or lie down and seek medical advice.",
            ),
            _ => {}
        }

        match bands.oxygen {
            OxygenBand::SevereHypoxia => clauses.push(
                "Rest, ventilate the room and seek medical attention if you feel short of breath.",
            ),
            OxygenBand::ModerateHypoxia | OxygenBand::MildHypoxia => clauses.push(
                "Rest, breathe deeply and keep the room well ventilated.",
            ),
            _ => {}
        }

        match bands.temperature {
            TemperatureBand::HighFever | TemperatureBand::ModerateFever => clauses.push(
                "Manage the fever with fluids and cool compresses, and contact a doctor if it persists.",
            ),
            TemperatureBand::MildFever | TemperatureBand::LowGradeFever => clauses.push(
                "Drink plenty of fluids, rest and keep checking your temperature.",
            ),
            TemperatureBand::Hypothermic => {
                clauses.push("Keep warm with blankets and warm drinks.")
            }
            _ => {}
        }

        if clauses.is_empty() {
            return NO_CARE_NEEDED.to_string();
        }
        clauses.join(" ")
    }

    /// Nutrition advice, always closed by [`GENERAL_DIET`]
    pub fn nutrition(bands: &VitalBands) -> String {
        if bands.all_unknown() {
            return INSUFFICIENT_DATA.to_string();
        }

        let mut clauses = Vec::new();
        if bands.heart_rate == HeartRateBand::High {
            clauses.push("Avoid coffee, energy drinks and other stimulants.");
        }
        if bands.temperature.is_fever() {
            clauses.push("Prefer light, easily digested meals such as broths and fruit.");
        }
        if bands.oxygen.is_hypoxic() {
            clauses.push("Include iron-rich foods such as legumes, spinach and lean red meat.");
        }
        clauses.push(GENERAL_DIET);
        clauses.join(" ")
    }

    /// Sentence for a trend verdict
    pub fn trend(trend: Trend) -> String {
        let text = match trend {
            Trend::Improving => "Your vital signs are improving compared with earlier readings.",
            Trend::Stable => "Your vital signs are stable compared with earlier readings.",
            Trend::Worsening => {
                "Your vital signs are worsening compared with earlier readings; keep a close watch."
            }
            Trend::InsufficientData => "There are not enough readings yet to judge a trend.",
        };
        text.to_string()
    }

    /// Range of each known vital over a chronologically ordered window
    pub fn history(window: &[VitalReading]) -> String {
        let mut parts = Vec::new();

        if let Some((lo, hi)) = range(window.iter().filter_map(|r| r.heart_rate())) {
            parts.push(format!("heart rate between {lo} and {hi} bpm"));
        }
        if let Some((lo, hi)) = range(window.iter().filter_map(|r| r.oxygen_saturation())) {
            parts.push(format!("oxygenation between {lo}% and {hi}%"));
        }
        let temperatures = window.iter().filter_map(|r| r.temperature_c());
        if let Some((lo, hi)) = temperatures.fold(None, |acc: Option<(f64, f64)>, t| match acc {
            None => Some((t, t)),
            Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
        }) {
            parts.push(format!("temperature between {lo:.1} and {hi:.1} °C"));
        }

        if parts.is_empty() {
            return INSUFFICIENT_DATA.to_string();
        }

        let lead = if window.len() == 1 {
            "In the last reading".to_string()
        } else {
            format!("Across the last {} readings", window.len())
        };
        format!("{lead}: {}.", parts.join(", "))
    }

    /// All narrative kinds with section labels
    pub fn summary(bands: &VitalBands, risk: RiskLevel, trend: Trend) -> String {
        if bands.all_unknown() {
            return INSUFFICIENT_DATA.to_string();
        }

        [
            format!("Status: {}", Self::status(bands)),
            format!("Alert: {}", Self::alert(risk)),
            format!("Care: {}", Self::care(bands)),
            format!("Nutrition: {}", Self::nutrition(bands)),
            format!("Trend: {}", Self::trend(trend)),
        ]
        .join(" ")
    }
}

fn heart_rate_status(band: HeartRateBand) -> Option<&'static str> {
    match band {
        HeartRateBand::Low => Some("Heart rate is low."),
        HeartRateBand::Normal => Some("Heart rate is normal."),
        HeartRateBand::High => Some("Heart rate is elevated."),
        HeartRateBand::Unknown => None,
    }
}

fn oxygen_status(band: OxygenBand) -> Option<&'static str> {
    match band {
        OxygenBand::Normal => Some("Oxygenation is normal for the altitude."),
        OxygenBand::MildHypoxia => Some("Mild hypoxia: oxygenation is slightly low."),
        OxygenBand::ModerateHypoxia => Some("Moderate hypoxia: oxygenation is low."),
        OxygenBand::SevereHypoxia => Some("Severe hypoxia: oxygenation is critically low."),
        OxygenBand::Unknown => None,
    }
}

fn temperature_status(band: TemperatureBand) -> Option<&'static str> {
    match band {
        TemperatureBand::Hypothermic => Some("Body temperature is below normal."),
        TemperatureBand::Normal => Some("Temperature is normal."),
        TemperatureBand::LowGradeFever => Some("Low-grade fever detected."),
        TemperatureBand::MildFever => Some("Mild fever detected."),
        TemperatureBand::ModerateFever => Some("Moderate fever detected."),
        TemperatureBand::HighFever => Some("High fever detected."),
        TemperatureBand::Unknown => None,
    }
}

fn join_or_insufficient(clauses: &[&str]) -> String {
    if clauses.is_empty() {
        INSUFFICIENT_DATA.to_string()
    } else {
        clauses.join(" ")
    }
}

fn range(values: impl Iterator<Item = i32>) -> Option<(i32, i32)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;

    fn bands(hr: HeartRateBand, o2: OxygenBand, temp: TemperatureBand) -> VitalBands {
        VitalBands {
            heart_rate: hr,
            oxygen: o2,
            temperature: temp,
        }
    }

    #[test]
    fn test_status_order_and_spacing() {
        let text = NarrativeComposer::status(&bands(
            HeartRateBand::High,
            OxygenBand::MildHypoxia,
            TemperatureBand::LowGradeFever,
        ));
        assert_eq!(
            text,
            "Heart rate is elevated. Mild hypoxia: oxygenation is slightly low. Low-grade fever detected."
        );
    }

    #[test]
    fn test_status_skips_unknown_vitals() {
        let text = NarrativeComposer::status(&bands(
            HeartRateBand::Unknown,
            OxygenBand::Normal,
            TemperatureBand::Unknown,
        ));
        assert_eq!(text, "Oxygenation is normal for the altitude.");
    }

    #[test]
    fn test_all_unknown_is_insufficient_everywhere() {
        let unknown = VitalBands::UNKNOWN;
        assert_eq!(NarrativeComposer::status(&unknown), INSUFFICIENT_DATA);
        assert_eq!(NarrativeComposer::alert(RiskLevel::Unknown), INSUFFICIENT_DATA);
        assert_eq!(NarrativeComposer::care(&unknown), INSUFFICIENT_DATA);
        assert_eq!(NarrativeComposer::nutrition(&unknown), INSUFFICIENT_DATA);
        assert_eq!(
            NarrativeComposer::summary(&unknown, RiskLevel::Unknown, Trend::InsufficientData),
            INSUFFICIENT_DATA
        );
        assert_eq!(NarrativeComposer::history(&[]), INSUFFICIENT_DATA);
    }

    #[test]
    fn test_alert_wording() {
        assert!(NarrativeComposer::alert(RiskLevel::Critical).starts_with("URGENT"));
        assert!(NarrativeComposer::alert(RiskLevel::High).starts_with("Important warning"));
        assert!(NarrativeComposer::alert(RiskLevel::Medium).starts_with("Preventive notice"));
        assert!(NarrativeComposer::alert(RiskLevel::Low).starts_with("No alerts"));
    }

    #[test]
    fn test_care_clauses_accumulate() {
        let text = NarrativeComposer::care(&bands(
            HeartRateBand::High,
            OxygenBand::SevereHypoxia,
            TemperatureBand::HighFever,
        ));
        let rest = text.find("Rest and stay hydrated").unwrap();
        let ventilate = text.find("ventilate the room").unwrap();
        let fever = text.find("Manage the fever").unwrap();
        assert!(rest < ventilate && ventilate < fever);
    }

    #[test]
    fn test_care_with_nothing_triggered() {
        let text = NarrativeComposer::care(&bands(
            HeartRateBand::Normal,
            OxygenBand::Normal,
            TemperatureBand::Normal,
        ));
        assert_eq!(text, NO_CARE_NEEDED);
    }

    #[test]
    fn test_nutrition_always_ends_with_general_diet() {
        let normal = NarrativeComposer::nutrition(&bands(
            HeartRateBand::Normal,
            OxygenBand::Normal,
            TemperatureBand::Normal,
        ));
        assert_eq!(normal, GENERAL_DIET);

        let sick = NarrativeComposer::nutrition(&bands(
            HeartRateBand::High,
            OxygenBand::ModerateHypoxia,
            TemperatureBand::MildFever,
        ));
        assert!(sick.starts_with("Avoid coffee"));
        assert!(sick.contains("light, easily digested"));
        assert!(sick.contains("iron-rich"));
        assert!(sick.ends_with(GENERAL_DIET));
    }

    #[test]
    fn test_history_ranges() {
        let start = Utc::now();
        let window = vec![
            VitalReading::new(Some(80), Some(90), Some(36.6), start),
            VitalReading::new(Some(95), None, Some(37.3), start + Duration::seconds(2)),
            VitalReading::new(Some(72), Some(88), None, start + Duration::seconds(4)),
        ];
        assert_eq!(
            NarrativeComposer::history(&window),
            "Across the last 3 readings: heart rate between 72 and 95 bpm, \
             oxygenation between 88% and 90%, temperature between 36.6 and 37.3 °C."
        );
    }

    #[test]
    fn test_summary_sections() {
        let text = NarrativeComposer::summary(
            &bands(HeartRateBand::Normal, OxygenBand::Normal, TemperatureBand::Normal),
            RiskLevel::Low,
            Trend::Stable,
        );
        let labels = ["Status:", "Alert:", "Care:", "Nutrition:", "Trend:"];
        let positions: Vec<usize> = labels.iter().map(|l| text.find(l).unwrap()).collect();
        assert!(positions.windows(2).all(|p| p[0] < p[1]));
        assert!(text.ends_with(&NarrativeComposer::trend(Trend::Stable)));
    }
}
