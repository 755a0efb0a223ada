//! VitalIA - vital-signs assistant engine
//!
//! VitalIA keeps a rolling window of heart rate, SpO₂ and body temperature
//! readings posted by a device and answers questions about them:
//! device JSON → ingest → reading store → classification / risk / trend
//! → narrative replies and dashboard snapshots.
//!
//! ## Modules
//!
//! - **Evaluation core**: band classification, risk tiers, trend and narratives
//! - **Chat**: keyword routing of free-text questions onto narrative replies
//! - **Assistant**: stateful orchestration over a shared reading store

pub mod assistant;
pub mod classify;
pub mod config;
pub mod encoder;
pub mod error;
pub mod ingest;
pub mod narrative;
pub mod risk;
pub mod router;
pub mod store;
pub mod trend;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use assistant::{ChatRequest, ChatResponse, VitalsAssistant};
pub use classify::{classify_heart_rate, classify_temperature, Classifier};
pub use config::EngineConfig;
pub use encoder::{SnapshotEncoder, SNAPSHOT_VERSION};
pub use error::VitalError;
pub use ingest::{IngestOutcome, Ingestor};
pub use narrative::{NarrativeComposer, INSUFFICIENT_DATA};
pub use risk::RiskEvaluator;
pub use router::{QueryRouter, RoutedReply};
pub use store::ReadingStore;
pub use trend::TrendAnalyzer;
pub use types::{DashboardSnapshot, Intent, RiskLevel, Trend, VitalBands, VitalReading};

/// VitalIA version embedded in all snapshots
pub const VITALIA_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for snapshots
pub const PRODUCER_NAME: &str = "vitalia";
