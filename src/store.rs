//! Reading retention
//!
//! The store keeps a bounded, chronologically ordered window of recent
//! readings. Appends evict the oldest entry once capacity is reached, and a
//! reading stamped earlier than the newest one is clamped to the newest
//! timestamp so capture time never moves backwards. All
//! access goes through one `RwLock`, so readers always see the state either
//! before or after an append, never in between.

use crate::config::DEFAULT_STORE_CAPACITY;
use crate::error::VitalError;
use crate::types::VitalReading;
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Bounded FIFO store of readings, safe to share between threads
#[derive(Debug)]
pub struct ReadingStore {
    readings: RwLock<VecDeque<VitalReading>>,
    capacity: usize,
}

/// Serialized form of the store
#[derive(Serialize, Deserialize)]
struct StoreState {
    capacity: usize,
    readings: Vec<VitalReading>,
}

impl Default for ReadingStore {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_CAPACITY)
    }
}

impl ReadingStore {
    /// Create an empty store. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            readings: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Build a reading from optional fields and append it
    pub fn append_reading(
        &self,
        heart_rate: Option<i32>,
        oxygen_saturation: Option<i32>,
        temperature_c: Option<f64>,
        timestamp: DateTime<Utc>,
    ) -> VitalReading {
        let reading = VitalReading::new(heart_rate, oxygen_saturation, temperature_c, timestamp);
        self.append(reading.clone());
        reading
    }

    /// Append a reading, evicting the oldest entries beyond capacity
    pub fn append(&self, reading: VitalReading) {
        let mut readings = self.write();
        let reading = match readings.back() {
            Some(newest) if reading.timestamp() < newest.timestamp() => {
                debug!(
                    "clamped reading stamped {} to newest {}",
                    reading.timestamp(),
                    newest.timestamp()
                );
                let clamped = newest.timestamp();
                reading.with_timestamp(clamped)
            }
            _ => reading,
        };
        readings.push_back(reading);
        while readings.len() > self.capacity {
            if let Some(evicted) = readings.pop_front() {
                debug!("evicted reading captured at {}", evicted.timestamp());
            }
        }
    }

    /// Most recent reading, if any
    pub fn latest(&self) -> Option<VitalReading> {
        self.read().back().cloned()
    }

    /// The last `n` readings, oldest first
    pub fn recent_window(&self, n: usize) -> Vec<VitalReading> {
        let readings = self.read();
        let skip = readings.len().saturating_sub(n);
        readings.iter().skip(skip).cloned().collect()
    }

    /// Latest reading and the last `n` readings, taken under one lock
    pub fn snapshot(&self, n: usize) -> (Option<VitalReading>, Vec<VitalReading>) {
        let readings = self.read();
        let skip = readings.len().saturating_sub(n);
        (
            readings.back().cloned(),
            readings.iter().skip(skip).cloned().collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Load a store from JSON with its saved capacity. Readings beyond
    /// capacity are trimmed from the front.
    pub fn from_json(json: &str) -> Result<Self, VitalError> {
        let state: StoreState = serde_json::from_str(json)?;
        Ok(Self::restore(state.readings, state.capacity))
    }

    /// Load saved readings into a store of the given capacity, ignoring the
    /// saved capacity. Readings beyond capacity are trimmed from the front.
    pub fn from_json_with_capacity(json: &str, capacity: usize) -> Result<Self, VitalError> {
        let state: StoreState = serde_json::from_str(json)?;
        if state.capacity != capacity {
            debug!(
                "restoring store saved with capacity {} into capacity {}",
                state.capacity, capacity
            );
        }
        Ok(Self::restore(state.readings, capacity))
    }

    fn restore(readings: Vec<VitalReading>, capacity: usize) -> Self {
        let store = ReadingStore::new(capacity);
        for reading in readings {
            store.append(reading);
        }
        store
    }

    /// Serialize the store to JSON
    pub fn to_json(&self) -> Result<String, VitalError> {
        let state = StoreState {
            capacity: self.capacity,
            readings: self.read().iter().cloned().collect(),
        };
        serde_json::to_string(&state).map_err(VitalError::JsonError)
    }

    fn read(&self) -> RwLockReadGuard<'_, VecDeque<VitalReading>> {
        self.readings.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, VecDeque<VitalReading>> {
        self.readings.write().unwrap_or_else(|e| e.into_inner())
    }
}
