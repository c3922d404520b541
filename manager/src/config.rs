//! Worker configuration.
//!
//! A [`WorkerConfig`] can be built in code or deserialized from the YAML an
//! application already keeps its settings in:
//!
//! ```yaml
//! name: ecg-consumer
//! period: 0.02   # seconds between loop iterations
//! start: true
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Settings for a single worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Thread name. Empty means a generated `physio-worker-<n>` name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Target time between loop iterations, in seconds when serialized.
    /// Ignored by one-shot workers.
    #[serde(with = "seconds")]
    pub period: Duration,

    /// Whether the worker starts enabled.
    pub start: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            period: Duration::ZERO,
            start: true,
        }
    }
}

impl WorkerConfig {
    /// Creates a config for an enabled, unnamed worker with zero period.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a config from a YAML document.
    pub fn from_yaml(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Set the thread name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the loop period.
    pub fn period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Set whether the worker starts enabled.
    pub fn start(mut self, start: bool) -> Self {
        self.start = start;
        self
    }
}

/// Serializes a `Duration` as floating-point seconds.
mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
