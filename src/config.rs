//! Engine configuration
//!
//! Sample rate and buffer sizing for the engine and its audio glue. Values can
//! be built in code or loaded from JSON.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{ApuError, Result};

/// Default sample rate (44.1 kHz)
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Default samples generated per backend request
pub const DEFAULT_BUFFER_SIZE: usize = 2048;

/// Default register event queue depth
pub const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 256;

/// Lowest sample rate with a non-zero sweep cadence (`sample_rate / 128`)
pub const MIN_SAMPLE_RATE: u32 = 128;

/// Highest accepted sample rate
pub const MAX_SAMPLE_RATE: u32 = 384_000;

/// Configuration for the sound engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApuConfig {
    /// Output sample rate in Hz
    pub sample_rate: u32,

    /// Samples generated per backend request
    /// Typical: 512-2048 samples (12ms-46ms at 44.1kHz)
    pub buffer_size: usize,

    /// Register events that may queue up between generation passes
    pub event_queue_capacity: usize,
}

impl ApuConfig {
    /// Configuration optimized for low latency
    /// Buffer = 512 samples ≈ 12ms @ 44.1kHz
    pub fn low_latency(sample_rate: u32) -> Self {
        ApuConfig {
            sample_rate,
            buffer_size: 512,
            event_queue_capacity: DEFAULT_EVENT_QUEUE_CAPACITY,
        }
    }

    /// Configuration optimized for stability
    /// Buffer = 2048 samples ≈ 46ms @ 44.1kHz
    pub fn stable(sample_rate: u32) -> Self {
        ApuConfig {
            sample_rate,
            buffer_size: DEFAULT_BUFFER_SIZE,
            event_queue_capacity: DEFAULT_EVENT_QUEUE_CAPACITY,
        }
    }

    /// Parse a JSON configuration; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ApuConfig = serde_json::from_str(json)
            .map_err(|e| ApuError::ConfigError(format!("invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check that the cadence formulas are well defined for this configuration
    pub fn validate(&self) -> Result<()> {
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate) {
            return Err(ApuError::ConfigError(format!(
                "sample rate {} Hz outside {MIN_SAMPLE_RATE}..={MAX_SAMPLE_RATE}",
                self.sample_rate
            )));
        }
        if self.buffer_size == 0 {
            return Err(ApuError::ConfigError("buffer size must be greater than 0".into()));
        }
        if self.event_queue_capacity == 0 {
            return Err(ApuError::ConfigError(
                "event queue capacity must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Latency of one buffer in milliseconds
    pub fn latency_ms(&self) -> f32 {
        (self.buffer_size as f32 / self.sample_rate as f32) * 1000.0
    }
}

impl Default for ApuConfig {
    fn default() -> Self {
        Self::stable(DEFAULT_SAMPLE_RATE)
    }
}
