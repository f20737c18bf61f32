use std::{fs, path::Path};

use serde::Deserialize;

use crate::{ConvoflowError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// consecutive autonomous steps allowed before the loop guard trips, defaults to 5
    pub max_auto_steps: usize,
    /// advance through non-interactive nodes without waiting for `resume(None)`
    pub auto_advance: bool,
    /// upper bound for any single delay or simulated call, in milliseconds
    pub delay_ceiling_ms: u64,
    /// delay used when a delay node has no duration, in milliseconds
    pub default_delay_ms: u64,
    /// artificial latency added to simulated external calls, in milliseconds
    pub simulated_latency_ms: u64,
    /// number of live sessions kept by the engine
    pub session_capacity: usize,
    /// number of deployed flows kept by the engine
    pub flow_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_auto_steps: 5,
            auto_advance: true,
            delay_ceiling_ms: 3000,
            default_delay_ms: 1000,
            simulated_latency_ms: 0,
            session_capacity: 2048,
            flow_capacity: 256,
        }
    }
}

impl Config {
    pub fn create<T: AsRef<Path>>(path: T) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref())
            .map_err(|e| ConvoflowError::Config(format!("failed to load config file {:?}: {}", path.as_ref(), e)))?;

        Self::load_from_str(data.as_str())
    }

    pub fn load_from_str(toml_str: &str) -> Result<Self> {
        let config = toml::from_str::<Config>(toml_str)?;
        Ok(config)
    }

    /// Clamp a requested wait to the configured ceiling.
    pub fn clamp_delay(
        &self,
        millis: u64,
    ) -> u64 {
        millis.min(self.delay_ceiling_ms)
    }
}
