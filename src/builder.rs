use std::{path::Path, sync::Arc};

use crate::{Channel, Config, Engine, Result};

#[derive(Default)]
pub struct EngineBuilder {
    config: Option<Config>,
    channel: Option<Arc<Channel>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(
        mut self,
        config: Config,
    ) -> Self {
        self.config = Some(config);
        self
    }

    /// Load the engine configuration from a TOML file.
    pub fn config_file<P: AsRef<Path>>(
        mut self,
        path: P,
    ) -> Result<Self> {
        self.config = Some(Config::create(path)?);
        Ok(self)
    }

    /// Publish session events to an existing channel.
    pub fn channel(
        mut self,
        channel: Arc<Channel>,
    ) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn build(self) -> Result<Engine> {
        let config = self.config.unwrap_or_default();
        let channel = self.channel.unwrap_or_default();
        Ok(Engine::with_channel(config, channel))
    }
}
