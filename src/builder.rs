//! Builder for configuring and constructing an [`Engine`].

use crate::{Engine, Result};
use ripieno_core::{EngineConfig, HostCallback, NullCallback, ProcessMode};
use ripieno_plugin::{NullRemote, RemoteControl};
use std::sync::Arc;

/// Sample rate and buffer size are fixed once the engine is built; plugins
/// only ever read them.
///
/// # Example
///
/// ```ignore
/// use ripieno::prelude::*;
///
/// let (callback, events) = ChannelCallback::new();
/// let engine = Engine::builder()
///     .sample_rate(48000.0)
///     .buffer_size(256)
///     .callback(callback)
///     .build()?;
/// ```
pub struct EngineBuilder {
    config: EngineConfig,
    callback: Arc<dyn HostCallback>,
    remote: Arc<dyn RemoteControl>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            callback: Arc::new(NullCallback),
            remote: Arc::new(NullRemote),
        }
    }
}

impl EngineBuilder {
    /// Replaces the whole configuration, e.g. one deserialized from settings.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Default: 44100
    pub fn sample_rate(mut self, sample_rate: f64) -> Self {
        self.config.sample_rate = sample_rate;
        self
    }

    /// Default: 512
    pub fn buffer_size(mut self, frames: u32) -> Self {
        self.config.buffer_size = frames;
        self
    }

    /// Default: [`ProcessMode::ContinuousRack`]
    pub fn process_mode(mut self, mode: ProcessMode) -> Self {
        self.config.process_mode = mode;
        self
    }

    /// Offline rendering takes the engine process lock for every cycle.
    pub fn offline(mut self, offline: bool) -> Self {
        self.config.offline = offline;
        self
    }

    pub fn max_plugins(mut self, count: u32) -> Self {
        self.config.max_plugins = count;
        self
    }

    pub fn force_stereo(mut self, force: bool) -> Self {
        self.config.force_stereo = force;
        self
    }

    pub fn max_name_length(mut self, length: usize) -> Self {
        self.config.max_name_length = length;
        self
    }

    pub fn callback(mut self, callback: impl HostCallback + 'static) -> Self {
        self.callback = Arc::new(callback);
        self
    }

    /// Outbound side of the remote-control channel.
    pub fn remote(mut self, remote: impl RemoteControl + 'static) -> Self {
        self.remote = Arc::new(remote);
        self
    }

    pub fn build(self) -> Result<Engine> {
        self.config.validate()?;
        Ok(Engine::from_parts(self.config, self.callback, self.remote))
    }
}
