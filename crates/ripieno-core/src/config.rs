//! Engine configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Maximum number of plugins in a continuous rack.
pub const MAX_RACK_PLUGINS: u32 = 16;

/// How the engine exposes plugins to the audio transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProcessMode {
    /// One transport client shared by every plugin.
    SingleClient,
    /// One transport client per plugin.
    MultipleClients,
    /// Plugins chained in series on a fixed stereo bus.
    #[default]
    ContinuousRack,
}

/// Configuration for the plugin engine.
///
/// Sample rate and buffer size are fixed for the lifetime of the engine and
/// read-only to plugins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sample_rate: f64,
    pub buffer_size: u32,
    pub process_mode: ProcessMode,
    /// Offline (bounce) rendering: configuration changes take the engine
    /// process lock instead of disabling single plugins.
    pub offline: bool,
    pub max_plugins: u32,
    /// Duplicate mono plugins so they fill a stereo bus.
    pub force_stereo: bool,
    /// Longest client name the transport accepts.
    pub max_name_length: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            buffer_size: 512,
            process_mode: ProcessMode::default(),
            offline: false,
            max_plugins: MAX_RACK_PLUGINS,
            force_stereo: false,
            max_name_length: 64,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate < 8000.0 || self.sample_rate > 384000.0 {
            return Err(Error::InvalidConfig(format!(
                "sample_rate {} out of range (8000-384000 Hz)",
                self.sample_rate
            )));
        }
        if self.buffer_size == 0 || self.buffer_size > 8192 {
            return Err(Error::InvalidConfig(format!(
                "buffer_size {} out of range (1-8192 frames)",
                self.buffer_size
            )));
        }
        if self.max_plugins == 0 {
            return Err(Error::InvalidConfig("max_plugins must be at least 1".into()));
        }
        if self.process_mode == ProcessMode::ContinuousRack && self.max_plugins > MAX_RACK_PLUGINS {
            return Err(Error::InvalidConfig(format!(
                "max_plugins {} exceeds rack limit of {}",
                self.max_plugins, MAX_RACK_PLUGINS
            )));
        }
        if self.max_name_length < 8 {
            return Err(Error::InvalidConfig(format!(
                "max_name_length {} too short",
                self.max_name_length
            )));
        }
        Ok(())
    }

    /// Whether port names carry the plugin name as prefix (`"name:out-left"`).
    pub fn prefixed_port_names(&self) -> bool {
        self.process_mode != ProcessMode::MultipleClients
    }
}
