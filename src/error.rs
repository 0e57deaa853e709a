//! Centralized error type for the ripieno umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] ripieno_core::Error),

    #[error("MIDI: {0}")]
    Midi(#[from] ripieno_midi::Error),

    #[error("Plugin: {0}")]
    Plugin(#[from] ripieno_plugin::PluginError),

    #[error("No plugin with id {0}")]
    UnknownPlugin(ripieno_core::PluginId),
}

pub type Result<T> = std::result::Result<T, Error>;
