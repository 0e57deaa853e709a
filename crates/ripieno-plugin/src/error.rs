//! Error types for the plugin layer.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Opening,
    Instantiation,
}

impl std::fmt::Display for LoadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadStage::Opening => write!(f, "opening file"),
            LoadStage::Instantiation => write!(f, "creating instance"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Maximum number of plugins reached")]
    MaxPluginsReached,

    #[error("Requested file is not a valid SoundFont")]
    InvalidSoundFont(PathBuf),

    #[error("Failed to load SoundFont file")]
    SoundFontLoad { path: PathBuf, reason: String },

    #[error("Plugin load failed at {stage} stage: {path}\n  Reason: {reason}")]
    LoadFailed {
        path: PathBuf,
        stage: LoadStage,
        reason: String,
    },

    #[error("Unknown plugin label: {0}")]
    UnknownLabel(String),

    #[error("{what} index {index} out of range (count {count})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        count: usize,
    },

    #[error("Invalid MIDI binding: {0}")]
    InvalidBinding(String),

    #[error("MIDI error: {0}")]
    Midi(#[from] ripieno_midi::Error),
}

impl PluginError {
    pub(crate) fn out_of_range(what: &'static str, index: usize, count: usize) -> Self {
        PluginError::OutOfRange { what, index, count }
    }
}

pub type Result<T> = std::result::Result<T, PluginError>;
