//! # Ripieno - Real-time Plugin Host Engine
//!
//! Loads audio plugins and runs them from a low-latency driver callback.
//!
//! ## Architecture
//!
//! Ripieno is an umbrella crate that coordinates:
//! - **ripieno-core** - Configuration, parameter ranges, peak meters, host callbacks
//! - **ripieno-midi** - Control events, driver MIDI, event ports, external note queue
//! - **ripieno-plugin** - Plugin instances, adapters (SoundFont, native), event
//!   translation and the per-plugin process cycle
//!
//! and adds the [`Engine`] that owns plugin slots and the [`RackProcessor`]
//! that chains them on a stereo bus.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ripieno::prelude::*;
//!
//! let engine = Engine::builder()
//!     .sample_rate(44100.0)
//!     .buffer_size(512)
//!     .build()?;
//!
//! let Some(id) = engine.add_soundfont("gm.sf2", None, "GM") else {
//!     eprintln!("{}", engine.last_error());
//!     return Ok(());
//! };
//! if let Some(synth) = engine.plugin(id) {
//!     synth.set_volume(0.8, Notify::ALL);
//! }
//!
//! // Hand this to the audio thread
//! let mut rack = engine.rack_processor();
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - SoundFont support
//! - `soundfont` - SoundFont (SF2) plugins backed by rustysynth

/// Re-export of ripieno-core for direct access
pub use ripieno_core as core;

/// Re-export of ripieno-midi for direct access
pub use ripieno_midi as midi;

/// Re-export of ripieno-plugin for direct access
pub use ripieno_plugin as plugin;

pub use ripieno_core::{
    CallbackEvent, ChannelCallback, EngineConfig, HostCallback, NullCallback, ParameterHints,
    ParameterRanges, ParameterTarget, PeakMeters, PluginHints, PluginId, ProcessMode,
};

pub use ripieno_midi::{ControlEvent, ControlEventKind, RawMidiEvent};

pub use ripieno_plugin::{
    Notify, Plugin, PluginAdapter, PluginError, PluginUi, ProcessContext, ProcessStatus,
    RemoteControl, RemoteNotification, RemoteRequest, ScopedDisabler,
};

mod error;
pub use error::{Error, Result};

mod builder;
mod engine;
mod rack;

pub use builder::EngineBuilder;
pub use engine::Engine;
pub use rack::{RackProcessor, RACK_CHANNELS};

/// Convenience prelude for common imports
pub mod prelude {
    // Main engine
    pub use crate::{Engine, EngineBuilder, RackProcessor};

    // Configuration and notifications
    pub use crate::{CallbackEvent, ChannelCallback, EngineConfig, HostCallback, ProcessMode};

    // Plugin control
    pub use crate::{Notify, ParameterTarget, Plugin, PluginId, RemoteRequest};

    // Events
    pub use crate::{ControlEvent, RawMidiEvent};
}
