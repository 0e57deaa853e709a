//! Core data model and real-time primitives for the ripieno plugin host.
//!
//! # Primary API
//!
//! - [`EngineConfig`]: sample rate, buffer size, process mode
//! - [`ParameterRanges`] / [`ParameterHints`]: clamping and quantization rules
//! - [`PeakMeters`]: per-plugin peak storage read by the host
//! - [`HostCallback`]: fire-and-forget notification sink
//! - [`outbox`]: snapshot-copy queue from the audio thread to control threads

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub use config::{EngineConfig, ProcessMode, MAX_RACK_PLUGINS};

pub(crate) mod lockfree;
pub use lockfree::{AtomicDouble, AtomicFlag, AtomicFloat};

pub mod parameter;
pub use parameter::{
    ParameterDirection, ParameterHints, ParameterRanges, ParameterTarget, PluginHints, ScalePoint,
};

pub mod metering;
pub use metering::{peak, PeakMeters};

pub mod callback;
pub use callback::{CallbackEvent, ChannelCallback, HostCallback, NullCallback};

pub mod outbox;
pub use outbox::{outbox, OutboxReceiver, OutboxSender};

pub use std::sync::atomic::Ordering;
pub use std::sync::Arc;

/// Number of MIDI channels.
pub const MAX_MIDI_CHANNELS: usize = 16;

/// Channel reserved for percussion by General MIDI.
pub const PERCUSSION_CHANNEL: u8 = 9;

/// Identifier of a plugin slot inside the engine.
pub type PluginId = u32;

/// Returns the channel as an index when it is a valid MIDI channel.
///
/// Negative values and values `>= 16` mean "unbound".
#[inline]
pub fn channel_index(channel: i32) -> Option<usize> {
    if (0..MAX_MIDI_CHANNELS as i32).contains(&channel) {
        Some(channel as usize)
    } else {
        None
    }
}
