//! Event model for the ripieno plugin host.
//!
//! - [`ControlEvent`]: host-level control changes, bank/program changes and
//!   all-notes/all-sound-off, as delivered to a plugin's control input
//! - [`RawMidiEvent`]: driver MIDI bytes, decoded into [`MidiInput`]
//! - [`Controller`]: reserved MIDI controller numbers
//! - [`EventPort`]: fixed-capacity per-cycle event buffers
//! - [`NoteQueue`]: externally injected notes (virtual keyboard, GUI)

pub mod error;
pub use error::{Error, Result};

pub mod cc;
pub use cc::{is_bindable_controller, reserved_control, Controller, ReservedControl};

pub mod control;
pub use control::{ControlEvent, ControlEventKind};

pub mod event;
pub use event::{MidiInput, RawMidiEvent};

pub mod ports;
pub use ports::{ControlPort, EventPort, MidiPort, MAX_CONTROL_EVENTS, MAX_MIDI_EVENTS};

pub mod note_queue;
pub use note_queue::{ExternalNote, NoteQueue, MAX_QUEUED_NOTES};

// Re-export midi-msg types used by decoded events
pub use midi_msg::{Channel, ChannelVoiceMsg, MidiMsg};
