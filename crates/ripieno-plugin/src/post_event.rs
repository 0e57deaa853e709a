//! Notifications recorded by the audio thread for later dispatch.

use ripieno_core::ParameterTarget;

/// Capacity of each plugin's post-event ring.
pub const MAX_POST_EVENTS: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PostEvent {
    ParameterChange { target: ParameterTarget, value: f64 },
    ProgramChange { index: usize },
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    /// Every note on `channel` was stopped.
    AllNotesOff { channel: u8 },
}

/// Which sinks a control-thread change is reported to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notify {
    pub gui: bool,
    pub remote: bool,
    pub callback: bool,
}

impl Notify {
    pub const ALL: Self = Self {
        gui: true,
        remote: true,
        callback: true,
    };

    pub const NONE: Self = Self {
        gui: false,
        remote: false,
        callback: false,
    };
}

impl Default for Notify {
    fn default() -> Self {
        Self::ALL
    }
}
