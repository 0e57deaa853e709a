//! Host-level control events.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ControlEventKind {
    #[default]
    Null,
    ControlChange,
    MidiBankChange,
    MidiProgramChange,
    AllSoundOff,
    AllNotesOff,
}

/// A control event for one channel.
///
/// `time` is a frame offset from the start of the engine buffer. For
/// `ControlChange` the value is normalized to `[0, 1]`; for bank and program
/// changes it is the raw bank or program number.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlEvent {
    pub time: u32,
    pub channel: u8,
    pub kind: ControlEventKind,
    pub controller: u16,
    pub value: f64,
}

impl ControlEvent {
    pub fn control_change(time: u32, channel: u8, controller: u16, value: f64) -> Self {
        Self {
            time,
            channel,
            kind: ControlEventKind::ControlChange,
            controller,
            value,
        }
    }

    pub fn bank_change(time: u32, channel: u8, bank: u32) -> Self {
        Self {
            time,
            channel,
            kind: ControlEventKind::MidiBankChange,
            controller: 0,
            value: bank as f64,
        }
    }

    pub fn program_change(time: u32, channel: u8, program: u32) -> Self {
        Self {
            time,
            channel,
            kind: ControlEventKind::MidiProgramChange,
            controller: 0,
            value: program as f64,
        }
    }

    pub fn all_sound_off(time: u32, channel: u8) -> Self {
        Self {
            time,
            channel,
            kind: ControlEventKind::AllSoundOff,
            ..Default::default()
        }
    }

    pub fn all_notes_off(time: u32, channel: u8) -> Self {
        Self {
            time,
            channel,
            kind: ControlEventKind::AllNotesOff,
            ..Default::default()
        }
    }

    /// Position inside a plugin render window starting at `frames_offset`,
    /// or `None` when the event belongs to another cycle.
    #[inline]
    pub fn local_time(&self, frames_offset: u32, frames: u32) -> Option<u32> {
        local_time(self.time, frames_offset, frames)
    }

    /// Bank or program number carried by the event, rounded to the nearest
    /// integer.
    #[inline]
    pub fn number(&self) -> u32 {
        self.value.max(0.0).round() as u32
    }
}

#[inline]
pub(crate) fn local_time(time: u32, frames_offset: u32, frames: u32) -> Option<u32> {
    time.checked_sub(frames_offset).filter(|&t| t < frames)
}
