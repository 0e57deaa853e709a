//! Driver MIDI events.

use crate::control::local_time;
use midi_msg::{ChannelVoiceMsg, MidiMsg};

/// Status nibbles of channel voice messages.
pub mod status {
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
    pub const POLYPHONIC_AFTERTOUCH: u8 = 0xA0;
    pub const CONTROL_CHANGE: u8 = 0xB0;
    pub const PROGRAM_CHANGE: u8 = 0xC0;
    pub const CHANNEL_PRESSURE: u8 = 0xD0;
    pub const PITCH_WHEEL: u8 = 0xE0;
}

/// Raw MIDI bytes as delivered by the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct RawMidiEvent {
    /// Frame offset from the start of the engine buffer.
    pub time: u32,
    pub data: [u8; 3],
    /// Valid bytes in `data` (1-3).
    pub size: u8,
}

impl RawMidiEvent {
    /// Copies up to three bytes of `bytes`.
    pub fn new(time: u32, bytes: &[u8]) -> Self {
        let size = bytes.len().min(3);
        let mut data = [0u8; 3];
        data[..size].copy_from_slice(&bytes[..size]);
        Self {
            time,
            data,
            size: size as u8,
        }
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.data[..self.size as usize]
    }

    #[inline]
    pub fn status(&self) -> u8 {
        self.data[0] & 0xF0
    }

    #[inline]
    pub fn channel(&self) -> u8 {
        self.data[0] & 0x0F
    }

    #[inline]
    pub fn local_time(&self, frames_offset: u32, frames: u32) -> Option<u32> {
        local_time(self.time, frames_offset, frames)
    }

    /// Decodes the note, pressure and pitch-bend messages a plugin consumes.
    ///
    /// Note-on with zero velocity decodes as note-off. Everything else,
    /// including malformed bytes, yields `None`.
    pub fn decode(&self) -> Option<MidiInput> {
        let (msg, _len) = MidiMsg::from_midi(self.bytes()).ok()?;
        let MidiMsg::ChannelVoice { channel, msg } = msg else {
            return None;
        };
        let channel = channel as u8;

        match msg {
            ChannelVoiceMsg::NoteOn { note, velocity: 0 } | ChannelVoiceMsg::NoteOff { note, .. } => {
                Some(MidiInput::NoteOff { channel, note })
            }
            ChannelVoiceMsg::NoteOn { note, velocity } => Some(MidiInput::NoteOn {
                channel,
                note,
                velocity,
            }),
            ChannelVoiceMsg::ChannelPressure { pressure } => {
                Some(MidiInput::ChannelPressure { channel, pressure })
            }
            ChannelVoiceMsg::PitchBend { bend } => Some(MidiInput::PitchBend { channel, bend }),
            _ => None,
        }
    }
}

/// A decoded driver MIDI message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MidiInput {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    ChannelPressure { channel: u8, pressure: u8 },
    /// 14-bit value, 8192 is centered.
    PitchBend { channel: u8, bend: u16 },
}
