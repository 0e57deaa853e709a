//! Externally injected notes.
//!
//! GUI threads push notes here; the audio thread drains the queue once per
//! cycle. The lock is held only for the push or for the copy/clear, and the
//! audio thread never waits on it.

use crate::{Error, Result};
use parking_lot::Mutex;
use ripieno_core::MAX_MIDI_CHANNELS;

pub const MAX_QUEUED_NOTES: usize = 512;

/// A queued note. `velocity == 0` is a note-off; `channel < 0` marks an empty slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalNote {
    pub channel: i8,
    pub note: u8,
    pub velocity: u8,
}

impl ExternalNote {
    pub const EMPTY: Self = Self {
        channel: -1,
        note: 0,
        velocity: 0,
    };

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.channel < 0
    }
}

impl Default for ExternalNote {
    fn default() -> Self {
        Self::EMPTY
    }
}

pub struct NoteQueue {
    slots: Mutex<Box<[ExternalNote; MAX_QUEUED_NOTES]>>,
}

impl NoteQueue {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(Box::new([ExternalNote::EMPTY; MAX_QUEUED_NOTES])),
        }
    }

    /// Queues a note; `velocity == 0` sends a note-off.
    pub fn push(&self, channel: u8, note: u8, velocity: u8) -> Result<()> {
        if channel as usize >= MAX_MIDI_CHANNELS {
            return Err(Error::InvalidChannel(channel as i32));
        }
        if note > 127 {
            return Err(Error::InvalidDataByte(note));
        }
        if velocity > 127 {
            return Err(Error::InvalidDataByte(velocity));
        }

        let mut slots = self.slots.lock();
        let slot = slots
            .iter_mut()
            .find(|slot| slot.is_empty())
            .ok_or(Error::QueueFull {
                capacity: MAX_QUEUED_NOTES,
            })?;
        *slot = ExternalNote {
            channel: channel as i8,
            note,
            velocity,
        };
        Ok(())
    }

    /// Moves queued notes into `out`, stopping at the first empty slot.
    ///
    /// Returns `false` without touching `out` when another thread holds the
    /// lock; the notes stay queued for the next cycle. `out` is expected to
    /// have room for [`MAX_QUEUED_NOTES`] entries.
    pub fn try_drain_into(&self, out: &mut Vec<ExternalNote>) -> bool {
        let Some(mut slots) = self.slots.try_lock() else {
            return false;
        };

        for slot in slots.iter_mut() {
            if slot.is_empty() {
                break;
            }
            if out.len() < out.capacity() {
                out.push(*slot);
            }
            *slot = ExternalNote::EMPTY;
        }
        true
    }

    /// Drops every queued note.
    pub fn clear(&self) {
        self.slots.lock().fill(ExternalNote::EMPTY);
    }

    pub fn pending(&self) -> usize {
        self.slots.lock().iter().take_while(|slot| !slot.is_empty()).count()
    }
}

impl Default for NoteQueue {
    fn default() -> Self {
        Self::new()
    }
}
