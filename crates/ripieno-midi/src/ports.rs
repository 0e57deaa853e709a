//! Fixed-capacity event buffers for one process cycle.
//!
//! Capacity is reserved up front; pushing never reallocates, so a port can be
//! filled and cleared from the audio thread.

use crate::{ControlEvent, Error, RawMidiEvent, Result};

pub const MAX_CONTROL_EVENTS: usize = 512;
pub const MAX_MIDI_EVENTS: usize = 512;

/// Events for the current buffer, in time order.
#[derive(Debug, Clone)]
pub struct EventPort<T> {
    events: Vec<T>,
    capacity: usize,
}

pub type ControlPort = EventPort<ControlEvent>;
pub type MidiPort = EventPort<RawMidiEvent>;

impl<T: Copy> EventPort<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an event; fails without allocating when the port is full.
    #[inline]
    pub fn push(&mut self, event: T) -> Result<()> {
        if self.events.len() >= self.capacity {
            return Err(Error::QueueFull {
                capacity: self.capacity,
            });
        }
        self.events.push(event);
        Ok(())
    }

    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.events.len() >= self.capacity
    }

    #[inline]
    pub fn events(&self) -> &[T] {
        &self.events
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.events.iter()
    }
}

impl Default for ControlPort {
    fn default() -> Self {
        Self::with_capacity(MAX_CONTROL_EVENTS)
    }
}

impl Default for MidiPort {
    fn default() -> Self {
        Self::with_capacity(MAX_MIDI_EVENTS)
    }
}
