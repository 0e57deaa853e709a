//! Per-plugin peak levels.
//!
//! The process cycle writes the peaks of each plugin once per buffer; the host
//! reads them from any thread.

use crate::{AtomicFloat, PluginId};

#[derive(Debug, Default, Clone)]
struct PeakSlot {
    input: [AtomicFloat; 2],
    output: [AtomicFloat; 2],
}

/// Lock-free storage for input/output peaks, one slot per plugin id.
#[derive(Debug)]
pub struct PeakMeters {
    slots: Box<[PeakSlot]>,
}

impl PeakMeters {
    pub fn new(max_plugins: usize) -> Self {
        Self {
            slots: (0..max_plugins).map(|_| PeakSlot::default()).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn set_input(&self, id: PluginId, peaks: [f32; 2]) {
        if let Some(slot) = self.slots.get(id as usize) {
            slot.input[0].set(peaks[0]);
            slot.input[1].set(peaks[1]);
        }
    }

    #[inline]
    pub fn set_output(&self, id: PluginId, peaks: [f32; 2]) {
        if let Some(slot) = self.slots.get(id as usize) {
            slot.output[0].set(peaks[0]);
            slot.output[1].set(peaks[1]);
        }
    }

    pub fn input(&self, id: PluginId) -> [f32; 2] {
        self.slots
            .get(id as usize)
            .map(|slot| [slot.input[0].get(), slot.input[1].get()])
            .unwrap_or_default()
    }

    pub fn output(&self, id: PluginId) -> [f32; 2] {
        self.slots
            .get(id as usize)
            .map(|slot| [slot.output[0].get(), slot.output[1].get()])
            .unwrap_or_default()
    }

    pub fn reset(&self, id: PluginId) {
        self.set_input(id, [0.0; 2]);
        self.set_output(id, [0.0; 2]);
    }
}

/// Largest absolute sample value of `samples`.
#[inline]
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
}
