//! Continuous rack: every plugin chained in series on one stereo bus.
//!
//! The engine publishes the plugin list through an `ArcSwap` snapshot; the
//! [`RackProcessor`] owned by the audio thread reads it once per cycle and
//! never blocks in real-time mode.

use arc_swap::ArcSwap;
use ripieno_midi::{ControlEvent, ControlPort, RawMidiEvent, MAX_CONTROL_EVENTS};
use ripieno_plugin::{HostContext, Plugin, ProcessContext, ProcessStatus};
use smallvec::SmallVec;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Channels of the rack bus.
pub const RACK_CHANNELS: usize = 2;

/// State shared between the engine and its rack processors.
pub(crate) struct RackShared {
    pub(crate) plugins: ArcSwap<Vec<Arc<Plugin>>>,
    pub(crate) skipped_cycles: AtomicU64,
}

impl RackShared {
    pub(crate) fn new() -> Self {
        Self {
            plugins: ArcSwap::from_pointee(Vec::new()),
            skipped_cycles: AtomicU64::new(0),
        }
    }
}

/// Drives the rack from the driver callback.
///
/// Created by [`Engine::rack_processor`](crate::Engine::rack_processor) and
/// moved to the audio thread. All buffers are allocated up front.
pub struct RackProcessor {
    host: Arc<HostContext>,
    shared: Arc<RackShared>,
    bus_in: [Vec<f32>; RACK_CHANNELS],
    bus_out: [Vec<f32>; RACK_CHANNELS],
    control_out: ControlPort,
}

impl RackProcessor {
    pub(crate) fn new(host: Arc<HostContext>, shared: Arc<RackShared>) -> Self {
        let frames = host.config().buffer_size as usize;
        Self {
            host,
            shared,
            bus_in: [vec![0.0; frames], vec![0.0; frames]],
            bus_out: [vec![0.0; frames], vec![0.0; frames]],
            control_out: ControlPort::with_capacity(MAX_CONTROL_EVENTS),
        }
    }

    /// Largest block one call renders.
    pub fn max_frames(&self) -> usize {
        self.bus_in[0].len()
    }

    /// Runs every enabled plugin in id order.
    ///
    /// Each plugin reads the previous plugin's output; a plugin without audio
    /// inputs is mixed on top of it instead. Bus channels a plugin does not
    /// write pass through. With no plugin processed the input is copied to
    /// the output. Missing input channels read as silence, output channels
    /// beyond the bus are zeroed. Returns the number of plugins that
    /// processed.
    pub fn process(
        &mut self,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        frames: usize,
        control_in: &[ControlEvent],
        midi_in: &[RawMidiEvent],
    ) -> usize {
        let frames = frames.min(self.max_frames());
        let host = Arc::clone(&self.host);
        let _offline = host.is_offline().then(|| host.lock_process());

        let RackProcessor {
            host: _,
            shared,
            bus_in,
            bus_out,
            control_out,
        } = self;

        for (k, bus) in bus_in.iter_mut().enumerate() {
            match inputs.get(k) {
                Some(input) if input.len() >= frames => bus[..frames].copy_from_slice(&input[..frames]),
                _ => bus[..frames].fill(0.0),
            }
        }
        control_out.clear();

        let force_stereo = host.config().force_stereo;
        let plugins = shared.plugins.load();
        let mut processed = 0;

        for plugin in plugins.iter() {
            if !plugin.is_enabled() {
                continue;
            }

            if processed > 0 {
                for (input, output) in bus_in.iter_mut().zip(bus_out.iter()) {
                    input[..frames].copy_from_slice(&output[..frames]);
                }
            }
            for (output, input) in bus_out.iter_mut().zip(bus_in.iter()) {
                output[..frames].copy_from_slice(&input[..frames]);
            }

            let ins = plugin.audio_in_count().min(RACK_CHANNELS);
            let outs = plugin.audio_out_count().min(RACK_CHANNELS);

            let status = {
                let in_slices: SmallVec<[&[f32]; RACK_CHANNELS]> =
                    bus_in.iter().take(ins).map(|b| &b[..frames]).collect();
                let mut out_slices: SmallVec<[&mut [f32]; RACK_CHANNELS]> =
                    bus_out.iter_mut().take(outs).map(|b| &mut b[..frames]).collect();

                let ctx = ProcessContext::new(frames)
                    .control_in(control_in)
                    .midi_in(midi_in)
                    .control_out(control_out);
                plugin.process(&in_slices, &mut out_slices, ctx)
            };

            if status != ProcessStatus::Processed {
                shared.skipped_cycles.fetch_add(1, Ordering::Relaxed);
            }

            if ins == 0 {
                for (output, input) in bus_out.iter_mut().zip(bus_in.iter()).take(outs) {
                    for (o, i) in output[..frames].iter_mut().zip(&input[..frames]) {
                        *o += *i;
                    }
                }
            }

            if force_stereo && outs == 1 {
                let [left, right] = &mut *bus_out;
                right[..frames].copy_from_slice(&left[..frames]);
            }

            processed += 1;
        }

        if processed == 0 {
            for (output, input) in bus_out.iter_mut().zip(bus_in.iter()) {
                output[..frames].copy_from_slice(&input[..frames]);
            }
        }

        for (k, output) in outputs.iter_mut().enumerate() {
            let n = frames.min(output.len());
            match bus_out.get(k) {
                Some(bus) => output[..n].copy_from_slice(&bus[..n]),
                None => output[..n].fill(0.0),
            }
        }

        processed
    }

    /// Controller values written by the plugins during the last cycle.
    pub fn control_out(&self) -> &[ControlEvent] {
        self.control_out.events()
    }
}
