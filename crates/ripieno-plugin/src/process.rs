//! The per-cycle processing path of a plugin.

use crate::plugin::{Plugin, RtState};
use ripieno_core::{peak, ParameterDirection, PluginHints, MAX_MIDI_CHANNELS};
use ripieno_midi::{ControlEvent, ControlPort, RawMidiEvent};

/// Inputs and outputs of one render call, besides the audio buffers.
#[derive(Default)]
pub struct ProcessContext<'a> {
    /// Frames to render, at most the engine buffer size.
    pub frames: usize,
    /// Position of this render inside the engine buffer.
    pub frames_offset: u32,
    pub control_in: &'a [ControlEvent],
    pub midi_in: &'a [RawMidiEvent],
    pub control_out: Option<&'a mut ControlPort>,
}

impl<'a> ProcessContext<'a> {
    pub fn new(frames: usize) -> Self {
        Self {
            frames,
            ..Default::default()
        }
    }

    pub fn offset(mut self, frames_offset: u32) -> Self {
        self.frames_offset = frames_offset;
        self
    }

    pub fn control_in(mut self, events: &'a [ControlEvent]) -> Self {
        self.control_in = events;
        self
    }

    pub fn midi_in(mut self, events: &'a [RawMidiEvent]) -> Self {
        self.midi_in = events;
        self
    }

    pub fn control_out(mut self, port: &'a mut ControlPort) -> Self {
        self.control_out = Some(port);
        self
    }
}

/// Outcome of [`Plugin::process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Processed,
    /// Disabled by the user or by a disable guard; outputs are silent.
    Disabled,
    /// Another thread held the processing state; outputs are silent.
    Busy,
    /// Fewer buffers than the plugin has audio ports; outputs are silent.
    BufferMismatch,
}

#[inline]
fn silence(outputs: &mut [&mut [f32]], frames: usize) {
    for out in outputs.iter_mut() {
        let n = frames.min(out.len());
        out[..n].fill(0.0);
    }
}

impl Plugin {
    /// Renders one cycle.
    ///
    /// Real-time safe: never blocks, never allocates. Only processing-state
    /// contention or a disable request make it skip the cycle, in which case
    /// the outputs are silenced.
    pub fn process(
        &self,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        mut ctx: ProcessContext<'_>,
    ) -> ProcessStatus {
        if !self.is_enabled() {
            return self.skip_cycle(outputs, ctx.frames, ProcessStatus::Disabled);
        }

        let Some(mut guard) = self.rt.try_lock() else {
            return self.skip_cycle(outputs, ctx.frames, ProcessStatus::Busy);
        };
        let rt: &mut RtState = &mut guard;

        if inputs.len() < rt.audio_ins
            || outputs.len() < rt.audio_outs
            || inputs[..rt.audio_ins].iter().any(|b| b.len() < ctx.frames.min(rt.max_frames()))
            || outputs[..rt.audio_outs].iter().any(|b| b.len() < ctx.frames.min(rt.max_frames()))
        {
            return self.skip_cycle(outputs, ctx.frames, ProcessStatus::BufferMismatch);
        }

        let requested = ctx.frames;
        ctx.frames = requested.min(rt.max_frames());
        let frames = ctx.frames;

        self.apply_pending_parameters(rt);

        let active = self.is_active();

        if active && rt.was_active {
            self.translate_control_events(rt, &ctx);
            if !self.is_enabled() {
                return self.skip_cycle(outputs, requested, ProcessStatus::Disabled);
            }

            self.process_midi_input(rt, &ctx);
            if !self.is_enabled() {
                return self.skip_cycle(outputs, requested, ProcessStatus::Disabled);
            }
        }

        let outs = rt.audio_outs;
        let mut input_peaks = [0.0f32; 2];
        let mut output_peaks = [0.0f32; 2];

        if active {
            if !rt.was_active {
                self.reset_sound(rt);
            }

            rt.adapter.render(&inputs[..rt.audio_ins], &mut outputs[..outs], frames);
            if !self.is_enabled() {
                return self.skip_cycle(outputs, requested, ProcessStatus::Disabled);
            }

            self.post_process(rt, inputs, &mut outputs[..outs], frames);

            for (k, input) in inputs.iter().take(rt.audio_ins.min(2)).enumerate() {
                input_peaks[k] = peak(&input[..frames]);
            }
            for (k, output) in outputs.iter().take(outs.min(2)).enumerate() {
                output_peaks[k] = peak(&output[..frames]);
            }

            self.write_output_parameters(rt, &mut ctx);
        } else {
            silence(&mut outputs[..outs], frames);
        }

        if requested > frames {
            for out in outputs[..outs].iter_mut() {
                let end = requested.min(out.len());
                out[frames..end].fill(0.0);
            }
        }

        let peaks = self.host().peaks();
        peaks.set_input(self.id(), input_peaks);
        peaks.set_output(self.id(), output_peaks);

        rt.was_active = active;
        ProcessStatus::Processed
    }

    fn skip_cycle(
        &self,
        outputs: &mut [&mut [f32]],
        frames: usize,
        status: ProcessStatus,
    ) -> ProcessStatus {
        silence(outputs, frames);
        self.host().peaks().reset(self.id());
        status
    }

    /// Pushes values set from control threads into the adapter.
    fn apply_pending_parameters(&self, rt: &mut RtState) {
        if !self.params_dirty.swap(false) {
            return;
        }
        for parameter in self.registry.parameters().iter() {
            if !parameter.info().structural && parameter.take_dirty() {
                rt.adapter
                    .apply_parameter(parameter.info().index, parameter.value());
            }
        }
    }

    /// Silences everything left over from before the plugin was deactivated.
    fn reset_sound(&self, rt: &mut RtState) {
        if let Some(channel) = self.ctrl_in_channel() {
            rt.adapter.all_sounds_off(channel);
            rt.adapter.all_notes_off(channel);
        }
        for channel in 0..MAX_MIDI_CHANNELS as u8 {
            rt.adapter.all_notes_off(channel);
            rt.adapter.all_sounds_off(channel);
        }
    }

    /// Dry/wet, volume and balance.
    fn post_process(
        &self,
        rt: &mut RtState,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        frames: usize,
    ) {
        let hints = self.hints();

        let dry_wet = self.dry_wet() as f32;
        if hints.contains(PluginHints::CAN_DRYWET) && dry_wet != 1.0 && rt.audio_ins > 0 {
            for (k, out) in outputs.iter_mut().enumerate() {
                let dry = inputs[k.min(rt.audio_ins - 1)];
                for (o, d) in out[..frames].iter_mut().zip(&dry[..frames]) {
                    *o = *o * dry_wet + *d * (1.0 - dry_wet);
                }
            }
        }

        if hints.contains(PluginHints::CAN_VOLUME) {
            let gain = self.volume() as f32;
            if rt.applied_gain != Some(gain) {
                rt.native_gain = rt.adapter.set_output_gain(gain);
                rt.applied_gain = Some(gain);
            }
            if !rt.native_gain && gain != 1.0 {
                for out in outputs.iter_mut() {
                    out[..frames].iter_mut().for_each(|s| *s *= gain);
                }
            }
        }

        let (left, right) = (self.balance_left(), self.balance_right());
        if hints.contains(PluginHints::CAN_BALANCE) && (left != -1.0 || right != 1.0) {
            let range_l = ((left + 1.0) / 2.0) as f32;
            let range_r = ((right + 1.0) / 2.0) as f32;
            let scratch = &mut rt.scratch[..frames];

            for pair in outputs.chunks_exact_mut(2) {
                let [out_l, out_r] = pair else {
                    continue;
                };
                scratch.copy_from_slice(&out_l[..frames]);
                for k in 0..frames {
                    let old_l = scratch[k];
                    let r = out_r[k];
                    out_l[k] = old_l * (1.0 - range_l) + r * (1.0 - range_r);
                    out_r[k] = r * range_r + old_l * range_l;
                }
            }
        }
    }

    /// Refreshes output parameters and reports bound ones on the control output.
    fn write_output_parameters(&self, rt: &mut RtState, ctx: &mut ProcessContext<'_>) {
        for parameter in self.registry.parameters().iter() {
            let info = parameter.info();
            if info.direction != ParameterDirection::Output {
                continue;
            }

            parameter.store_fixed(rt.adapter.output_parameter_value(info.index));

            let cc = parameter.midi_cc();
            let channel = parameter.midi_channel();
            if cc <= 0 || !(0..MAX_MIDI_CHANNELS as i32).contains(&channel) {
                continue;
            }
            if let Some(port) = ctx.control_out.as_deref_mut() {
                let _ = port.push(ControlEvent::control_change(
                    ctx.frames_offset,
                    channel as u8,
                    cc as u16,
                    info.ranges.normalize(parameter.value()),
                ));
            }
        }
    }
}
