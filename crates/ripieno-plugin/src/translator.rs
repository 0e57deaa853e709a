//! Conversion of a cycle's incoming events into plugin actions.
//!
//! Runs on the audio thread with the processing state held. Nothing here
//! allocates or blocks: notifications go to the post-event ring, external
//! notes are drained with a try-lock.

use crate::plugin::{Plugin, RtState};
use crate::post_event::PostEvent;
use crate::process::ProcessContext;
use ripieno_core::{ParameterTarget, PluginHints, MAX_MIDI_CHANNELS, PERCUSSION_CHANNEL};
use ripieno_midi::{reserved_control, ControlEvent, ControlEventKind, MidiInput, ReservedControl, MAX_MIDI_EVENTS};

/// Maps a normalized pan value to a (left, right) balance pair.
///
/// Below center the right edge follows the pan and the left edge stays hard
/// left; above center the left edge moves and the right edge stays hard right.
pub fn balance_from_pan(value: f64) -> (f64, f64) {
    let pan = value / 0.5 - 1.0;
    if pan < 0.0 {
        (-1.0, pan * 2.0 + 1.0)
    } else if pan > 0.0 {
        (pan * 2.0 - 1.0, 1.0)
    } else {
        (-1.0, 1.0)
    }
}

/// Maps a normalized channel-volume value to the volume control's range.
#[inline]
pub fn volume_from_cc(value: f64) -> f64 {
    value * 127.0 / 100.0
}

/// Bank number most recently selected per channel during one cycle.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BankShadow([u32; MAX_MIDI_CHANNELS]);

impl BankShadow {
    pub(crate) fn new() -> Self {
        let mut banks = [0; MAX_MIDI_CHANNELS];
        banks[PERCUSSION_CHANNEL as usize] = 128;
        Self(banks)
    }

    #[inline]
    pub(crate) fn get(&self, channel: u8) -> u32 {
        self.0[channel as usize]
    }

    #[inline]
    pub(crate) fn set(&mut self, channel: u8, bank: u32) {
        self.0[channel as usize] = bank;
    }
}

impl Plugin {
    /// Applies the cycle's control events that fall inside the render window.
    pub(crate) fn translate_control_events(&self, rt: &mut RtState, ctx: &ProcessContext<'_>) {
        let bound = self.ctrl_in_channel();
        let hints = self.hints();
        let frames = ctx.frames as u32;

        let mut banks = BankShadow::new();
        if let (Some(channel), Some(current)) = (bound, self.registry.current_program()) {
            if let Some((bank, _)) = self.registry.program_numbers(current) {
                banks.set(channel, bank);
            }
        }

        let mut notes_off_posted = false;

        for event in ctx.control_in {
            if event.local_time(ctx.frames_offset, frames).is_none() {
                continue;
            }
            if event.channel as usize >= MAX_MIDI_CHANNELS {
                continue;
            }
            let channel = event.channel;
            let on_bound = bound == Some(channel);

            match event.kind {
                ControlEventKind::Null => {}
                ControlEventKind::ControlChange => {
                    if on_bound && self.apply_reserved_control(rt, hints, event) {
                        continue;
                    }
                    self.apply_bound_parameters(rt, event);
                }
                ControlEventKind::MidiBankChange => banks.set(channel, event.number()),
                ControlEventKind::MidiProgramChange => {
                    let bank = banks.get(channel);
                    let program = event.number();
                    let Some(index) = self.registry.find_program(bank, program) else {
                        continue;
                    };
                    if on_bound {
                        if self.select_program_locked(rt, index) {
                            self.post(&mut rt.post, PostEvent::ProgramChange { index });
                        }
                    } else {
                        rt.adapter.program_select(channel, bank, program);
                    }
                }
                ControlEventKind::AllSoundOff | ControlEventKind::AllNotesOff => {
                    if on_bound && !notes_off_posted {
                        self.post(&mut rt.post, PostEvent::AllNotesOff { channel });
                        notes_off_posted = true;
                    }
                    rt.adapter.all_notes_off(channel);
                    if event.kind == ControlEventKind::AllSoundOff {
                        rt.adapter.all_sounds_off(channel);
                    }
                }
            }
        }
    }

    /// Drives a built-in control from a reserved controller. Returns `false`
    /// when the controller is not reserved or the plugin lacks the capability.
    fn apply_reserved_control(&self, rt: &mut RtState, hints: PluginHints, event: &ControlEvent) -> bool {
        match reserved_control(event.controller) {
            Some(ReservedControl::DryWet) if hints.contains(PluginHints::CAN_DRYWET) => {
                let value = self.store_control(ParameterTarget::DryWet, event.value);
                self.post(
                    &mut rt.post,
                    PostEvent::ParameterChange {
                        target: ParameterTarget::DryWet,
                        value,
                    },
                );
                true
            }
            Some(ReservedControl::Volume) if hints.contains(PluginHints::CAN_VOLUME) => {
                let value = self.store_control(ParameterTarget::Volume, volume_from_cc(event.value));
                self.post(
                    &mut rt.post,
                    PostEvent::ParameterChange {
                        target: ParameterTarget::Volume,
                        value,
                    },
                );
                true
            }
            Some(ReservedControl::Balance) if hints.contains(PluginHints::CAN_BALANCE) => {
                let (left, right) = balance_from_pan(event.value);
                let left = self.store_control(ParameterTarget::BalanceLeft, left);
                let right = self.store_control(ParameterTarget::BalanceRight, right);
                self.post(
                    &mut rt.post,
                    PostEvent::ParameterChange {
                        target: ParameterTarget::BalanceLeft,
                        value: left,
                    },
                );
                self.post(
                    &mut rt.post,
                    PostEvent::ParameterChange {
                        target: ParameterTarget::BalanceRight,
                        value: right,
                    },
                );
                true
            }
            _ => false,
        }
    }

    /// Sets every automatable input parameter bound to the event's channel
    /// and controller.
    fn apply_bound_parameters(&self, rt: &mut RtState, event: &ControlEvent) {
        let parameters = self.registry.parameters();

        for (k, parameter) in parameters.iter().enumerate() {
            let info = parameter.info();
            if !info.is_automable_input() || !parameter.is_bound_to(event.channel, event.controller) {
                continue;
            }

            let value = info.ranges.from_automation(info.hints, event.value);
            parameter.store_fixed(value);

            if info.structural {
                parameter.mark_dirty();
                self.structural_dirty.set(true);
            } else {
                rt.adapter.apply_parameter(info.index, value);
            }

            self.post(
                &mut rt.post,
                PostEvent::ParameterChange {
                    target: ParameterTarget::Index(k as u32),
                    value,
                },
            );
        }
    }

    /// Delivers queued external notes, then the driver's MIDI, to the adapter.
    ///
    /// External notes go to the bound channel. At most [`MAX_MIDI_EVENTS`]
    /// messages are delivered per cycle; messages the adapter does not consume
    /// do not count.
    pub(crate) fn process_midi_input(&self, rt: &mut RtState, ctx: &ProcessContext<'_>) {
        let bound = self.ctrl_in_channel();
        let frames = ctx.frames as u32;
        let mut delivered = 0usize;

        let RtState {
            adapter,
            notes,
            post,
            ..
        } = rt;

        // External notes wait in the queue until a channel is bound.
        notes.clear();
        if let Some(channel) = bound {
            if self.notes.try_drain_into(notes) {
                for note in notes.iter() {
                    if delivered >= MAX_MIDI_EVENTS {
                        break;
                    }
                    if note.velocity > 0 {
                        adapter.note_on(channel, note.note, note.velocity);
                    } else {
                        adapter.note_off(channel, note.note);
                    }
                    delivered += 1;
                }
            }
        }

        for event in ctx.midi_in {
            if delivered >= MAX_MIDI_EVENTS {
                break;
            }
            if event.local_time(ctx.frames_offset, frames).is_none() {
                continue;
            }
            let Some(input) = event.decode() else {
                continue;
            };

            match input {
                MidiInput::NoteOff { channel, note } => {
                    adapter.note_off(channel, note);
                    if bound == Some(channel) {
                        self.post(post, PostEvent::NoteOff { channel, note });
                    }
                }
                MidiInput::NoteOn {
                    channel,
                    note,
                    velocity,
                } => {
                    adapter.note_on(channel, note, velocity);
                    if bound == Some(channel) {
                        self.post(
                            post,
                            PostEvent::NoteOn {
                                channel,
                                note,
                                velocity,
                            },
                        );
                    }
                }
                MidiInput::ChannelPressure { channel, pressure } => {
                    adapter.channel_pressure(channel, pressure)
                }
                MidiInput::PitchBend { channel, bend } => adapter.pitch_bend(channel, bend),
            }
            delivered += 1;
        }
    }
}
