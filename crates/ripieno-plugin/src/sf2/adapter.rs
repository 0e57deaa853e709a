//! Plugin adapter over a [`SoundFontEngine`].

use super::engine::{ChorusSettings, ChorusWaveform, Interpolation, ReverbSettings, SoundFontEngine};
use super::params::{parameter_table, Sf2Param};
use crate::adapter::{PluginAdapter, PluginCategory, PluginInfo, PluginKind, PluginLayout};
use crate::registry::{MidiProgram, PortType};
use ripieno_core::{EngineConfig, PluginHints};
use std::path::Path;

pub struct Sf2Adapter<E> {
    engine: E,
    info: PluginInfo,
    reverb: ReverbSettings,
    chorus: ChorusSettings,
}

impl<E: SoundFontEngine> Sf2Adapter<E> {
    pub fn new(engine: E, path: &Path, label: &str) -> Self {
        Self {
            engine,
            info: PluginInfo {
                kind: PluginKind::SoundFont,
                category: PluginCategory::Synth,
                label: label.to_string(),
                real_name: label.to_string(),
                maker: "RustySynth SF2 engine".to_string(),
                copyright: "MIT".to_string(),
                filename: Some(path.to_path_buf()),
            },
            reverb: ReverbSettings::default(),
            chorus: ChorusSettings::default(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl<E: SoundFontEngine> PluginAdapter for Sf2Adapter<E> {
    fn info(&self) -> &PluginInfo {
        &self.info
    }

    fn reload(&mut self, config: &EngineConfig) -> PluginLayout {
        PluginLayout {
            parameters: parameter_table(config.sample_rate),
            hints: PluginHints::IS_SYNTH | PluginHints::CAN_VOLUME | PluginHints::CAN_BALANCE,
            ..Default::default()
        }
        .port("out-left", PortType::Audio, false)
        .port("out-right", PortType::Audio, false)
        .port("midi-in", PortType::Midi, true)
        .port("control-in", PortType::Control, true)
        .port("control-out", PortType::Control, false)
    }

    fn programs(&mut self) -> Vec<MidiProgram> {
        let mut presets = self.engine.presets();
        presets.sort_by_key(|p| (p.bank, p.program));
        presets
            .into_iter()
            .map(|p| MidiProgram::new(p.bank, p.program, p.name))
            .collect()
    }

    fn program_reset(&mut self) {
        self.engine.program_reset();
    }

    fn program_select(&mut self, channel: u8, bank: u32, program: u32) {
        self.engine.program_select(channel, bank, program);
    }

    fn apply_parameter(&mut self, index: u32, value: f64) {
        let Some(param) = Sf2Param::from_index(index) else {
            return;
        };

        match param {
            Sf2Param::ReverbOn => self.engine.set_reverb_on(value >= 0.5),
            Sf2Param::ReverbRoomSize => {
                self.reverb.room_size = value;
                self.engine.set_reverb(self.reverb);
            }
            Sf2Param::ReverbDamp => {
                self.reverb.damping = value;
                self.engine.set_reverb(self.reverb);
            }
            Sf2Param::ReverbLevel => {
                self.reverb.level = value;
                self.engine.set_reverb(self.reverb);
            }
            Sf2Param::ReverbWidth => {
                self.reverb.width = value;
                self.engine.set_reverb(self.reverb);
            }
            Sf2Param::ChorusOn => self.engine.set_chorus_on(value >= 0.5),
            Sf2Param::ChorusVoices => {
                self.chorus.voices = value.max(0.0) as u32;
                self.engine.set_chorus(self.chorus);
            }
            Sf2Param::ChorusLevel => {
                self.chorus.level = value;
                self.engine.set_chorus(self.chorus);
            }
            Sf2Param::ChorusSpeed => {
                self.chorus.speed_hz = value;
                self.engine.set_chorus(self.chorus);
            }
            Sf2Param::ChorusDepth => {
                self.chorus.depth_ms = value;
                self.engine.set_chorus(self.chorus);
            }
            Sf2Param::ChorusType => {
                self.chorus.waveform = ChorusWaveform::from_value(value);
                self.engine.set_chorus(self.chorus);
            }
            Sf2Param::Polyphony => self.engine.set_polyphony(value.max(1.0) as u32),
            Sf2Param::Interpolation => self
                .engine
                .set_interpolation(Interpolation::from_value(value)),
            Sf2Param::VoiceCount => {}
        }
    }

    fn output_parameter_value(&mut self, index: u32) -> f64 {
        match Sf2Param::from_index(index) {
            Some(Sf2Param::VoiceCount) => f64::from(self.engine.active_voice_count()),
            _ => 0.0,
        }
    }

    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        self.engine.note_on(channel, note, velocity);
    }

    fn note_off(&mut self, channel: u8, note: u8) {
        self.engine.note_off(channel, note);
    }

    fn channel_pressure(&mut self, channel: u8, pressure: u8) {
        self.engine.channel_pressure(channel, pressure);
    }

    fn pitch_bend(&mut self, channel: u8, bend: u16) {
        self.engine.pitch_bend(channel, bend);
    }

    fn all_notes_off(&mut self, channel: u8) {
        self.engine.all_notes_off(channel);
    }

    fn all_sounds_off(&mut self, channel: u8) {
        self.engine.all_sounds_off(channel);
    }

    fn set_output_gain(&mut self, gain: f32) -> bool {
        self.engine.set_gain(gain);
        true
    }

    fn render(&mut self, _inputs: &[&[f32]], outputs: &mut [&mut [f32]], frames: usize) {
        if let [left, right, ..] = outputs {
            self.engine.render(&mut left[..frames], &mut right[..frames]);
        }
    }
}
