//! [`SoundFontEngine`] backed by RustySynth.
//!
//! RustySynth has no separate effect units to configure, so reverb and chorus
//! levels are driven through the per-channel effect sends (CC 91/93), and the
//! shape settings are kept for reporting only. Polyphony rebuilds the
//! synthesizer and replays each channel's bank and program.

use super::adapter::Sf2Adapter;
use super::engine::{ChorusSettings, Interpolation, Preset, ReverbSettings, SoundFontEngine};
use crate::{LoadStage, PluginError, Result};
use dashmap::DashMap;
use ripieno_core::{EngineConfig, MAX_MIDI_CHANNELS, PERCUSSION_CHANNEL};
use rustysynth::{SoundFont, Synthesizer, SynthesizerSettings};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

const CONTROL_CHANGE: i32 = 0xB0;
const PROGRAM_CHANGE: i32 = 0xC0;
const CHANNEL_PRESSURE: i32 = 0xD0;
const PITCH_BEND: i32 = 0xE0;
const CC_BANK_SELECT: i32 = 0x00;
const CC_REVERB_SEND: i32 = 0x5B;
const CC_CHORUS_SEND: i32 = 0x5D;

/// Whether `path` starts with a RIFF `sfbk` header.
pub fn is_soundfont(path: &Path) -> bool {
    let mut header = [0u8; 12];
    File::open(path)
        .and_then(|mut file| file.read_exact(&mut header))
        .map(|()| &header[0..4] == b"RIFF" && &header[8..12] == b"sfbk")
        .unwrap_or(false)
}

/// Parsed SoundFonts shared between plugin instances loading the same file.
#[derive(Default)]
pub struct SoundFontCache {
    fonts: DashMap<PathBuf, Arc<SoundFont>>,
}

impl SoundFontCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached SoundFont or parses it from disk.
    pub fn load(&self, path: &Path) -> Result<Arc<SoundFont>> {
        if let Some(font) = self.fonts.get(path) {
            return Ok(Arc::clone(font.value()));
        }

        let file = File::open(path).map_err(|e| PluginError::LoadFailed {
            path: path.to_path_buf(),
            stage: LoadStage::Opening,
            reason: e.to_string(),
        })?;
        let mut reader = BufReader::new(file);
        let font = SoundFont::new(&mut reader).map_err(|e| PluginError::SoundFontLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let font = Arc::new(font);

        self.fonts.insert(path.to_path_buf(), Arc::clone(&font));
        debug!(path = %path.display(), "soundfont parsed");
        Ok(font)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Drops every cached SoundFont. Running instances keep their own reference.
    pub fn clear(&self) {
        self.fonts.clear();
    }
}

/// Validates, parses and wraps an `.sf2` file as an adapter.
pub fn load_sf2(
    path: &Path,
    label: &str,
    config: &EngineConfig,
    cache: &SoundFontCache,
) -> Result<Sf2Adapter<RustySynthEngine>> {
    if !is_soundfont(path) {
        return Err(PluginError::InvalidSoundFont(path.to_path_buf()));
    }

    let font = cache.load(path)?;
    let engine =
        RustySynthEngine::new(font, config.sample_rate).map_err(|reason| PluginError::LoadFailed {
            path: path.to_path_buf(),
            stage: LoadStage::Instantiation,
            reason,
        })?;

    Ok(Sf2Adapter::new(engine, path, label))
}

pub struct RustySynthEngine {
    font: Arc<SoundFont>,
    synth: Synthesizer,
    sample_rate: f64,
    polyphony: u32,
    programs: [(u32, u32); MAX_MIDI_CHANNELS],
    /// One bit per held key, per channel.
    held: [u128; MAX_MIDI_CHANNELS],
    reverb_on: bool,
    reverb: ReverbSettings,
    chorus_on: bool,
    chorus: ChorusSettings,
    interpolation: Interpolation,
    gain: f32,
}

impl RustySynthEngine {
    pub fn new(font: Arc<SoundFont>, sample_rate: f64) -> std::result::Result<Self, String> {
        let polyphony = 64;
        let synth = Self::build(&font, sample_rate, polyphony)?;

        let mut programs = [(0, 0); MAX_MIDI_CHANNELS];
        programs[PERCUSSION_CHANNEL as usize] = (128, 0);

        let mut engine = Self {
            font,
            synth,
            sample_rate,
            polyphony,
            programs,
            held: [0; MAX_MIDI_CHANNELS],
            reverb_on: false,
            reverb: ReverbSettings::default(),
            chorus_on: false,
            chorus: ChorusSettings::default(),
            interpolation: Interpolation::default(),
            gain: 1.0,
        };
        engine.send_effect_levels();
        Ok(engine)
    }

    fn build(
        font: &Arc<SoundFont>,
        sample_rate: f64,
        polyphony: u32,
    ) -> std::result::Result<Synthesizer, String> {
        let mut settings = SynthesizerSettings::new(sample_rate.round() as i32);
        settings.maximum_polyphony = polyphony as usize;
        settings.enable_reverb_and_chorus = true;
        Synthesizer::new(font, &settings).map_err(|e| e.to_string())
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn reverb(&self) -> (bool, ReverbSettings) {
        (self.reverb_on, self.reverb)
    }

    pub fn chorus(&self) -> (bool, ChorusSettings) {
        (self.chorus_on, self.chorus)
    }

    fn send_effect_levels(&mut self) {
        let reverb = if self.reverb_on {
            (self.reverb.level.clamp(0.0, 1.0) * 127.0).round() as i32
        } else {
            0
        };
        let chorus = if self.chorus_on {
            (self.chorus.level.clamp(0.0, 10.0) / 10.0 * 127.0).round() as i32
        } else {
            0
        };
        for channel in 0..MAX_MIDI_CHANNELS as i32 {
            self.synth
                .process_midi_message(channel, CONTROL_CHANGE, CC_REVERB_SEND, reverb);
            self.synth
                .process_midi_message(channel, CONTROL_CHANGE, CC_CHORUS_SEND, chorus);
        }
    }

    fn send_program(&mut self, channel: u8, bank: u32, program: u32) {
        // The percussion channel adds 128 to the selected bank itself.
        let bank = if channel == PERCUSSION_CHANNEL {
            bank.saturating_sub(128)
        } else {
            bank
        };
        let channel = i32::from(channel);
        self.synth
            .process_midi_message(channel, CONTROL_CHANGE, CC_BANK_SELECT, bank as i32);
        self.synth
            .process_midi_message(channel, PROGRAM_CHANGE, program as i32, 0);
    }
}

impl SoundFontEngine for RustySynthEngine {
    fn presets(&self) -> Vec<Preset> {
        self.font
            .get_presets()
            .iter()
            .map(|p| Preset {
                bank: p.get_bank_number().max(0) as u32,
                program: p.get_patch_number().max(0) as u32,
                name: p.get_name().to_string(),
            })
            .collect()
    }

    fn program_reset(&mut self) {
        self.synth.reset();
        self.held = [0; MAX_MIDI_CHANNELS];
        self.programs = [(0, 0); MAX_MIDI_CHANNELS];
        self.programs[PERCUSSION_CHANNEL as usize] = (128, 0);
        self.send_effect_levels();
        self.synth.set_master_volume(self.gain);
    }

    fn program_select(&mut self, channel: u8, bank: u32, program: u32) {
        if let Some(slot) = self.programs.get_mut(channel as usize) {
            *slot = (bank, program);
            self.send_program(channel, bank, program);
        }
    }

    fn note_on(&mut self, channel: u8, key: u8, velocity: u8) {
        if let Some(held) = self.held.get_mut(channel as usize) {
            *held |= 1u128 << (key & 0x7F);
            self.synth
                .note_on(i32::from(channel), i32::from(key), i32::from(velocity));
        }
    }

    fn note_off(&mut self, channel: u8, key: u8) {
        if let Some(held) = self.held.get_mut(channel as usize) {
            *held &= !(1u128 << (key & 0x7F));
            self.synth.note_off(i32::from(channel), i32::from(key));
        }
    }

    fn channel_pressure(&mut self, channel: u8, pressure: u8) {
        self.synth
            .process_midi_message(i32::from(channel), CHANNEL_PRESSURE, i32::from(pressure), 0);
    }

    fn pitch_bend(&mut self, channel: u8, bend: u16) {
        let lsb = i32::from(bend & 0x7F);
        let msb = i32::from((bend >> 7) & 0x7F);
        self.synth
            .process_midi_message(i32::from(channel), PITCH_BEND, lsb, msb);
    }

    fn all_notes_off(&mut self, channel: u8) {
        if let Some(held) = self.held.get_mut(channel as usize) {
            *held = 0;
            self.synth.note_off_all_channel(i32::from(channel), false);
        }
    }

    fn all_sounds_off(&mut self, channel: u8) {
        if let Some(held) = self.held.get_mut(channel as usize) {
            *held = 0;
            self.synth.note_off_all_channel(i32::from(channel), true);
        }
    }

    fn set_reverb_on(&mut self, on: bool) {
        self.reverb_on = on;
        self.send_effect_levels();
    }

    fn set_reverb(&mut self, settings: ReverbSettings) {
        self.reverb = settings;
        self.send_effect_levels();
    }

    fn set_chorus_on(&mut self, on: bool) {
        self.chorus_on = on;
        self.send_effect_levels();
    }

    fn set_chorus(&mut self, settings: ChorusSettings) {
        self.chorus = settings;
        self.send_effect_levels();
    }

    fn set_polyphony(&mut self, voices: u32) {
        let voices = voices.clamp(1, 512);
        if voices == self.polyphony {
            return;
        }

        match Self::build(&self.font, self.sample_rate, voices) {
            Ok(synth) => {
                self.synth = synth;
                self.polyphony = voices;
                self.held = [0; MAX_MIDI_CHANNELS];
                for channel in 0..MAX_MIDI_CHANNELS as u8 {
                    let (bank, program) = self.programs[channel as usize];
                    self.send_program(channel, bank, program);
                }
                self.send_effect_levels();
                self.synth.set_master_volume(self.gain);
                debug!(voices, "synthesizer rebuilt");
            }
            Err(reason) => warn!(voices, %reason, "polyphony change rejected"),
        }
    }

    fn set_interpolation(&mut self, method: Interpolation) {
        self.interpolation = method;
    }

    fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
        self.synth.set_master_volume(gain);
    }

    fn active_voice_count(&self) -> u32 {
        self.held.iter().map(|h| h.count_ones()).sum()
    }

    fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.synth.render(left, right);
    }
}
