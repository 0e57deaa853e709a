//! Plugin adapter trait.
//!
//! One implementation per plugin technology. The adapter owns the native
//! handle; the surrounding [`Plugin`](crate::Plugin) owns the registry, the
//! controls and the process cycle, and calls into the adapter only while it
//! holds exclusive access (the process cycle or a disable guard).

use crate::registry::{MidiProgram, ParameterInfo, Port, PortType};
use ripieno_core::{EngineConfig, PluginHints};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginKind {
    Native,
    SoundFont,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PluginCategory {
    #[default]
    None,
    Synth,
    Utility,
}

/// Identity of a loaded plugin.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginInfo {
    pub kind: PluginKind,
    pub category: PluginCategory,
    pub label: String,
    pub real_name: String,
    pub maker: String,
    pub copyright: String,
    pub filename: Option<PathBuf>,
}

/// Everything an adapter declares on reload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PluginLayout {
    /// Port names without the plugin-name prefix.
    pub ports: Vec<Port>,
    pub parameters: Vec<ParameterInfo>,
    pub hints: PluginHints,
}

impl PluginLayout {
    pub fn port(mut self, name: &str, port_type: PortType, is_input: bool) -> Self {
        self.ports.push(Port {
            name: name.to_string(),
            port_type,
            is_input,
        });
        self
    }

    pub fn audio_count(&self, is_input: bool) -> usize {
        self.ports
            .iter()
            .filter(|p| p.port_type == PortType::Audio && p.is_input == is_input)
            .count()
    }
}

/// Uniform contract over a plugin technology.
///
/// Only `info`, `reload` and `render` are mandatory; the rest default to
/// no-ops for plugins without MIDI or programs.
pub trait PluginAdapter: Send {
    fn info(&self) -> &PluginInfo;

    /// Declares ports, parameters and capability hints from the plugin's own
    /// introspection. Called with exclusive access.
    fn reload(&mut self, config: &EngineConfig) -> PluginLayout;

    /// Enumerates the bank/patch database.
    fn programs(&mut self) -> Vec<MidiProgram> {
        Vec::new()
    }

    /// Returns every channel to the plugin's power-on program state.
    fn program_reset(&mut self) {}

    fn program_select(&mut self, _channel: u8, _bank: u32, _program: u32) {}

    /// Pushes a parameter value (adapter index) into the native engine.
    fn apply_parameter(&mut self, _index: u32, _value: f64) {}

    /// Reads an output parameter (adapter index) from the native engine.
    fn output_parameter_value(&mut self, _index: u32) -> f64 {
        0.0
    }

    fn note_on(&mut self, _channel: u8, _note: u8, _velocity: u8) {}

    fn note_off(&mut self, _channel: u8, _note: u8) {}

    fn channel_pressure(&mut self, _channel: u8, _pressure: u8) {}

    /// 14-bit value, 8192 is centered.
    fn pitch_bend(&mut self, _channel: u8, _bend: u16) {}

    /// Releases held notes on `channel`.
    fn all_notes_off(&mut self, _channel: u8) {}

    /// Cuts every sounding voice on `channel`, including released ones.
    fn all_sounds_off(&mut self, _channel: u8) {}

    /// Applies output gain inside the native engine. Returns `false` when the
    /// plugin cannot, in which case the host multiplies the output itself.
    fn set_output_gain(&mut self, _gain: f32) -> bool {
        false
    }

    /// Renders `frames` samples. Every slice holds at least `frames` samples.
    fn render(&mut self, inputs: &[&[f32]], outputs: &mut [&mut [f32]], frames: usize);
}
