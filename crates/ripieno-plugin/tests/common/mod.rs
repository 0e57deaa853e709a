//! Fixtures for plugin-layer tests.
//!
//! `TestSynth` is a scripted adapter: it renders `LEVEL` on the left output and
//! `2 * LEVEL` on the right, and records every call it receives so tests can
//! inspect what the cycle delivered.

#![allow(dead_code)]

use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use ripieno_core::{
    CallbackEvent, ChannelCallback, EngineConfig, ParameterHints, ParameterRanges, PluginHints,
};
use ripieno_plugin::{
    HostContext, MidiProgram, NullRemote, ParameterInfo, Plugin, PluginAdapter, PluginCategory,
    PluginInfo, PluginKind, PluginLayout, PortType, ProcessContext, ProcessStatus,
};
use std::sync::Arc;

pub const FRAMES: usize = 512;
pub const LEVEL: f32 = 0.5;

pub const CUTOFF: usize = 0;
pub const MODE: usize = 1;
pub const STEPS: usize = 2;
pub const VOICES: usize = 3;
pub const QUALITY: usize = 4;

pub const CUTOFF_CC: i32 = 74;
pub const VOICES_CC: i32 = 20;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Reload,
    ProgramReset,
    ProgramSelect(u8, u32, u32),
    Apply(u32, f64),
    NoteOn(u8, u8, u8),
    NoteOff(u8, u8),
    Pressure(u8, u8),
    Bend(u8, u16),
    AllNotesOff(u8),
    AllSoundsOff(u8),
    Render(usize),
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

pub struct TestSynth {
    info: PluginInfo,
    log: CallLog,
    pub hints: PluginHints,
    pub voices: f64,
}

impl TestSynth {
    pub fn new(log: CallLog) -> Self {
        Self {
            info: PluginInfo {
                kind: PluginKind::Native,
                category: PluginCategory::Synth,
                label: "testsynth".into(),
                real_name: "Test Synth".into(),
                maker: "ripieno".into(),
                copyright: "MIT".into(),
                filename: None,
            },
            log,
            hints: PluginHints::IS_SYNTH
                | PluginHints::CAN_DRYWET
                | PluginHints::CAN_VOLUME
                | PluginHints::CAN_BALANCE,
            voices: 3.0,
        }
    }

    fn record(&self, call: Call) {
        self.log.lock().push(call);
    }
}

impl PluginAdapter for TestSynth {
    fn info(&self) -> &PluginInfo {
        &self.info
    }

    fn reload(&mut self, _config: &EngineConfig) -> PluginLayout {
        self.record(Call::Reload);
        let automable = ParameterHints::ENABLED | ParameterHints::AUTOMABLE;
        PluginLayout {
            parameters: vec![
                ParameterInfo::new(0, "Cutoff", ParameterRanges::new(0.0, 0.0, 10.0))
                    .hints(automable)
                    .midi_cc(CUTOFF_CC),
                ParameterInfo::new(1, "Mode", ParameterRanges::new(0.0, 0.0, 1.0))
                    .hints(automable | ParameterHints::BOOLEAN),
                ParameterInfo::new(2, "Steps", ParameterRanges::new(0.0, 0.0, 8.0))
                    .hints(automable | ParameterHints::INTEGER),
                ParameterInfo::new(3, "Voices", ParameterRanges::new(0.0, 0.0, 16.0))
                    .hints(automable | ParameterHints::INTEGER)
                    .midi_cc(VOICES_CC)
                    .output(),
                ParameterInfo::new(4, "Quality", ParameterRanges::new(2.0, 1.0, 4.0))
                    .hints(automable | ParameterHints::INTEGER)
                    .structural(),
            ],
            hints: self.hints,
            ..Default::default()
        }
        .port("out-left", PortType::Audio, false)
        .port("out-right", PortType::Audio, false)
        .port("midi-in", PortType::Midi, true)
    }

    fn programs(&mut self) -> Vec<MidiProgram> {
        vec![
            MidiProgram::new(0, 0, "A"),
            MidiProgram::new(0, 1, "B"),
            MidiProgram::new(1, 0, "C"),
        ]
    }

    fn program_reset(&mut self) {
        self.record(Call::ProgramReset);
    }

    fn program_select(&mut self, channel: u8, bank: u32, program: u32) {
        self.record(Call::ProgramSelect(channel, bank, program));
    }

    fn apply_parameter(&mut self, index: u32, value: f64) {
        self.record(Call::Apply(index, value));
    }

    fn output_parameter_value(&mut self, _index: u32) -> f64 {
        self.voices
    }

    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        self.record(Call::NoteOn(channel, note, velocity));
    }

    fn note_off(&mut self, channel: u8, note: u8) {
        self.record(Call::NoteOff(channel, note));
    }

    fn channel_pressure(&mut self, channel: u8, pressure: u8) {
        self.record(Call::Pressure(channel, pressure));
    }

    fn pitch_bend(&mut self, channel: u8, bend: u16) {
        self.record(Call::Bend(channel, bend));
    }

    fn all_notes_off(&mut self, channel: u8) {
        self.record(Call::AllNotesOff(channel));
    }

    fn all_sounds_off(&mut self, channel: u8) {
        self.record(Call::AllSoundsOff(channel));
    }

    fn render(&mut self, _inputs: &[&[f32]], outputs: &mut [&mut [f32]], frames: usize) {
        self.record(Call::Render(frames));
        for (k, out) in outputs.iter_mut().enumerate() {
            out[..frames].fill(LEVEL * (k + 1) as f32);
        }
    }
}

pub struct Fixture {
    pub plugin: Plugin,
    pub log: CallLog,
    pub events: Receiver<CallbackEvent>,
}

pub fn config() -> EngineConfig {
    EngineConfig {
        buffer_size: FRAMES as u32,
        ..Default::default()
    }
}

/// Routes `tracing` output through the test harness; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn fixture_with(config: EngineConfig) -> Fixture {
    init_tracing();
    let log = CallLog::default();
    let (callback, events) = ChannelCallback::new();
    let host = Arc::new(HostContext::new(config, Arc::new(callback), Arc::new(NullRemote)));
    let plugin = Plugin::new(0, "Test Synth", host, Box::new(TestSynth::new(log.clone())));
    Fixture {
        plugin,
        log,
        events,
    }
}

/// An active plugin that already went through its activation cycle, with
/// construction callbacks and calls cleared.
pub fn active_fixture() -> Fixture {
    let fx = fixture_with(config());
    fx.plugin.set_active(true, ripieno_plugin::Notify::NONE);
    fx.run(ProcessContext::new(FRAMES));
    fx.clear();
    fx
}

impl Fixture {
    /// Runs one cycle on fresh stereo buffers.
    pub fn run(&self, ctx: ProcessContext<'_>) -> (ProcessStatus, Vec<f32>, Vec<f32>) {
        let frames = ctx.frames;
        let mut left = vec![1.0f32; frames];
        let mut right = vec![1.0f32; frames];
        let status = self
            .plugin
            .process(&[], &mut [&mut left[..], &mut right[..]], ctx);
        (status, left, right)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().clone()
    }

    pub fn clear(&self) {
        self.log.lock().clear();
        self.plugin.run_post_events();
        while self.events.try_recv().is_ok() {}
    }

    pub fn drain_events(&self) -> Vec<CallbackEvent> {
        self.plugin.run_post_events();
        self.events.try_iter().collect()
    }
}
