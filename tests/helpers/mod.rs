//! Test helpers and fixtures for ripieno integration tests
//!
//! The engine is driven by hand: tests own a [`RackProcessor`] and call it
//! cycle by cycle, so every result is deterministic and needs no audio device.
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `FLOAT_EPSILON` (1e-6): Exact operations (passthrough, unity gain)
//! - `SILENCE_THRESHOLD` (0.0001): Silence detection (-80dB)

#![allow(dead_code)]

pub mod tolerances;

use ripieno::plugin::{
    PluginCategory, PluginInfo, PluginKind, PluginLayout, PortType, ParameterInfo,
};
use ripieno::prelude::*;
use ripieno::{ParameterHints, ParameterRanges, PluginAdapter, PluginHints};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Default test sample rate
pub const TEST_SAMPLE_RATE: f64 = 48000.0;

/// Standard buffer size for deterministic testing
pub const TEST_BUFFER_SIZE: usize = 256;

/// Controller the `Tone` output parameter is reported on.
pub const TONE_LEVEL_CC: i32 = 20;

/// Routes `tracing` output through the test harness; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Create a basic test engine with minimal configuration.
pub fn test_engine() -> Engine {
    test_builder().build().expect("Failed to create test engine")
}

/// Builder preset with the test sample rate and buffer size.
pub fn test_builder() -> EngineBuilder {
    init_tracing();
    Engine::builder()
        .sample_rate(TEST_SAMPLE_RATE)
        .buffer_size(TEST_BUFFER_SIZE as u32)
}

/// Generate a DC offset signal (constant value).
pub fn generate_dc(value: f32, num_samples: usize) -> Vec<f32> {
    vec![value; num_samples]
}

/// Generate a normalized staircase signal in range [-1, 1].
pub fn generate_normalized_staircase(num_samples: usize) -> Vec<f32> {
    if num_samples <= 1 {
        return vec![0.0; num_samples];
    }
    let max = (num_samples - 1) as f32;
    (0..num_samples)
        .map(|i| (i as f32 / max) * 2.0 - 1.0)
        .collect()
}

/// Calculate peak amplitude of a signal.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0_f32, |a, b| a.max(b))
}

/// Check if two signals are approximately equal within tolerance.
pub fn signals_approx_equal(a: &[f32], b: &[f32], tolerance: f32) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= tolerance)
}

/// Assert that a signal is approximately silent (all values near zero).
pub fn assert_silence(samples: &[f32], tolerance: f32) {
    let max = peak(samples);
    assert!(
        max <= tolerance,
        "Expected silence, but peak amplitude was {}",
        max
    );
}

/// Assert every sample equals `value` within tolerance.
pub fn assert_constant(samples: &[f32], value: f32, tolerance: f32) {
    for (i, s) in samples.iter().enumerate() {
        assert!(
            (s - value).abs() <= tolerance,
            "sample {} was {}, expected {}",
            i,
            s,
            value
        );
    }
}

/// Runs one rack cycle on a stereo input and returns the stereo output.
pub fn run_cycle(
    rack: &mut RackProcessor,
    left: &[f32],
    right: &[f32],
    control_in: &[ControlEvent],
) -> (Vec<f32>, Vec<f32>) {
    let frames = left.len();
    let mut out_l = vec![0.0f32; frames];
    let mut out_r = vec![0.0f32; frames];
    rack.process(
        &[left, right],
        &mut [&mut out_l[..], &mut out_r[..]],
        frames,
        control_in,
        &[],
    );
    (out_l, out_r)
}

fn test_info(label: &str, category: PluginCategory) -> PluginInfo {
    PluginInfo {
        kind: PluginKind::Native,
        category,
        label: label.into(),
        real_name: label.into(),
        maker: "ripieno".into(),
        copyright: "MIT".into(),
        filename: None,
    }
}

// =============================================================================
// Test adapters
// =============================================================================

/// Generator without audio inputs: writes `level` on both outputs and reports
/// it as an output parameter bound to [`TONE_LEVEL_CC`].
pub struct Tone {
    info: PluginInfo,
    level: f32,
    notes: Arc<AtomicUsize>,
}

impl Tone {
    pub fn new(level: f32) -> Self {
        Self::with_note_counter(level, Arc::new(AtomicUsize::new(0)))
    }

    /// Counts every note-on the adapter receives.
    pub fn with_note_counter(level: f32, notes: Arc<AtomicUsize>) -> Self {
        Self {
            info: test_info("tone", PluginCategory::Synth),
            level,
            notes,
        }
    }
}

impl PluginAdapter for Tone {
    fn info(&self) -> &PluginInfo {
        &self.info
    }

    fn reload(&mut self, _config: &EngineConfig) -> PluginLayout {
        PluginLayout {
            parameters: vec![ParameterInfo::new(0, "Level", ParameterRanges::new(0.0, 0.0, 1.0))
                .hints(ParameterHints::ENABLED | ParameterHints::AUTOMABLE)
                .midi_cc(TONE_LEVEL_CC)
                .output()],
            hints: PluginHints::IS_SYNTH | PluginHints::CAN_VOLUME | PluginHints::CAN_BALANCE,
            ..Default::default()
        }
        .port("out-left", PortType::Audio, false)
        .port("out-right", PortType::Audio, false)
        .port("midi-in", PortType::Midi, true)
    }

    fn output_parameter_value(&mut self, _index: u32) -> f64 {
        self.level as f64
    }

    fn note_on(&mut self, _channel: u8, _note: u8, _velocity: u8) {
        self.notes.fetch_add(1, Ordering::Relaxed);
    }

    fn render(&mut self, _inputs: &[&[f32]], outputs: &mut [&mut [f32]], frames: usize) {
        for out in outputs.iter_mut() {
            out[..frames].fill(self.level);
        }
    }
}

/// Stereo effect multiplying its input by a fixed factor.
pub struct Gain {
    info: PluginInfo,
    factor: f32,
    inputs: usize,
}

impl Gain {
    pub fn new(factor: f32) -> Self {
        Self::with_inputs(factor, 2)
    }

    /// A gain with more inputs than the rack bus can feed.
    pub fn with_inputs(factor: f32, inputs: usize) -> Self {
        Self {
            info: test_info("gain", PluginCategory::Utility),
            factor,
            inputs,
        }
    }
}

impl PluginAdapter for Gain {
    fn info(&self) -> &PluginInfo {
        &self.info
    }

    fn reload(&mut self, _config: &EngineConfig) -> PluginLayout {
        let mut layout = PluginLayout {
            hints: PluginHints::CAN_DRYWET | PluginHints::CAN_VOLUME | PluginHints::CAN_BALANCE,
            ..Default::default()
        };
        for k in 0..self.inputs {
            layout = layout.port(&format!("in-{}", k + 1), PortType::Audio, true);
        }
        layout
            .port("out-left", PortType::Audio, false)
            .port("out-right", PortType::Audio, false)
    }

    fn render(&mut self, inputs: &[&[f32]], outputs: &mut [&mut [f32]], frames: usize) {
        for (out, input) in outputs.iter_mut().zip(inputs.iter()) {
            for (o, i) in out[..frames].iter_mut().zip(&input[..frames]) {
                *o = *i * self.factor;
            }
        }
    }
}
