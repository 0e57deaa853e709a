//! Native surface of a SoundFont synthesizer.

/// A preset as enumerated from the SoundFont.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub bank: u32,
    pub program: u32,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbSettings {
    pub room_size: f64,
    pub damping: f64,
    pub width: f64,
    pub level: f64,
}

impl Default for ReverbSettings {
    fn default() -> Self {
        Self {
            room_size: 0.2,
            damping: 0.0,
            width: 0.5,
            level: 0.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChorusWaveform {
    #[default]
    Sine,
    Triangle,
}

impl ChorusWaveform {
    pub fn from_value(value: f64) -> Self {
        if value >= 0.5 {
            ChorusWaveform::Triangle
        } else {
            ChorusWaveform::Sine
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChorusSettings {
    pub voices: u32,
    pub level: f64,
    pub speed_hz: f64,
    pub depth_ms: f64,
    pub waveform: ChorusWaveform,
}

impl Default for ChorusSettings {
    fn default() -> Self {
        Self {
            voices: 3,
            level: 2.0,
            speed_hz: 0.3,
            depth_ms: 8.0,
            waveform: ChorusWaveform::Sine,
        }
    }
}

/// Sample interpolation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    None,
    Linear,
    #[default]
    FourthOrder,
    SeventhOrder,
}

impl Interpolation {
    /// Nearest supported method at or below `value`.
    pub fn from_value(value: f64) -> Self {
        if value >= 7.0 {
            Interpolation::SeventhOrder
        } else if value >= 4.0 {
            Interpolation::FourthOrder
        } else if value >= 1.0 {
            Interpolation::Linear
        } else {
            Interpolation::None
        }
    }

    pub fn order(self) -> u32 {
        match self {
            Interpolation::None => 0,
            Interpolation::Linear => 1,
            Interpolation::FourthOrder => 4,
            Interpolation::SeventhOrder => 7,
        }
    }
}

/// What the SF2 adapter needs from a synthesizer.
///
/// Methods are only called with exclusive access to the plugin: from the
/// process cycle or under a disable guard. `set_chorus_on`, `set_chorus`,
/// `set_polyphony` and `set_interpolation` may reallocate and are never called
/// from the audio thread.
pub trait SoundFontEngine: Send {
    fn presets(&self) -> Vec<Preset>;

    fn program_reset(&mut self);
    fn program_select(&mut self, channel: u8, bank: u32, program: u32);

    fn note_on(&mut self, channel: u8, key: u8, velocity: u8);
    fn note_off(&mut self, channel: u8, key: u8);
    fn channel_pressure(&mut self, channel: u8, pressure: u8);
    fn pitch_bend(&mut self, channel: u8, bend: u16);
    fn all_notes_off(&mut self, channel: u8);
    fn all_sounds_off(&mut self, channel: u8);

    fn set_reverb_on(&mut self, on: bool);
    fn set_reverb(&mut self, settings: ReverbSettings);
    fn set_chorus_on(&mut self, on: bool);
    fn set_chorus(&mut self, settings: ChorusSettings);
    fn set_polyphony(&mut self, voices: u32);
    fn set_interpolation(&mut self, method: Interpolation);
    fn set_gain(&mut self, gain: f32);

    fn active_voice_count(&self) -> u32;

    /// Renders `left.len()` frames; both slices have the same length.
    fn render(&mut self, left: &mut [f32], right: &mut [f32]);
}
