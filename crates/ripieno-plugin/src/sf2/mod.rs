//! SoundFont (SF2) plugin family.

mod adapter;
pub mod engine;
pub mod params;
#[cfg(feature = "soundfont")]
mod synth;

pub use adapter::Sf2Adapter;
pub use engine::{
    ChorusSettings, ChorusWaveform, Interpolation, Preset, ReverbSettings, SoundFontEngine,
};
pub use params::{parameter_table, Sf2Param, CHORUS_TYPE_POINTS, INTERPOLATION_POINTS};
#[cfg(feature = "soundfont")]
pub use synth::{is_soundfont, load_sf2, RustySynthEngine, SoundFontCache};
