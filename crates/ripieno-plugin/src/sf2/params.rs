//! The SF2 parameter table.

use crate::registry::ParameterInfo;
use ripieno_core::{ParameterHints, ParameterRanges, ScalePoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Sf2Param {
    ReverbOn,
    ReverbRoomSize,
    ReverbDamp,
    ReverbLevel,
    ReverbWidth,
    ChorusOn,
    ChorusVoices,
    ChorusLevel,
    ChorusSpeed,
    ChorusDepth,
    ChorusType,
    Polyphony,
    Interpolation,
    VoiceCount,
}

impl Sf2Param {
    pub const ALL: [Sf2Param; 14] = [
        Sf2Param::ReverbOn,
        Sf2Param::ReverbRoomSize,
        Sf2Param::ReverbDamp,
        Sf2Param::ReverbLevel,
        Sf2Param::ReverbWidth,
        Sf2Param::ChorusOn,
        Sf2Param::ChorusVoices,
        Sf2Param::ChorusLevel,
        Sf2Param::ChorusSpeed,
        Sf2Param::ChorusDepth,
        Sf2Param::ChorusType,
        Sf2Param::Polyphony,
        Sf2Param::Interpolation,
        Sf2Param::VoiceCount,
    ];

    #[inline]
    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    #[inline]
    pub fn index(self) -> u32 {
        self as u32
    }
}

pub const CHORUS_TYPE_POINTS: [ScalePoint; 2] = [
    ScalePoint::new("Sine wave", 0.0),
    ScalePoint::new("Triangle wave", 1.0),
];

pub const INTERPOLATION_POINTS: [ScalePoint; 4] = [
    ScalePoint::new("None", 0.0),
    ScalePoint::new("Straight-line", 1.0),
    ScalePoint::new("Fourth-order", 4.0),
    ScalePoint::new("Seventh-order", 7.0),
];

/// Controller the reverb level listens to by default.
pub const REVERB_LEVEL_CC: i32 = 0x5B;

/// Builds the parameter table. Chorus depth scales with the sample rate.
pub fn parameter_table(sample_rate: f64) -> Vec<ParameterInfo> {
    use Sf2Param as P;

    let automable = ParameterHints::ENABLED | ParameterHints::AUTOMABLE;
    let integer = ParameterHints::ENABLED | ParameterHints::INTEGER;
    let toggle = ParameterRanges::new(0.0, 0.0, 1.0).with_steps(1.0, 1.0, 1.0);
    let depth_max = 2_048_000.0 / sample_rate.max(1.0);

    vec![
        ParameterInfo::new(P::ReverbOn.index(), "Reverb On/Off", toggle)
            .hints(automable | ParameterHints::BOOLEAN),
        ParameterInfo::new(
            P::ReverbRoomSize.index(),
            "Reverb Room Size",
            ParameterRanges::new(0.2, 0.0, 1.2),
        )
        .hints(automable),
        ParameterInfo::new(P::ReverbDamp.index(), "Reverb Damp", ParameterRanges::new(0.0, 0.0, 1.0))
            .hints(automable),
        ParameterInfo::new(P::ReverbLevel.index(), "Reverb Level", ParameterRanges::new(0.9, 0.0, 1.0))
            .hints(automable)
            .midi_cc(REVERB_LEVEL_CC),
        ParameterInfo::new(P::ReverbWidth.index(), "Reverb Width", ParameterRanges::new(0.5, 0.0, 10.0))
            .hints(automable),
        ParameterInfo::new(P::ChorusOn.index(), "Chorus On/Off", toggle)
            .hints(ParameterHints::ENABLED | ParameterHints::BOOLEAN)
            .structural(),
        ParameterInfo::new(
            P::ChorusVoices.index(),
            "Chorus Voice Count",
            ParameterRanges::new(3.0, 0.0, 99.0).with_steps(1.0, 1.0, 10.0),
        )
        .hints(integer)
        .structural(),
        ParameterInfo::new(P::ChorusLevel.index(), "Chorus Level", ParameterRanges::new(2.0, 0.0, 10.0))
            .structural(),
        ParameterInfo::new(P::ChorusSpeed.index(), "Chorus Speed", ParameterRanges::new(0.3, 0.29, 5.0))
            .unit("Hz")
            .structural(),
        ParameterInfo::new(
            P::ChorusDepth.index(),
            "Chorus Depth",
            ParameterRanges::new(8.0, 0.0, depth_max),
        )
        .unit("ms")
        .structural(),
        ParameterInfo::new(
            P::ChorusType.index(),
            "Chorus Type",
            ParameterRanges::new(0.0, 0.0, 1.0).with_steps(1.0, 1.0, 1.0),
        )
        .hints(integer)
        .scale_points(&CHORUS_TYPE_POINTS)
        .structural(),
        ParameterInfo::new(
            P::Polyphony.index(),
            "Polyphony",
            ParameterRanges::new(64.0, 1.0, 512.0).with_steps(1.0, 1.0, 10.0),
        )
        .hints(integer)
        .structural(),
        ParameterInfo::new(
            P::Interpolation.index(),
            "Interpolation",
            ParameterRanges::new(4.0, 0.0, 7.0).with_steps(1.0, 1.0, 1.0),
        )
        .hints(integer)
        .scale_points(&INTERPOLATION_POINTS)
        .structural(),
        ParameterInfo::new(
            P::VoiceCount.index(),
            "Voice Count",
            ParameterRanges::new(0.0, 0.0, 65535.0).with_steps(1.0, 1.0, 1.0),
        )
        .hints(automable | ParameterHints::INTEGER)
        .output(),
    ]
}
