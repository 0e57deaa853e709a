//! Parameter ranges, hints and targets.
//!
//! Every plugin family describes its parameters with the same vocabulary:
//! a [`ParameterRanges`] for the value domain, [`ParameterHints`] for how the
//! value may be set, and a [`ParameterDirection`].
//!
//! # Example
//!
//! ```
//! use ripieno_core::{ParameterHints, ParameterRanges};
//!
//! let polyphony = ParameterRanges::new(64.0, 1.0, 512.0);
//! let hints = ParameterHints::ENABLED | ParameterHints::INTEGER;
//!
//! // Host automation delivers normalized values
//! assert_eq!(polyphony.from_automation(hints, 1.0), 512.0);
//! assert_eq!(polyphony.quantize(hints, 63.6), 64.0);
//! ```

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::ops::{BitOr, BitOrAssign};

macro_rules! hint_flags {
    ($(#[$meta:meta])* $name:ident { $($(#[$fmeta:meta])* $flag:ident = $bit:expr,)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            $($(#[$fmeta])* pub const $flag: Self = Self($bit);)+

            pub const fn empty() -> Self {
                Self(0)
            }

            pub const fn bits(self) -> u32 {
                self.0
            }

            /// Unknown bits are kept as-is.
            pub const fn from_bits(bits: u32) -> Self {
                Self(bits)
            }

            #[inline]
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            #[inline]
            pub fn remove(&mut self, other: Self) {
                self.0 &= !other.0;
            }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }
    };
}

hint_flags!(
    /// How a parameter value may be set and displayed.
    ParameterHints {
        /// Only `min` or `max`.
        BOOLEAN = 0x01,
        /// Rounded to the nearest integer.
        INTEGER = 0x02,
        LOGARITHMIC = 0x04,
        ENABLED = 0x10,
        /// Accepts host automation and MIDI CC binding.
        AUTOMABLE = 0x20,
        USES_SAMPLERATE = 0x40,
        USES_SCALEPOINTS = 0x80,
    }
);

hint_flags!(
    /// Capabilities of a plugin instance, declared on reload.
    PluginHints {
        IS_SYNTH = 0x04,
        CAN_DRYWET = 0x100,
        CAN_VOLUME = 0x200,
        CAN_BALANCE = 0x400,
    }
);

/// Whether the plugin reads or writes a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParameterDirection {
    #[default]
    Input,
    Output,
}

/// Value domain of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterRanges {
    pub def: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub step_small: f64,
    pub step_large: f64,
}

impl ParameterRanges {
    pub fn new(def: f64, min: f64, max: f64) -> Self {
        debug_assert!(max >= min, "max must not be less than min");

        Self {
            def: def.clamp(min, max),
            min,
            max,
            step: 0.01,
            step_small: 0.0001,
            step_large: 0.1,
        }
    }

    pub fn with_steps(mut self, step: f64, step_small: f64, step_large: f64) -> Self {
        self.step = step;
        self.step_small = step_small;
        self.step_large = step_large;
        self
    }

    /// Clamps `value` into `[min, max]`. NaN becomes the default.
    #[inline]
    pub fn fix_value(&self, value: f64) -> f64 {
        if value.is_nan() {
            self.def
        } else if value <= self.min {
            self.min
        } else if value >= self.max {
            self.max
        } else {
            value
        }
    }

    /// Maps a real value to `[0, 1]`.
    #[inline]
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        (self.fix_value(value) - self.min) / span
    }

    /// Maps `[0, 1]` to a real value.
    #[inline]
    pub fn denormalize(&self, normalized: f64) -> f64 {
        let normalized = if normalized.is_nan() {
            0.0
        } else {
            normalized.clamp(0.0, 1.0)
        };
        normalized * (self.max - self.min) + self.min
    }

    /// Applies the `BOOLEAN`/`INTEGER` hints to a real value, then clamps.
    pub fn quantize(&self, hints: ParameterHints, value: f64) -> f64 {
        let value = self.fix_value(value);

        if hints.contains(ParameterHints::BOOLEAN) {
            if value < (self.min + self.max) / 2.0 {
                self.min
            } else {
                self.max
            }
        } else if hints.contains(ParameterHints::INTEGER) {
            self.fix_value(value.round())
        } else {
            value
        }
    }

    /// Converts normalized host automation into a real value.
    pub fn from_automation(&self, hints: ParameterHints, normalized: f64) -> f64 {
        if hints.contains(ParameterHints::BOOLEAN) {
            return if normalized < 0.5 { self.min } else { self.max };
        }

        let value = self.denormalize(normalized);
        if hints.contains(ParameterHints::INTEGER) {
            self.fix_value(value.round())
        } else {
            value
        }
    }
}

impl Default for ParameterRanges {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}

/// A named discrete value a parameter may take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalePoint {
    pub label: Cow<'static, str>,
    pub value: f64,
}

impl ScalePoint {
    pub const fn new(label: &'static str, value: f64) -> Self {
        Self {
            label: Cow::Borrowed(label),
            value,
        }
    }
}

/// Addresses either a registry parameter or one of the built-in plugin controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterTarget {
    Index(u32),
    Active,
    DryWet,
    Volume,
    BalanceLeft,
    BalanceRight,
}

impl ParameterTarget {
    /// Range of a built-in control. `None` for registry parameters.
    pub fn control_range(self) -> Option<(f64, f64)> {
        match self {
            ParameterTarget::Index(_) => None,
            ParameterTarget::Active | ParameterTarget::DryWet => Some((0.0, 1.0)),
            ParameterTarget::Volume => Some((0.0, 1.27)),
            ParameterTarget::BalanceLeft | ParameterTarget::BalanceRight => Some((-1.0, 1.0)),
        }
    }
}
