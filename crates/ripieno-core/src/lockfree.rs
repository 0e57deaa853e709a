//! Cache-line aligned atomics shared between the audio thread and control threads.

use atomic_float::{AtomicF32, AtomicF64};
use std::sync::atomic::{AtomicBool, Ordering};

macro_rules! aligned_atomic {
    ($(#[$meta:meta])* $name:ident, $inner:ty, $value:ty, $zero:expr) => {
        $(#[$meta])*
        #[derive(Debug)]
        #[repr(align(64))]
        pub struct $name {
            value: $inner,
        }

        impl $name {
            pub fn new(value: $value) -> Self {
                Self {
                    value: <$inner>::new(value),
                }
            }

            #[inline]
            pub fn get(&self) -> $value {
                self.value.load(Ordering::Acquire)
            }

            #[inline]
            pub fn set(&self, value: $value) {
                self.value.store(value, Ordering::Release);
            }

            #[inline]
            pub fn swap(&self, value: $value) -> $value {
                self.value.swap(value, Ordering::AcqRel)
            }
        }

        impl Clone for $name {
            fn clone(&self) -> Self {
                Self::new(self.get())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new($zero)
            }
        }
    };
}

aligned_atomic!(
    /// Atomic `f32`, used for peak levels and per-plugin gain controls.
    AtomicFloat,
    AtomicF32,
    f32,
    0.0
);

aligned_atomic!(
    /// Atomic `f64`, used for parameter values.
    AtomicDouble,
    AtomicF64,
    f64,
    0.0
);

aligned_atomic!(
    /// Atomic `bool`, used for the enabled/active plugin flags.
    AtomicFlag,
    AtomicBool,
    bool,
    false
);
