//! Plugin editor notifications.

use ripieno_core::ParameterTarget;

/// A plugin editor window, owned by the GUI toolkit outside the engine.
///
/// Called from the thread that dispatches post events, never from the audio
/// thread.
pub trait PluginUi: Send {
    fn parameter_changed(&mut self, target: ParameterTarget, value: f64);

    fn program_changed(&mut self, index: usize);

    fn note_on(&mut self, channel: u8, note: u8, velocity: u8);

    fn note_off(&mut self, channel: u8, note: u8);
}
