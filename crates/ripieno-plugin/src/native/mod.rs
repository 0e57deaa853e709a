//! Built-in plugins compiled into the host.

mod bypass;

use crate::adapter::{PluginAdapter, PluginCategory, PluginInfo, PluginKind, PluginLayout};
use crate::registry::PortType;
use crate::{PluginError, Result};
use ripieno_core::{EngineConfig, PluginHints};

/// The DSP half of a built-in plugin.
pub trait NativeProcessor: Send {
    fn process(&mut self, inputs: &[&[f32]], outputs: &mut [&mut [f32]], frames: usize);
}

/// Static description of a built-in plugin.
pub struct NativeDescriptor {
    pub label: &'static str,
    pub name: &'static str,
    pub maker: &'static str,
    pub copyright: &'static str,
    pub category: PluginCategory,
    pub audio_inputs: &'static [&'static str],
    pub audio_outputs: &'static [&'static str],
    pub create: fn() -> Box<dyn NativeProcessor>,
}

pub static NATIVE_PLUGINS: &[NativeDescriptor] = &[bypass::DESCRIPTOR];

pub fn native_descriptor(label: &str) -> Option<&'static NativeDescriptor> {
    NATIVE_PLUGINS.iter().find(|d| d.label == label)
}

/// Instantiates the built-in plugin registered under `label`.
pub fn native_plugin(label: &str) -> Result<NativeAdapter> {
    native_descriptor(label)
        .map(NativeAdapter::new)
        .ok_or_else(|| PluginError::UnknownLabel(label.to_string()))
}

pub struct NativeAdapter {
    descriptor: &'static NativeDescriptor,
    info: PluginInfo,
    processor: Box<dyn NativeProcessor>,
}

impl NativeAdapter {
    pub fn new(descriptor: &'static NativeDescriptor) -> Self {
        Self {
            descriptor,
            info: PluginInfo {
                kind: PluginKind::Native,
                category: descriptor.category,
                label: descriptor.label.to_string(),
                real_name: descriptor.name.to_string(),
                maker: descriptor.maker.to_string(),
                copyright: descriptor.copyright.to_string(),
                filename: None,
            },
            processor: (descriptor.create)(),
        }
    }
}

impl PluginAdapter for NativeAdapter {
    fn info(&self) -> &PluginInfo {
        &self.info
    }

    fn reload(&mut self, _config: &EngineConfig) -> PluginLayout {
        let d = self.descriptor;

        let mut hints = PluginHints::empty();
        if !d.audio_inputs.is_empty() && !d.audio_outputs.is_empty() {
            hints |= PluginHints::CAN_DRYWET;
        }
        if !d.audio_outputs.is_empty() {
            hints |= PluginHints::CAN_VOLUME;
        }
        if d.audio_outputs.len() >= 2 {
            hints |= PluginHints::CAN_BALANCE;
        }

        let layout = PluginLayout {
            hints,
            ..Default::default()
        };
        let layout = d
            .audio_inputs
            .iter()
            .fold(layout, |l, name| l.port(name, PortType::Audio, true));
        d.audio_outputs
            .iter()
            .fold(layout, |l, name| l.port(name, PortType::Audio, false))
    }

    fn render(&mut self, inputs: &[&[f32]], outputs: &mut [&mut [f32]], frames: usize) {
        self.processor.process(inputs, outputs, frames);
    }
}
