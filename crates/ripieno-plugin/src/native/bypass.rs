//! Copies its input to its output.

use super::{NativeDescriptor, NativeProcessor};
use crate::adapter::PluginCategory;

pub(super) const DESCRIPTOR: NativeDescriptor = NativeDescriptor {
    label: "bypass",
    name: "ByPass",
    maker: "falkTX",
    copyright: "GNU GPL v2+",
    category: PluginCategory::None,
    audio_inputs: &["in"],
    audio_outputs: &["out"],
    create,
};

fn create() -> Box<dyn NativeProcessor> {
    Box::new(Bypass)
}

struct Bypass;

impl NativeProcessor for Bypass {
    fn process(&mut self, inputs: &[&[f32]], outputs: &mut [&mut [f32]], frames: usize) {
        if let (Some(input), Some(output)) = (inputs.first(), outputs.first_mut()) {
            output[..frames].copy_from_slice(&input[..frames]);
        }
    }
}
