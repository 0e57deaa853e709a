//! Per-plugin table of ports, parameters and MIDI programs.
//!
//! Tables are immutable snapshots behind [`ArcSwap`]: a reload builds new
//! tables and swaps them in whole. Parameter values and MIDI bindings are
//! atomics inside the snapshot, so the audio thread reads and writes them
//! without locking.

use crate::{PluginError, Result};
use arc_swap::{ArcSwap, Guard};
use ripieno_core::{
    AtomicDouble, AtomicFlag, ParameterDirection, ParameterHints, ParameterRanges, ScalePoint,
};
use ripieno_midi::is_bindable_controller;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortType {
    Audio,
    Control,
    Midi,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    pub port_type: PortType,
    pub is_input: bool,
}

/// Static description of a parameter, as declared by an adapter on reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Index inside the adapter.
    pub index: u32,
    pub name: String,
    pub unit: String,
    pub direction: ParameterDirection,
    pub hints: ParameterHints,
    pub ranges: ParameterRanges,
    pub midi_channel: i32,
    /// `-1` when unbound.
    pub midi_cc: i32,
    pub scale_points: Vec<ScalePoint>,
    /// Changing the value reconfigures the adapter and must not overlap a render.
    pub structural: bool,
}

impl ParameterInfo {
    pub fn new(index: u32, name: impl Into<String>, ranges: ParameterRanges) -> Self {
        Self {
            index,
            name: name.into(),
            unit: String::new(),
            direction: ParameterDirection::Input,
            hints: ParameterHints::ENABLED,
            ranges,
            midi_channel: 0,
            midi_cc: -1,
            scale_points: Vec::new(),
            structural: false,
        }
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn hints(mut self, hints: ParameterHints) -> Self {
        self.hints = hints;
        self
    }

    pub fn output(mut self) -> Self {
        self.direction = ParameterDirection::Output;
        self
    }

    pub fn midi_cc(mut self, cc: i32) -> Self {
        self.midi_cc = cc;
        self
    }

    pub fn scale_points(mut self, points: &[ScalePoint]) -> Self {
        self.scale_points = points.to_vec();
        self.hints |= ParameterHints::USES_SCALEPOINTS;
        self
    }

    pub fn structural(mut self) -> Self {
        self.structural = true;
        self
    }

    #[inline]
    pub fn is_automable_input(&self) -> bool {
        self.direction == ParameterDirection::Input
            && self.hints.contains(ParameterHints::AUTOMABLE)
    }
}

/// A live parameter: its description plus the shared value and MIDI binding.
#[derive(Debug)]
pub struct Parameter {
    info: ParameterInfo,
    value: AtomicDouble,
    midi_channel: AtomicI32,
    midi_cc: AtomicI32,
    dirty: AtomicFlag,
    /// A change notification for this value was dropped.
    unreported: AtomicFlag,
}

impl Parameter {
    fn new(info: ParameterInfo) -> Self {
        Self {
            value: AtomicDouble::new(info.ranges.def),
            midi_channel: AtomicI32::new(info.midi_channel),
            midi_cc: AtomicI32::new(info.midi_cc),
            dirty: AtomicFlag::new(false),
            unreported: AtomicFlag::new(false),
            info,
        }
    }

    #[inline]
    pub fn info(&self) -> &ParameterInfo {
        &self.info
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value.get()
    }

    #[inline]
    pub fn midi_channel(&self) -> i32 {
        self.midi_channel.load(Ordering::Acquire)
    }

    #[inline]
    pub fn midi_cc(&self) -> i32 {
        self.midi_cc.load(Ordering::Acquire)
    }

    /// Whether a control change on `channel`/`controller` drives this parameter.
    #[inline]
    pub fn is_bound_to(&self, channel: u8, controller: u16) -> bool {
        self.midi_channel() == channel as i32 && self.midi_cc() == controller as i32
    }

    /// Quantizes, clamps and stores `value`; returns the stored value.
    #[inline]
    pub(crate) fn store(&self, value: f64) -> f64 {
        let fixed = self.info.ranges.quantize(self.info.hints, value);
        self.value.set(fixed);
        fixed
    }

    /// Stores a value already produced by the parameter's own range.
    #[inline]
    pub(crate) fn store_fixed(&self, value: f64) {
        self.value.set(self.info.ranges.fix_value(value));
    }

    #[inline]
    pub(crate) fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    #[inline]
    pub(crate) fn take_dirty(&self) -> bool {
        self.dirty.swap(false)
    }

    #[inline]
    pub(crate) fn mark_unreported(&self) {
        self.unreported.set(true);
    }

    #[inline]
    pub(crate) fn take_unreported(&self) -> bool {
        self.unreported.swap(false)
    }

    /// The description with the current MIDI binding.
    pub fn snapshot(&self) -> ParameterInfo {
        let mut info = self.info.clone();
        info.midi_channel = self.midi_channel();
        info.midi_cc = self.midi_cc();
        info
    }
}

/// A selectable bank/program pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiProgram {
    pub bank: u32,
    pub program: u32,
    pub name: String,
}

impl MidiProgram {
    pub fn new(bank: u32, program: u32, name: impl Into<String>) -> Self {
        Self {
            bank,
            program,
            name: name.into(),
        }
    }
}

pub type Parameters = Guard<Arc<Vec<Parameter>>>;

#[derive(Debug)]
pub struct Registry {
    ports: ArcSwap<Vec<Port>>,
    parameters: ArcSwap<Vec<Parameter>>,
    programs: ArcSwap<Vec<MidiProgram>>,
    current_program: AtomicI32,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            ports: ArcSwap::from_pointee(Vec::new()),
            parameters: ArcSwap::from_pointee(Vec::new()),
            programs: ArcSwap::from_pointee(Vec::new()),
            current_program: AtomicI32::new(-1),
        }
    }

    /// Replaces ports and parameters. Values start at their defaults.
    pub(crate) fn replace_layout(&self, ports: Vec<Port>, parameters: Vec<ParameterInfo>) {
        self.ports.store(Arc::new(ports));
        self.parameters
            .store(Arc::new(parameters.into_iter().map(Parameter::new).collect()));
    }

    /// Replaces the program table and clears the current program.
    pub(crate) fn replace_programs(&self, programs: Vec<MidiProgram>) {
        self.programs.store(Arc::new(programs));
        self.current_program.store(-1, Ordering::Release);
    }

    // ---------------------------------------------------------------------
    // Ports

    pub fn ports(&self) -> Arc<Vec<Port>> {
        self.ports.load_full()
    }

    pub fn port_count(&self, port_type: PortType, is_input: bool) -> usize {
        self.ports
            .load()
            .iter()
            .filter(|p| p.port_type == port_type && p.is_input == is_input)
            .count()
    }

    // ---------------------------------------------------------------------
    // Parameters

    /// Lock-free snapshot of the parameter table.
    #[inline]
    pub fn parameters(&self) -> Parameters {
        self.parameters.load()
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.load().len()
    }

    pub fn parameter_value(&self, index: usize) -> Result<f64> {
        self.with_parameter(index, Parameter::value)
    }

    pub fn parameter_info(&self, index: usize) -> Result<ParameterInfo> {
        self.with_parameter(index, Parameter::snapshot)
    }

    pub fn parameter_infos(&self) -> Vec<ParameterInfo> {
        self.parameters.load().iter().map(Parameter::snapshot).collect()
    }

    pub fn scale_point_count(&self, index: usize) -> Result<usize> {
        self.with_parameter(index, |p| p.info.scale_points.len())
    }

    pub fn scale_point_label(&self, index: usize, point: usize) -> Result<String> {
        self.scale_point(index, point).map(|p| p.label.into_owned())
    }

    pub fn scale_point_value(&self, index: usize, point: usize) -> Result<f64> {
        self.scale_point(index, point).map(|p| p.value)
    }

    fn scale_point(&self, index: usize, point: usize) -> Result<ScalePoint> {
        self.with_parameter(index, |p| {
            let points = &p.info.scale_points;
            points
                .get(point)
                .cloned()
                .ok_or_else(|| PluginError::out_of_range("scale point", point, points.len()))
        })?
    }

    pub fn set_parameter_midi_channel(&self, index: usize, channel: u8) -> Result<()> {
        if channel as usize >= ripieno_core::MAX_MIDI_CHANNELS {
            return Err(PluginError::InvalidBinding(format!("channel {channel}")));
        }
        self.with_parameter(index, |p| {
            p.midi_channel.store(channel as i32, Ordering::Release)
        })
    }

    /// Binds a parameter to a controller; `-1` unbinds it.
    pub fn set_parameter_midi_cc(&self, index: usize, cc: i16) -> Result<()> {
        if cc != -1 && !is_bindable_controller(cc) {
            return Err(PluginError::InvalidBinding(format!("controller {cc}")));
        }
        self.with_parameter(index, |p| p.midi_cc.store(cc as i32, Ordering::Release))
    }

    fn with_parameter<R>(&self, index: usize, f: impl FnOnce(&Parameter) -> R) -> Result<R> {
        let parameters = self.parameters.load();
        parameters
            .get(index)
            .map(f)
            .ok_or_else(|| PluginError::out_of_range("parameter", index, parameters.len()))
    }

    // ---------------------------------------------------------------------
    // MIDI programs

    pub fn program_count(&self) -> usize {
        self.programs.load().len()
    }

    pub fn program(&self, index: usize) -> Result<MidiProgram> {
        let programs = self.programs.load();
        programs
            .get(index)
            .cloned()
            .ok_or_else(|| PluginError::out_of_range("MIDI program", index, programs.len()))
    }

    pub fn programs(&self) -> Arc<Vec<MidiProgram>> {
        self.programs.load_full()
    }

    /// Bank and program number of entry `index`, without cloning the name.
    #[inline]
    pub(crate) fn program_numbers(&self, index: usize) -> Option<(u32, u32)> {
        self.programs
            .load()
            .get(index)
            .map(|p| (p.bank, p.program))
    }

    #[inline]
    pub fn current_program(&self) -> Option<usize> {
        usize::try_from(self.current_program.load(Ordering::Acquire)).ok()
    }

    #[inline]
    pub(crate) fn set_current_program(&self, index: Option<usize>) {
        let raw = index.map_or(-1, |i| i as i32);
        self.current_program.store(raw, Ordering::Release);
    }

    /// Index of the program matching `{bank, program}`.
    pub fn find_program(&self, bank: u32, program: u32) -> Option<usize> {
        self.programs
            .load()
            .iter()
            .position(|p| p.bank == bank && p.program == program)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
