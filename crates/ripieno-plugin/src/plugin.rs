//! A hosted plugin instance.
//!
//! [`Plugin`] ties an adapter to its registry and built-in controls. Control
//! threads call the public setters; the audio thread calls
//! [`Plugin::process`](crate::process). Anything that reconfigures the adapter
//! goes through exclusive access: a [`ScopedDisabler`] while rendering in real
//! time, or the engine process lock when rendering offline.

use crate::adapter::{PluginAdapter, PluginInfo};
use crate::guard::ScopedDisabler;
use crate::post_event::{Notify, PostEvent, MAX_POST_EVENTS};
use crate::registry::{PortType, Registry};
use crate::remote::RemoteNotification;
use crate::ui::PluginUi;
use crate::{HostContext, PluginError, Result};
use parking_lot::Mutex;
use ripieno_core::{
    channel_index, outbox, AtomicDouble, AtomicFlag, CallbackEvent, OutboxReceiver, OutboxSender,
    ParameterDirection, ParameterTarget, PluginHints, PluginId, MAX_MIDI_CHANNELS,
    PERCUSSION_CHANNEL,
};
use ripieno_midi::{ExternalNote, NoteQueue, MAX_QUEUED_NOTES};
use std::sync::atomic::{AtomicI32, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Built-in controls every plugin has, independent of its parameter table.
#[derive(Debug)]
pub(crate) struct Controls {
    pub(crate) enabled: AtomicFlag,
    pub(crate) disablers: AtomicU32,
    pub(crate) active: AtomicFlag,
    pub(crate) dry_wet: AtomicDouble,
    pub(crate) volume: AtomicDouble,
    pub(crate) balance_left: AtomicDouble,
    pub(crate) balance_right: AtomicDouble,
    pub(crate) ctrl_in_channel: AtomicI32,
    pub(crate) hints: AtomicU32,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            enabled: AtomicFlag::new(true),
            disablers: AtomicU32::new(0),
            active: AtomicFlag::new(false),
            dry_wet: AtomicDouble::new(1.0),
            volume: AtomicDouble::new(1.0),
            balance_left: AtomicDouble::new(-1.0),
            balance_right: AtomicDouble::new(1.0),
            ctrl_in_channel: AtomicI32::new(0),
            hints: AtomicU32::new(0),
        }
    }
}

/// State only the thread holding the processing lock may touch.
pub struct RtState {
    pub(crate) adapter: Box<dyn PluginAdapter>,
    pub(crate) was_active: bool,
    pub(crate) post: OutboxSender<PostEvent>,
    pub(crate) notes: Vec<ExternalNote>,
    /// Pre-balance copy of a left channel.
    pub(crate) scratch: Vec<f32>,
    pub(crate) audio_ins: usize,
    pub(crate) audio_outs: usize,
    pub(crate) applied_gain: Option<f32>,
    pub(crate) native_gain: bool,
}

impl RtState {
    pub fn adapter(&self) -> &dyn PluginAdapter {
        self.adapter.as_ref()
    }

    pub fn adapter_mut(&mut self) -> &mut dyn PluginAdapter {
        self.adapter.as_mut()
    }

    /// Largest frame count a cycle may render.
    #[inline]
    pub fn max_frames(&self) -> usize {
        self.scratch.len()
    }
}

/// The UI handler plus a counter bumped by every [`Plugin::set_ui`].
#[derive(Default)]
struct UiSlot {
    handler: Option<Box<dyn PluginUi>>,
    epoch: u64,
}

pub struct Plugin {
    id: PluginId,
    name: String,
    info: PluginInfo,
    host: Arc<HostContext>,
    pub(crate) controls: Controls,
    pub(crate) registry: Registry,
    pub(crate) notes: NoteQueue,
    pub(crate) rt: Mutex<RtState>,
    post_rx: Mutex<OutboxReceiver<PostEvent>>,
    ui: Mutex<UiSlot>,
    /// Post events that did not fit the ring since the last post-event run.
    post_dropped: AtomicU64,
    /// Built-in controls whose dropped change still has to be reported.
    unreported_controls: AtomicU32,
    /// Non-structural values waiting to be pushed at the next cycle.
    pub(crate) params_dirty: AtomicFlag,
    /// Structural values set by automation, applied by the next post-event run.
    pub(crate) structural_dirty: AtomicFlag,
}

impl Plugin {
    /// Wraps `adapter` and runs the initial reload. The plugin is not shared
    /// yet, so no exclusion is needed.
    pub fn new(
        id: PluginId,
        name: impl Into<String>,
        host: Arc<HostContext>,
        adapter: Box<dyn PluginAdapter>,
    ) -> Self {
        let (post, post_rx) = outbox(MAX_POST_EVENTS);
        let info = adapter.info().clone();
        let plugin = Self {
            id,
            name: name.into(),
            info,
            host,
            controls: Controls::default(),
            registry: Registry::new(),
            notes: NoteQueue::new(),
            rt: Mutex::new(RtState {
                adapter,
                was_active: false,
                post,
                notes: Vec::with_capacity(MAX_QUEUED_NOTES),
                scratch: Vec::new(),
                audio_ins: 0,
                audio_outs: 0,
                applied_gain: None,
                native_gain: false,
            }),
            post_rx: Mutex::new(post_rx),
            ui: Mutex::new(UiSlot::default()),
            post_dropped: AtomicU64::new(0),
            unreported_controls: AtomicU32::new(0),
            params_dirty: AtomicFlag::new(false),
            structural_dirty: AtomicFlag::new(false),
        };

        {
            let mut rt = plugin.rt.lock();
            plugin.reload_locked(&mut rt);
        }
        plugin.announce_reload(false);
        plugin
    }

    // ---------------------------------------------------------------------
    // Information

    #[inline]
    pub fn id(&self) -> PluginId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn info(&self) -> &PluginInfo {
        &self.info
    }

    pub fn host(&self) -> &HostContext {
        &self.host
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[inline]
    pub fn hints(&self) -> PluginHints {
        PluginHints::from_bits(self.controls.hints.load(Ordering::Acquire))
    }

    pub fn audio_in_count(&self) -> usize {
        self.registry.port_count(PortType::Audio, true)
    }

    pub fn audio_out_count(&self) -> usize {
        self.registry.port_count(PortType::Audio, false)
    }

    pub fn parameter_count(&self) -> usize {
        self.registry.parameter_count()
    }

    pub fn parameter_value(&self, index: usize) -> Result<f64> {
        self.registry.parameter_value(index)
    }

    // ---------------------------------------------------------------------
    // Built-in controls

    /// False while the user disabled the plugin or any disable guard is held.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.controls.enabled.get() && self.controls.disablers.load(Ordering::Acquire) == 0
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.controls.enabled.set(enabled);
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.controls.active.get()
    }

    pub fn set_active(&self, active: bool, notify: Notify) {
        if self.controls.active.swap(active) == active {
            return;
        }
        let value = if active { 1.0 } else { 0.0 };
        self.notify(
            PostEvent::ParameterChange {
                target: ParameterTarget::Active,
                value,
            },
            notify,
        );
    }

    pub fn dry_wet(&self) -> f64 {
        self.controls.dry_wet.get()
    }

    pub fn volume(&self) -> f64 {
        self.controls.volume.get()
    }

    pub fn balance_left(&self) -> f64 {
        self.controls.balance_left.get()
    }

    pub fn balance_right(&self) -> f64 {
        self.controls.balance_right.get()
    }

    pub fn set_dry_wet(&self, value: f64, notify: Notify) {
        self.set_control(ParameterTarget::DryWet, value, notify);
    }

    pub fn set_volume(&self, value: f64, notify: Notify) {
        self.set_control(ParameterTarget::Volume, value, notify);
    }

    pub fn set_balance_left(&self, value: f64, notify: Notify) {
        self.set_control(ParameterTarget::BalanceLeft, value, notify);
    }

    pub fn set_balance_right(&self, value: f64, notify: Notify) {
        self.set_control(ParameterTarget::BalanceRight, value, notify);
    }

    fn set_control(&self, target: ParameterTarget, value: f64, notify: Notify) {
        let value = self.store_control(target, value);
        self.notify(PostEvent::ParameterChange { target, value }, notify);
    }

    /// Clamps and stores a built-in control value. Lock-free.
    pub(crate) fn store_control(&self, target: ParameterTarget, value: f64) -> f64 {
        let Some((min, max)) = target.control_range() else {
            return value;
        };
        let value = if value.is_nan() { min } else { value.clamp(min, max) };
        match target {
            ParameterTarget::DryWet => self.controls.dry_wet.set(value),
            ParameterTarget::Volume => self.controls.volume.set(value),
            ParameterTarget::BalanceLeft => self.controls.balance_left.set(value),
            ParameterTarget::BalanceRight => self.controls.balance_right.set(value),
            ParameterTarget::Active => self.controls.active.set(value >= 0.5),
            ParameterTarget::Index(_) => {}
        }
        value
    }

    /// The bound MIDI input channel, if set.
    #[inline]
    pub fn ctrl_in_channel(&self) -> Option<u8> {
        channel_index(self.controls.ctrl_in_channel.load(Ordering::Acquire)).map(|c| c as u8)
    }

    /// Binds the plugin to `channel`; `None` unbinds it.
    pub fn set_ctrl_in_channel(&self, channel: Option<u8>) -> Result<()> {
        let raw = match channel {
            Some(c) if c as usize >= MAX_MIDI_CHANNELS => {
                return Err(PluginError::InvalidBinding(format!("channel {c}")));
            }
            Some(c) => c as i32,
            None => -1,
        };
        self.controls.ctrl_in_channel.store(raw, Ordering::Release);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Parameters

    /// Clamps, quantizes and stores a parameter value; returns the stored value.
    ///
    /// Structural parameters are applied to the adapter under exclusive
    /// access. Others are pushed to the adapter at the start of the next cycle.
    pub fn set_parameter_value(&self, index: usize, value: f64, notify: Notify) -> Result<f64> {
        let structural = self.registry.parameter_info(index)?.structural;

        let fixed = if structural {
            self.with_exclusive(|rt| {
                let parameters = self.registry.parameters();
                let parameter = parameters
                    .get(index)
                    .ok_or_else(|| PluginError::out_of_range("parameter", index, parameters.len()))?;
                let fixed = parameter.store(value);
                rt.adapter.apply_parameter(parameter.info().index, fixed);
                Ok::<_, PluginError>(fixed)
            })?
        } else {
            let parameters = self.registry.parameters();
            let parameter = parameters
                .get(index)
                .ok_or_else(|| PluginError::out_of_range("parameter", index, parameters.len()))?;
            let fixed = parameter.store(value);
            parameter.mark_dirty();
            self.params_dirty.set(true);
            fixed
        };

        self.notify(
            PostEvent::ParameterChange {
                target: ParameterTarget::Index(index as u32),
                value: fixed,
            },
            notify,
        );
        Ok(fixed)
    }

    pub fn set_parameter_midi_channel(&self, index: usize, channel: u8) -> Result<()> {
        self.registry.set_parameter_midi_channel(index, channel)
    }

    pub fn set_parameter_midi_cc(&self, index: usize, cc: i16) -> Result<()> {
        self.registry.set_parameter_midi_cc(index, cc)
    }

    // ---------------------------------------------------------------------
    // Programs

    /// Selects MIDI program `index` on the bound input channel.
    ///
    /// Does nothing when no input channel is bound.
    pub fn set_midi_program(&self, index: usize, notify: Notify) -> Result<()> {
        let count = self.registry.program_count();
        if index >= count {
            return Err(PluginError::out_of_range("MIDI program", index, count));
        }
        if self.ctrl_in_channel().is_none() {
            return Ok(());
        }

        if self.with_exclusive(|rt| self.select_program_locked(rt, index)) {
            self.notify(PostEvent::ProgramChange { index }, notify);
        }
        Ok(())
    }

    /// Program switch for a caller that already has exclusive access.
    /// Returns whether a program was selected.
    pub(crate) fn select_program_locked(&self, rt: &mut RtState, index: usize) -> bool {
        let Some(channel) = self.ctrl_in_channel() else {
            return false;
        };
        let Some((bank, program)) = self.registry.program_numbers(index) else {
            return false;
        };
        rt.adapter.program_select(channel, bank, program);
        self.registry.set_current_program(Some(index));
        true
    }

    // ---------------------------------------------------------------------
    // Reload

    /// Rebuilds ports, parameters and programs from the adapter.
    pub fn reload(&self) {
        self.with_exclusive(|rt| self.reload_locked(rt));
        self.announce_reload(true);
    }

    pub fn reload_programs(&self, init: bool) {
        self.with_exclusive(|rt| self.reload_programs_locked(rt, init));
        self.announce_reload(false);
    }

    /// Reports a reload to the host once exclusive access is released.
    fn announce_reload(&self, all: bool) {
        let callback = self.host.callback();
        callback.on_event(CallbackEvent::ReloadPrograms { plugin_id: self.id });
        if all {
            callback.on_event(CallbackEvent::ReloadAll { plugin_id: self.id });
        }
    }

    fn reload_locked(&self, rt: &mut RtState) {
        debug!(plugin = self.id, name = %self.name, "reload start");

        let config = self.host.config();
        let layout = rt.adapter.reload(config);

        rt.audio_ins = layout.audio_count(true);
        rt.audio_outs = layout.audio_count(false);
        rt.scratch = vec![0.0; config.buffer_size as usize];
        rt.applied_gain = None;
        rt.native_gain = false;

        let prefixed = config.prefixed_port_names();
        let ports = layout
            .ports
            .into_iter()
            .map(|mut port| {
                if prefixed {
                    port.name = format!("{}:{}", self.name, port.name);
                }
                port
            })
            .collect();

        self.controls
            .hints
            .store(layout.hints.bits(), Ordering::Release);
        self.registry.replace_layout(ports, layout.parameters);

        for parameter in self.registry.parameters().iter() {
            if parameter.info().direction == ParameterDirection::Input {
                rt.adapter
                    .apply_parameter(parameter.info().index, parameter.value());
            }
        }

        self.reload_programs_locked(rt, true);

        debug!(
            plugin = self.id,
            parameters = self.registry.parameter_count(),
            programs = self.registry.program_count(),
            "reload end"
        );
    }

    fn reload_programs_locked(&self, rt: &mut RtState, init: bool) {
        let programs = rt.adapter.programs();
        let first = programs.first().map(|p| (p.bank, p.program));
        self.registry.replace_programs(programs);

        if !init {
            return;
        }

        rt.adapter.program_reset();

        if let Some((bank, program)) = first {
            for channel in 0..MAX_MIDI_CHANNELS as u8 {
                if channel == PERCUSSION_CHANNEL {
                    rt.adapter.program_select(channel, 128, 0);
                } else {
                    rt.adapter.program_select(channel, bank, program);
                }
            }
            self.select_program_locked(rt, 0);
        }
    }

    // ---------------------------------------------------------------------
    // Exclusive access

    /// Excludes this plugin from processing until the guard is dropped.
    pub fn disable(&self) -> ScopedDisabler<'_> {
        ScopedDisabler::new(self)
    }

    /// Runs `f` while no cycle can render this plugin.
    pub(crate) fn with_exclusive<R>(&self, f: impl FnOnce(&mut RtState) -> R) -> R {
        if self.host.is_offline() {
            let _engine = self.host.lock_process();
            let mut rt = self.rt.lock();
            f(&mut rt)
        } else {
            let mut guard = self.disable();
            f(&mut guard)
        }
    }

    // ---------------------------------------------------------------------
    // Notes

    /// Queues a note for the next cycle; `velocity == 0` sends a note-off.
    pub fn send_midi_single_note(
        &self,
        channel: u8,
        note: u8,
        velocity: u8,
        notify: Notify,
    ) -> Result<()> {
        self.notes.push(channel, note, velocity)?;

        let event = if velocity > 0 {
            PostEvent::NoteOn {
                channel,
                note,
                velocity,
            }
        } else {
            PostEvent::NoteOff { channel, note }
        };
        self.notify(event, notify);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Notifications

    pub fn set_ui(&self, ui: Option<Box<dyn PluginUi>>) {
        let mut slot = self.ui.lock();
        slot.handler = ui;
        slot.epoch += 1;
    }

    /// Records a notification for the next post-event run. Audio thread only.
    ///
    /// When the ring is full the event is counted as dropped; a dropped
    /// parameter change is remembered so its latest value is still reported.
    pub(crate) fn post(&self, post: &mut OutboxSender<PostEvent>, event: PostEvent) {
        if post.push(event) {
            return;
        }
        self.post_dropped.fetch_add(1, Ordering::Relaxed);

        if let PostEvent::ParameterChange { target, .. } = event {
            match target {
                ParameterTarget::Index(index) => {
                    if let Some(parameter) = self.registry.parameters().get(index as usize) {
                        parameter.mark_unreported();
                    }
                }
                control => {
                    self.unreported_controls
                        .fetch_or(control_bit(control), Ordering::AcqRel);
                }
            }
        }
    }

    /// Dispatches everything the audio thread recorded since the last call.
    /// Runs on a control thread.
    pub fn run_post_events(&self) {
        if self.structural_dirty.swap(false) {
            self.apply_structural_changes();
        }

        let events = self.post_rx.lock().drain_all();
        for event in events {
            self.notify(event, Notify::ALL);
        }

        let dropped = self.post_dropped.swap(0, Ordering::AcqRel);
        if dropped > 0 {
            warn!(plugin = self.id, dropped, "post-event ring overflowed");
            self.host.callback().on_event(CallbackEvent::Debug {
                plugin_id: self.id,
                message: format!("{dropped} notifications dropped"),
            });
            self.report_unreported();
        }
    }

    /// Reports the current value of every change lost to a full ring.
    fn report_unreported(&self) {
        let controls = self.unreported_controls.swap(0, Ordering::AcqRel);
        for target in CONTROL_TARGETS {
            if controls & control_bit(target) == 0 {
                continue;
            }
            let value = match target {
                ParameterTarget::Active => f64::from(u8::from(self.is_active())),
                ParameterTarget::DryWet => self.dry_wet(),
                ParameterTarget::Volume => self.volume(),
                ParameterTarget::BalanceLeft => self.balance_left(),
                ParameterTarget::BalanceRight => self.balance_right(),
                ParameterTarget::Index(_) => continue,
            };
            self.notify(PostEvent::ParameterChange { target, value }, Notify::ALL);
        }

        for (k, parameter) in self.registry.parameters().iter().enumerate() {
            if parameter.take_unreported() {
                self.notify(
                    PostEvent::ParameterChange {
                        target: ParameterTarget::Index(k as u32),
                        value: parameter.value(),
                    },
                    Notify::ALL,
                );
            }
        }
    }

    fn apply_structural_changes(&self) {
        self.with_exclusive(|rt| {
            for parameter in self.registry.parameters().iter() {
                if parameter.info().structural && parameter.take_dirty() {
                    rt.adapter
                        .apply_parameter(parameter.info().index, parameter.value());
                }
            }
        });
    }

    /// Calls the UI without holding its lock, so the UI may call back into
    /// the plugin. Notifications raised meanwhile skip the UI.
    fn notify_ui(&self, event: PostEvent) {
        let (handler, epoch) = {
            let mut slot = self.ui.lock();
            (slot.handler.take(), slot.epoch)
        };
        let Some(mut ui) = handler else {
            return;
        };

        match event {
            PostEvent::ParameterChange { target, value } => ui.parameter_changed(target, value),
            PostEvent::ProgramChange { index } => ui.program_changed(index),
            PostEvent::NoteOn {
                channel,
                note,
                velocity,
            } => ui.note_on(channel, note, velocity),
            PostEvent::NoteOff { channel, note } => ui.note_off(channel, note),
            PostEvent::AllNotesOff { channel } => {
                (0..128).for_each(|note| ui.note_off(channel, note))
            }
        }

        let mut slot = self.ui.lock();
        if slot.epoch == epoch {
            slot.handler = Some(ui);
        }
    }

    fn notify(&self, event: PostEvent, notify: Notify) {
        if notify.gui {
            self.notify_ui(event);
        }

        let plugin_id = self.id;

        if notify.remote {
            let remote = self.host.remote();
            match event {
                PostEvent::ParameterChange { target, value } => {
                    remote.send(RemoteNotification::ParameterChanged {
                        plugin_id,
                        target,
                        value,
                    })
                }
                PostEvent::ProgramChange { index } => {
                    remote.send(RemoteNotification::ProgramChanged { plugin_id, index })
                }
                PostEvent::NoteOn {
                    channel,
                    note,
                    velocity,
                } => remote.send(RemoteNotification::NoteOn {
                    plugin_id,
                    channel,
                    note,
                    velocity,
                }),
                PostEvent::NoteOff { channel, note } => remote.send(RemoteNotification::NoteOff {
                    plugin_id,
                    channel,
                    note,
                }),
                PostEvent::AllNotesOff { channel } => (0..128).for_each(|note| {
                    remote.send(RemoteNotification::NoteOff {
                        plugin_id,
                        channel,
                        note,
                    })
                }),
            }
        }

        if notify.callback {
            let callback = self.host.callback();
            match event {
                PostEvent::ParameterChange { target, value } => {
                    callback.on_event(CallbackEvent::ParameterChanged {
                        plugin_id,
                        target,
                        value,
                    })
                }
                PostEvent::ProgramChange { index } => {
                    callback.on_event(CallbackEvent::ProgramChanged { plugin_id, index })
                }
                PostEvent::NoteOn {
                    channel,
                    note,
                    velocity,
                } => callback.on_event(CallbackEvent::NoteOn {
                    plugin_id,
                    channel,
                    note,
                    velocity,
                }),
                PostEvent::NoteOff { channel, note } => callback.on_event(CallbackEvent::NoteOff {
                    plugin_id,
                    channel,
                    note,
                }),
                PostEvent::AllNotesOff { channel } => (0..128).for_each(|note| {
                    callback.on_event(CallbackEvent::NoteOff {
                        plugin_id,
                        channel,
                        note,
                    })
                }),
            }
        }
    }
}

const CONTROL_TARGETS: [ParameterTarget; 5] = [
    ParameterTarget::Active,
    ParameterTarget::DryWet,
    ParameterTarget::Volume,
    ParameterTarget::BalanceLeft,
    ParameterTarget::BalanceRight,
];

fn control_bit(target: ParameterTarget) -> u32 {
    match target {
        ParameterTarget::Active => 1 << 0,
        ParameterTarget::DryWet => 1 << 1,
        ParameterTarget::Volume => 1 << 2,
        ParameterTarget::BalanceLeft => 1 << 3,
        ParameterTarget::BalanceRight => 1 << 4,
        ParameterTarget::Index(_) => 0,
    }
}
