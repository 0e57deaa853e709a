//! Engine that owns the plugin slots and coordinates the rack

use crate::rack::{RackProcessor, RackShared};
use crate::{EngineBuilder, Error, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use ripieno_core::{CallbackEvent, EngineConfig, HostCallback, PluginId};
use ripieno_plugin::{
    native_descriptor, native_plugin, HostContext, Notify, Plugin, PluginAdapter, PluginError,
    RemoteControl, RemoteNotification, RemoteRequest,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[cfg(feature = "soundfont")]
use ripieno_plugin::{load_sf2, SoundFontCache};
#[cfg(feature = "soundfont")]
use std::path::Path;

/// Room kept free after the truncated base name for a `" (NN)"` suffix.
const NAME_SUFFIX_RESERVE: usize = 6;

/// Plugin host engine.
///
/// Control threads add, remove and configure plugins here; the audio thread
/// drives them through a [`RackProcessor`] or, with one transport client per
/// plugin, through [`Plugin::process`] directly.
///
/// # Example
///
/// ```ignore
/// use ripieno::prelude::*;
///
/// let engine = Engine::builder().sample_rate(48000.0).build()?;
/// let synth = engine.add_soundfont("piano.sf2", None, "Piano");
/// let mut rack = engine.rack_processor();
///
/// // Audio thread
/// rack.process(&[&in_l, &in_r], &mut [&mut out_l, &mut out_r], frames, &control, &midi);
///
/// // GUI thread, at its own pace
/// engine.idle();
/// ```
pub struct Engine {
    host: Arc<HostContext>,

    /// Indexed by plugin id.
    slots: Mutex<Vec<Slot>>,

    rack: Arc<RackShared>,

    remote_tx: Sender<RemoteRequest>,
    remote_rx: Receiver<RemoteRequest>,

    #[cfg(feature = "soundfont")]
    soundfonts: SoundFontCache,
}

impl Engine {
    /// Create a new engine builder
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub(crate) fn from_parts(
        config: EngineConfig,
        callback: Arc<dyn HostCallback>,
        remote: Arc<dyn RemoteControl>,
    ) -> Self {
        let slots = vec![Slot::Free; config.max_plugins as usize];
        let (remote_tx, remote_rx) = unbounded();
        debug!(
            sample_rate = config.sample_rate,
            buffer_size = config.buffer_size,
            mode = ?config.process_mode,
            "engine created"
        );

        Self {
            host: Arc::new(HostContext::new(config, callback, remote)),
            slots: Mutex::new(slots),
            rack: Arc::new(RackShared::new()),
            remote_tx,
            remote_rx,
            #[cfg(feature = "soundfont")]
            soundfonts: SoundFontCache::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        self.host.config()
    }

    pub fn sample_rate(&self) -> f64 {
        self.config().sample_rate
    }

    pub fn buffer_size(&self) -> u32 {
        self.config().buffer_size
    }

    /// Shared state handed to every plugin.
    pub fn host(&self) -> &Arc<HostContext> {
        &self.host
    }

    /// Message of the last failed `add_*` call.
    pub fn last_error(&self) -> String {
        self.host.last_error()
    }

    // ---------------------------------------------------------------------
    // Slots

    /// Lowest free plugin id, or `None` when every slot is taken.
    pub fn get_new_plugin_id(&self) -> Option<PluginId> {
        free_slot(&self.slots.lock())
    }

    /// `name` made safe for a transport client and distinct from every
    /// loaded plugin: truncated, `':'` replaced, then `" (2)"`, `" (3)"`, ...
    /// appended until nothing else carries it.
    pub fn get_unique_name(&self, name: &str) -> String {
        unique_name(&self.slots.lock(), name, self.config().max_name_length)
    }

    pub fn plugin(&self, id: PluginId) -> Option<Arc<Plugin>> {
        self.slots.lock().get(id as usize).and_then(Slot::plugin).cloned()
    }

    pub fn plugin_count(&self) -> usize {
        self.slots.lock().iter().filter_map(Slot::plugin).count()
    }

    /// Loaded plugins in id order.
    pub fn plugins(&self) -> Vec<Arc<Plugin>> {
        self.rack.plugins.load_full().as_ref().clone()
    }

    // ---------------------------------------------------------------------
    // Adding and removing

    /// Loads an `.sf2` file as a SoundFont synthesizer.
    ///
    /// The plugin is named after `name`, or `label` when no name is given.
    /// On failure the reason is kept in [`last_error`](Self::last_error).
    #[cfg(feature = "soundfont")]
    pub fn add_soundfont(
        &self,
        path: impl AsRef<Path>,
        name: Option<&str>,
        label: &str,
    ) -> Option<PluginId> {
        let path = path.as_ref();
        self.add_with(name.unwrap_or(label), || {
            let adapter = load_sf2(path, label, self.config(), &self.soundfonts)?;
            Ok(Box::new(adapter))
        })
    }

    /// Instantiates one of the built-in plugins by label.
    pub fn add_native(&self, label: &str, name: Option<&str>) -> Option<PluginId> {
        let name = name
            .or_else(|| native_descriptor(label).map(|d| d.name))
            .unwrap_or(label);
        self.add_with(name, || Ok(Box::new(native_plugin(label)?)))
    }

    /// Adds a plugin backed by a caller-provided adapter.
    pub fn add_plugin(&self, name: &str, adapter: Box<dyn PluginAdapter>) -> Option<PluginId> {
        self.add_with(name, || Ok(adapter))
    }

    fn add_with<F>(&self, name: &str, create: F) -> Option<PluginId>
    where
        F: FnOnce() -> ripieno_plugin::Result<Box<dyn PluginAdapter>>,
    {
        match self.try_add(name, create) {
            Ok(plugin) => {
                info!(plugin_id = plugin.id(), name = plugin.name(), "plugin added");
                self.host.callback().on_event(CallbackEvent::PluginAdded {
                    plugin_id: plugin.id(),
                    name: plugin.name().to_string(),
                });
                Some(plugin.id())
            }
            Err(err) => {
                warn!(name, error = %err, "failed to add plugin");
                self.host.set_last_error(err.to_string());
                None
            }
        }
    }

    /// Reserves a slot, builds the plugin without holding the slot lock, then
    /// publishes it. Callbacks fired while the plugin loads may call back into
    /// the engine.
    fn try_add<F>(&self, name: &str, create: F) -> ripieno_plugin::Result<Arc<Plugin>>
    where
        F: FnOnce() -> ripieno_plugin::Result<Box<dyn PluginAdapter>>,
    {
        let (id, name) = {
            let mut slots = self.slots.lock();
            let id = free_slot(&slots).ok_or(PluginError::MaxPluginsReached)?;
            let name = unique_name(&slots, name, self.config().max_name_length);
            slots[id as usize] = Slot::Reserved(name.clone());
            (id, name)
        };

        let adapter = match create() {
            Ok(adapter) => adapter,
            Err(err) => {
                self.slots.lock()[id as usize] = Slot::Free;
                return Err(err);
            }
        };

        let plugin = Arc::new(Plugin::new(id, name, Arc::clone(&self.host), adapter));
        plugin.set_active(true, Notify::NONE);

        let mut slots = self.slots.lock();
        slots[id as usize] = Slot::Loaded(Arc::clone(&plugin));
        self.publish(&slots);
        Ok(plugin)
    }

    /// Takes the plugin out of the rack. Returns `false` for an empty slot.
    pub fn remove_plugin(&self, id: PluginId) -> bool {
        let plugin = {
            let mut slots = self.slots.lock();
            let Some(plugin) = slots.get_mut(id as usize).and_then(Slot::take_plugin) else {
                return false;
            };
            self.publish(&slots);
            plugin
        };

        // Wait out a cycle that loaded the old snapshot before this returns.
        drop(plugin.disable());
        plugin.set_enabled(false);
        plugin.set_active(false, Notify::NONE);
        self.host.peaks().reset(id);

        info!(plugin_id = id, name = plugin.name(), "plugin removed");
        self.host
            .callback()
            .on_event(CallbackEvent::PluginRemoved { plugin_id: id });
        self.host
            .remote()
            .send(RemoteNotification::PluginRemoved { plugin_id: id });
        true
    }

    pub fn remove_all_plugins(&self) {
        let ids: Vec<PluginId> = self.plugins().iter().map(|p| p.id()).collect();
        for id in ids {
            self.remove_plugin(id);
        }
    }

    fn publish(&self, slots: &[Slot]) {
        let plugins: Vec<Arc<Plugin>> = slots.iter().filter_map(Slot::plugin).cloned().collect();
        self.rack.plugins.store(Arc::new(plugins));
    }

    // ---------------------------------------------------------------------
    // Processing

    /// A processor for the audio thread, sharing this engine's plugins.
    pub fn rack_processor(&self) -> RackProcessor {
        RackProcessor::new(Arc::clone(&self.host), Arc::clone(&self.rack))
    }

    /// Plugin cycles skipped because a plugin was disabled or busy.
    pub fn skipped_cycles(&self) -> u64 {
        self.rack.skipped_cycles.load(Ordering::Relaxed)
    }

    // ---------------------------------------------------------------------
    // Control thread

    /// Inbound side of the remote-control channel. Requests are applied by
    /// the next [`idle`](Self::idle) call.
    pub fn remote_sender(&self) -> Sender<RemoteRequest> {
        self.remote_tx.clone()
    }

    /// Applies remote requests, dispatches every plugin's post events and
    /// reports peaks. Call it periodically from a non-real-time thread.
    pub fn idle(&self) {
        while let Ok(request) = self.remote_rx.try_recv() {
            if let Err(err) = self.apply_remote(request) {
                warn!(error = %err, "remote request failed");
            }
        }

        let callback = self.host.callback();
        let peaks = self.host.peaks();
        for plugin in self.plugins() {
            plugin.run_post_events();

            let plugin_id = plugin.id();
            callback.on_event(CallbackEvent::PeaksUpdated {
                plugin_id,
                input: peaks.input(plugin_id),
                output: peaks.output(plugin_id),
            });
        }
    }

    /// Applies one remote request. Changes are not echoed back to the remote.
    pub fn apply_remote(&self, request: RemoteRequest) -> Result<()> {
        let plugin_id = request.plugin_id();
        if let RemoteRequest::RemovePlugin { .. } = request {
            return self
                .remove_plugin(plugin_id)
                .then_some(())
                .ok_or(Error::UnknownPlugin(plugin_id));
        }

        let plugin = self
            .plugin(plugin_id)
            .ok_or(Error::UnknownPlugin(plugin_id))?;
        let notify = Notify {
            remote: false,
            ..Notify::ALL
        };

        match request {
            RemoteRequest::SetActive { active, .. } => plugin.set_active(active, notify),
            RemoteRequest::SetDryWet { value, .. } => plugin.set_dry_wet(value, notify),
            RemoteRequest::SetVolume { value, .. } => plugin.set_volume(value, notify),
            RemoteRequest::SetBalanceLeft { value, .. } => plugin.set_balance_left(value, notify),
            RemoteRequest::SetBalanceRight { value, .. } => {
                plugin.set_balance_right(value, notify)
            }
            RemoteRequest::SetParameterValue { index, value, .. } => {
                plugin.set_parameter_value(index as usize, value, notify)?;
            }
            RemoteRequest::SetParameterMidiChannel { index, channel, .. } => {
                plugin.set_parameter_midi_channel(index as usize, channel)?
            }
            RemoteRequest::SetParameterMidiCc { index, cc, .. } => {
                plugin.set_parameter_midi_cc(index as usize, cc)?
            }
            RemoteRequest::SetMidiProgram { index, .. } => {
                plugin.set_midi_program(index as usize, notify)?
            }
            RemoteRequest::NoteOn {
                channel,
                note,
                velocity,
                ..
            } => plugin.send_midi_single_note(channel, note, velocity, notify)?,
            RemoteRequest::NoteOff { channel, note, .. } => {
                plugin.send_midi_single_note(channel, note, 0, notify)?
            }
            RemoteRequest::RemovePlugin { .. } => {}
        }
        Ok(())
    }
}

/// A plugin slot. `Reserved` holds an id and name while the plugin loads.
#[derive(Clone, Default)]
enum Slot {
    #[default]
    Free,
    Reserved(String),
    Loaded(Arc<Plugin>),
}

impl Slot {
    fn is_free(&self) -> bool {
        matches!(self, Slot::Free)
    }

    fn plugin(&self) -> Option<&Arc<Plugin>> {
        match self {
            Slot::Loaded(plugin) => Some(plugin),
            _ => None,
        }
    }

    fn name(&self) -> Option<&str> {
        match self {
            Slot::Free => None,
            Slot::Reserved(name) => Some(name),
            Slot::Loaded(plugin) => Some(plugin.name()),
        }
    }

    /// Frees a loaded slot; reserved and free slots are left alone.
    fn take_plugin(&mut self) -> Option<Arc<Plugin>> {
        match std::mem::take(self) {
            Slot::Loaded(plugin) => Some(plugin),
            other => {
                *self = other;
                None
            }
        }
    }
}

fn free_slot(slots: &[Slot]) -> Option<PluginId> {
    slots
        .iter()
        .position(Slot::is_free)
        .map(|index| index as PluginId)
}

fn unique_name(slots: &[Slot], name: &str, max_name_length: usize) -> String {
    let limit = max_name_length.saturating_sub(NAME_SUFFIX_RESERVE);
    let mut name: String = name.chars().take(limit).collect::<String>().replace(':', ".");

    while slots.iter().filter_map(Slot::name).any(|taken| taken == name) {
        name = next_duplicate_name(&name);
    }
    name
}

/// `"Synth"` -> `"Synth (2)"`, `"Synth (2)"` -> `"Synth (3)"`.
fn next_duplicate_name(name: &str) -> String {
    if let Some((stem, number)) = name
        .strip_suffix(')')
        .and_then(|inner| inner.rsplit_once(" ("))
    {
        if (1..=2).contains(&number.len()) && number.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(number) = number.parse::<u32>() {
                return format!("{stem} ({})", number + 1);
            }
        }
    }
    format!("{name} (2)")
}
