//! Host notification sink.
//!
//! Notifications are fire-and-forget: the engine never waits for the host to
//! acknowledge one. They are only emitted from control threads; the audio
//! thread records post events that are dispatched here later.

use crate::{ParameterTarget, PluginId};
use crossbeam_channel::{unbounded, Receiver, Sender};

/// A structured notification for the host.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackEvent {
    Debug {
        plugin_id: PluginId,
        message: String,
    },
    PluginAdded {
        plugin_id: PluginId,
        name: String,
    },
    PluginRemoved {
        plugin_id: PluginId,
    },
    ParameterChanged {
        plugin_id: PluginId,
        target: ParameterTarget,
        value: f64,
    },
    /// The current MIDI program changed.
    ProgramChanged {
        plugin_id: PluginId,
        index: usize,
    },
    NoteOn {
        plugin_id: PluginId,
        channel: u8,
        note: u8,
        velocity: u8,
    },
    NoteOff {
        plugin_id: PluginId,
        channel: u8,
        note: u8,
    },
    ReloadPrograms {
        plugin_id: PluginId,
    },
    ReloadAll {
        plugin_id: PluginId,
    },
    PeaksUpdated {
        plugin_id: PluginId,
        input: [f32; 2],
        output: [f32; 2],
    },
}

/// Receives engine notifications.
pub trait HostCallback: Send + Sync {
    fn on_event(&self, event: CallbackEvent);
}

impl<F> HostCallback for F
where
    F: Fn(CallbackEvent) + Send + Sync,
{
    fn on_event(&self, event: CallbackEvent) {
        self(event)
    }
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCallback;

impl HostCallback for NullCallback {
    fn on_event(&self, _event: CallbackEvent) {}
}

/// Forwards notifications into a channel the host drains at its own pace.
#[derive(Debug, Clone)]
pub struct ChannelCallback {
    sender: Sender<CallbackEvent>,
}

impl ChannelCallback {
    pub fn new() -> (Self, Receiver<CallbackEvent>) {
        let (sender, receiver) = unbounded();
        (Self { sender }, receiver)
    }
}

impl HostCallback for ChannelCallback {
    fn on_event(&self, event: CallbackEvent) {
        // The host dropping its receiver is not an engine error.
        let _ = self.sender.send(event);
    }
}
