//! Remote-control messages.
//!
//! The transport (OSC or anything else) lives outside the engine. Inbound
//! requests are applied by the engine's idle loop; outbound notifications go
//! through [`RemoteControl`].

use ripieno_core::{ParameterTarget, PluginId};
use serde::{Deserialize, Serialize};

/// A change requested by a remote controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RemoteRequest {
    SetActive { plugin_id: PluginId, active: bool },
    SetDryWet { plugin_id: PluginId, value: f64 },
    SetVolume { plugin_id: PluginId, value: f64 },
    SetBalanceLeft { plugin_id: PluginId, value: f64 },
    SetBalanceRight { plugin_id: PluginId, value: f64 },
    SetParameterValue { plugin_id: PluginId, index: u32, value: f64 },
    SetParameterMidiChannel { plugin_id: PluginId, index: u32, channel: u8 },
    SetParameterMidiCc { plugin_id: PluginId, index: u32, cc: i16 },
    SetMidiProgram { plugin_id: PluginId, index: u32 },
    NoteOn { plugin_id: PluginId, channel: u8, note: u8, velocity: u8 },
    NoteOff { plugin_id: PluginId, channel: u8, note: u8 },
    RemovePlugin { plugin_id: PluginId },
}

impl RemoteRequest {
    pub fn plugin_id(&self) -> PluginId {
        match *self {
            RemoteRequest::SetActive { plugin_id, .. }
            | RemoteRequest::SetDryWet { plugin_id, .. }
            | RemoteRequest::SetVolume { plugin_id, .. }
            | RemoteRequest::SetBalanceLeft { plugin_id, .. }
            | RemoteRequest::SetBalanceRight { plugin_id, .. }
            | RemoteRequest::SetParameterValue { plugin_id, .. }
            | RemoteRequest::SetParameterMidiChannel { plugin_id, .. }
            | RemoteRequest::SetParameterMidiCc { plugin_id, .. }
            | RemoteRequest::SetMidiProgram { plugin_id, .. }
            | RemoteRequest::NoteOn { plugin_id, .. }
            | RemoteRequest::NoteOff { plugin_id, .. }
            | RemoteRequest::RemovePlugin { plugin_id } => plugin_id,
        }
    }
}

/// A state change reported to remote controllers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RemoteNotification {
    ParameterChanged {
        plugin_id: PluginId,
        target: ParameterTarget,
        value: f64,
    },
    ProgramChanged { plugin_id: PluginId, index: usize },
    NoteOn { plugin_id: PluginId, channel: u8, note: u8, velocity: u8 },
    NoteOff { plugin_id: PluginId, channel: u8, note: u8 },
    PluginRemoved { plugin_id: PluginId },
}

/// Outbound side of the remote-control channel.
pub trait RemoteControl: Send + Sync {
    fn send(&self, notification: RemoteNotification);
}

impl<F> RemoteControl for F
where
    F: Fn(RemoteNotification) + Send + Sync,
{
    fn send(&self, notification: RemoteNotification) {
        self(notification)
    }
}

/// Drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRemote;

impl RemoteControl for NullRemote {
    fn send(&self, _notification: RemoteNotification) {}
}
