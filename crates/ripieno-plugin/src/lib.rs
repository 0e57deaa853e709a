//! Plugin layer for the ripieno host.
//!
//! Wraps plugin technologies behind one [`PluginAdapter`] contract and runs
//! them through a real-time process cycle.
//!
//! # Components
//!
//! - **Registry**: ports, parameters and MIDI programs of one instance
//! - **Adapters**: SoundFont synthesizer (feature: `soundfont`) and built-in
//!   native plugins
//! - **Event translation**: control events and driver MIDI into adapter calls
//! - **Process cycle**: [`Plugin::process`], lock-free on the audio thread
//! - **Disable guard**: [`ScopedDisabler`] for reconfiguring a live plugin
//!
//! # Example
//!
//! ```ignore
//! use ripieno_plugin::{native_plugin, HostContext, Notify, Plugin, ProcessContext};
//!
//! let host = Arc::new(HostContext::standalone(EngineConfig::default()));
//! let plugin = Plugin::new(0, "Bypass", host, Box::new(native_plugin("bypass")?));
//! plugin.set_active(true, Notify::NONE);
//! plugin.process(&[&input], &mut [&mut output], ProcessContext::new(512));
//! ```

// Error types
pub mod error;
pub use error::{LoadStage, PluginError, Result};

// Registry
pub mod registry;
pub use registry::{MidiProgram, Parameter, ParameterInfo, Parameters, Port, PortType, Registry};

// Adapter contract
pub mod adapter;
pub use adapter::{PluginAdapter, PluginCategory, PluginInfo, PluginKind, PluginLayout};

// Host-side collaborators
mod host;
pub use host::HostContext;

pub mod remote;
pub use remote::{NullRemote, RemoteControl, RemoteNotification, RemoteRequest};

pub mod ui;
pub use ui::PluginUi;

mod post_event;
pub use post_event::{Notify, PostEvent, MAX_POST_EVENTS};

// Instance, guard, translation and process cycle
mod guard;
pub use guard::ScopedDisabler;

mod plugin;
pub use plugin::{Plugin, RtState};

pub mod translator;
pub use translator::{balance_from_pan, volume_from_cc};

mod process;
pub use process::{ProcessContext, ProcessStatus};

// Plugin families
pub mod native;
pub use native::{native_descriptor, native_plugin, NativeAdapter, NATIVE_PLUGINS};

pub mod sf2;
pub use sf2::{Sf2Adapter, SoundFontEngine};
#[cfg(feature = "soundfont")]
pub use sf2::{load_sf2, RustySynthEngine, SoundFontCache};
