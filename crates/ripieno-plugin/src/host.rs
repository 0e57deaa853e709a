//! Engine-wide state shared by every plugin.

use crate::remote::{NullRemote, RemoteControl};
use parking_lot::{Mutex, MutexGuard};
use ripieno_core::{EngineConfig, HostCallback, NullCallback, PeakMeters};
use std::sync::Arc;

/// Configuration, notification sinks and locks owned by the engine.
pub struct HostContext {
    config: EngineConfig,
    process_lock: Mutex<()>,
    callback: Arc<dyn HostCallback>,
    remote: Arc<dyn RemoteControl>,
    peaks: PeakMeters,
    last_error: Mutex<String>,
}

impl HostContext {
    pub fn new(
        config: EngineConfig,
        callback: Arc<dyn HostCallback>,
        remote: Arc<dyn RemoteControl>,
    ) -> Self {
        let peaks = PeakMeters::new(config.max_plugins as usize);
        Self {
            config,
            process_lock: Mutex::new(()),
            callback,
            remote,
            peaks,
            last_error: Mutex::new(String::new()),
        }
    }

    /// A context with no-op sinks, for standalone plugins and tests.
    pub fn standalone(config: EngineConfig) -> Self {
        Self::new(config, Arc::new(NullCallback), Arc::new(NullRemote))
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn is_offline(&self) -> bool {
        self.config.offline
    }

    /// Full-engine exclusion used for offline rendering and offline edits.
    pub fn lock_process(&self) -> MutexGuard<'_, ()> {
        self.process_lock.lock()
    }

    #[inline]
    pub fn callback(&self) -> &dyn HostCallback {
        self.callback.as_ref()
    }

    #[inline]
    pub fn remote(&self) -> &dyn RemoteControl {
        self.remote.as_ref()
    }

    #[inline]
    pub fn peaks(&self) -> &PeakMeters {
        &self.peaks
    }

    pub fn last_error(&self) -> String {
        self.last_error.lock().clone()
    }

    pub fn set_last_error(&self, error: impl Into<String>) {
        *self.last_error.lock() = error.into();
    }
}
