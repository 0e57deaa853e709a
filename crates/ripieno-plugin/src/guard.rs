//! Scoped exclusion of a plugin from processing.

use crate::plugin::{Plugin, RtState};
use parking_lot::MutexGuard;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU32, Ordering};

/// Holds a plugin out of the process cycle while alive.
///
/// Creating the guard first marks the plugin disabled, so a cycle already in
/// flight bails out at its next check, then waits for that cycle to release
/// the processing state. Dropping it releases the state and lifts the mark.
/// Guards may be taken from several threads at once; the plugin stays
/// disabled until the last one is gone.
pub struct ScopedDisabler<'a> {
    // Field order is drop order: the state is released before the mark lifts.
    rt: MutexGuard<'a, RtState>,
    _mark: DisableMark<'a>,
}

struct DisableMark<'a>(&'a AtomicU32);

impl Drop for DisableMark<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl<'a> ScopedDisabler<'a> {
    pub(crate) fn new(plugin: &'a Plugin) -> Self {
        let disablers = &plugin.controls.disablers;
        disablers.fetch_add(1, Ordering::AcqRel);
        let mark = DisableMark(disablers);
        let rt = plugin.rt.lock();
        Self { rt, _mark: mark }
    }
}

impl Deref for ScopedDisabler<'_> {
    type Target = RtState;

    fn deref(&self) -> &RtState {
        &self.rt
    }
}

impl DerefMut for ScopedDisabler<'_> {
    fn deref_mut(&mut self) -> &mut RtState {
        &mut self.rt
    }
}
