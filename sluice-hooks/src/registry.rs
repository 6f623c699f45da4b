//! Callback storage keyed by hook type and priority.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::RwLock;

use tracing::warn;

use crate::types::HookFn;
use crate::types::HookType;
use crate::types::Priority;

/// Registry of hook callbacks.
///
/// Each (hook type, priority) slot holds at most one callback. The registry
/// is shared behind an `Arc` between the host, the plugin loader, and the
/// dispatcher; a running chain operates on a snapshot taken at entry, so the
/// registry stays mutable while chains are in flight.
#[derive(Default)]
pub struct HookRegistry {
    hooks: RwLock<HashMap<HookType, BTreeMap<Priority, HookFn>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the callback at `(hook_type, priority)`.
    ///
    /// Replacing an existing registration is not an error, but it is logged:
    /// two plugins binding the same slot is almost always a configuration
    /// mistake.
    pub fn add(&self, hook_type: HookType, priority: Priority, hook: HookFn) {
        let mut hooks = self.hooks.write().unwrap();
        if hooks.entry(hook_type).or_default().insert(priority, hook).is_some() {
            warn!(hook_type = %hook_type, priority, "hook replaced");
        }
    }

    /// The callbacks registered for one hook type, keyed by priority.
    ///
    /// Returns a snapshot: later registry mutations are not reflected in the
    /// returned map.
    pub fn get(&self, hook_type: HookType) -> BTreeMap<Priority, HookFn> {
        self.hooks
            .read()
            .unwrap()
            .get(&hook_type)
            .cloned()
            .unwrap_or_default()
    }

    /// A full snapshot of every registration, for diagnostics and tests.
    pub fn hooks(&self) -> HashMap<HookType, BTreeMap<Priority, HookFn>> {
        self.hooks.read().unwrap().clone()
    }

    /// Whether any callback is registered for `hook_type`.
    pub fn has_hooks(&self, hook_type: HookType) -> bool {
        self.hooks
            .read()
            .unwrap()
            .get(&hook_type)
            .is_some_and(|slot| !slot.is_empty())
    }

    /// Total number of registrations across all hook types.
    pub fn len(&self) -> usize {
        self.hooks.read().unwrap().values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ascending-priority snapshot of one slot for the dispatch loop.
    pub(crate) fn snapshot(&self, hook_type: HookType) -> Vec<(Priority, HookFn)> {
        self.hooks
            .read()
            .unwrap()
            .get(&hook_type)
            .map(|slot| {
                slot.iter()
                    .map(|(priority, hook)| (*priority, hook.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Delete the registration at `(hook_type, priority)`, if any.
    ///
    /// Deletion acts by key, not identity: a callback re-added at the same
    /// priority after a removal was scheduled is deleted all the same.
    pub(crate) fn remove(&self, hook_type: HookType, priority: Priority) {
        let mut hooks = self.hooks.write().unwrap();
        if let Some(slot) = hooks.get_mut(&hook_type) {
            slot.remove(&priority);
            if slot.is_empty() {
                hooks.remove(&hook_type);
            }
        }
    }
}
