//! The hook registry contract and an in-process implementation of it.
//!
//! Watchers never talk to a scheduler directly. They are boxed as [`Hook`]s
//! and handed to whatever [`HookRegistry`] the scheduler exposes; the
//! registry decides when to invoke them.

use crate::common::HookId;
use crate::events::HookEvent;
use slotmap::SlotMap;
use std::collections::HashMap;
use tracing::{debug, trace};

/// A callback subscribed to a lifecycle event.
///
/// `task` is the task the event is about. An `Err` is passed straight back
/// to whoever fired the event.
pub trait Hook<T>: Send {
    fn on_event(&mut self, task: &T) -> anyhow::Result<()>;

    /// Short label used in logs and for inspecting a registry.
    fn name(&self) -> &'static str {
        "hook"
    }
}

impl<T, F> Hook<T> for F
where
    F: FnMut(&T) -> anyhow::Result<()> + Send,
{
    fn on_event(&mut self, task: &T) -> anyhow::Result<()> {
        self(task)
    }
}

/// The one operation exit checks need from a scheduler's hook registry.
///
/// Ownership of the hook moves into the registry, which may invoke it any
/// number of times for the rest of the process. Hooks registered for the
/// same event are expected to run in registration order.
pub trait HookRegistry<T> {
    fn register_hook(&mut self, event: HookEvent, hook: Box<dyn Hook<T>>);
}

/// An in-process hook registry.
///
/// Hooks are kept per event in registration order. There is no
/// de-duplication and no way to remove a hook once registered.
pub struct HookTable<T> {
    hooks: SlotMap<HookId, Box<dyn Hook<T>>>,
    order: HashMap<HookEvent, Vec<HookId>>,
}

impl<T> HookTable<T> {
    pub fn new() -> Self {
        Self {
            hooks: SlotMap::with_key(),
            order: HashMap::new(),
        }
    }

    /// Invokes every hook registered for `event`, in registration order.
    ///
    /// Stops at the first hook that fails and returns its error; later hooks
    /// for the same event are not run.
    pub fn fire(&mut self, event: HookEvent, task: &T) -> anyhow::Result<()> {
        let Some(ids) = self.order.get(&event) else {
            return Ok(());
        };
        trace!(%event, hooks = ids.len(), "Firing event.");
        for id in ids {
            if let Some(hook) = self.hooks.get_mut(*id) {
                hook.on_event(task)?;
            }
        }
        Ok(())
    }

    /// Number of hooks registered for `event`.
    pub fn count(&self, event: HookEvent) -> usize {
        self.order.get(&event).map_or(0, Vec::len)
    }

    /// Names of the hooks registered for `event`, in registration order.
    pub fn names(&self, event: HookEvent) -> Vec<&'static str> {
        self.order
            .get(&event)
            .into_iter()
            .flatten()
            .filter_map(|id| self.hooks.get(*id))
            .map(|hook| hook.name())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl<T> Default for HookTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HookRegistry<T> for HookTable<T> {
    fn register_hook(&mut self, event: HookEvent, hook: Box<dyn Hook<T>>) {
        let name = hook.name();
        let id = self.hooks.insert(hook);
        self.order.entry(event).or_default().push(id);
        debug!(%event, hook = name, ?id, "Hook registered.");
    }
}
