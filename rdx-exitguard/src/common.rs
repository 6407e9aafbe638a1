//! Contains common, primitive types shared across the crate.
//!
//! This module defines the key type used to identify hooks stored in a
//! [`HookTable`](crate::hooks::HookTable) and the exit status every watcher
//! reports when its condition is met.

use slotmap::new_key_type;

/// Status handed to [`Terminate`](crate::terminate::Terminate) when an exit
/// condition fires. Reaching a limit is a normal, successful outcome.
pub const EXIT_SUCCESS: i32 = 0;

new_key_type! {
    /// Uniquely identifies a hook registered in a `HookTable`.
    ///
    /// Keys are never reused, so registering the same watcher twice yields
    /// two distinct ids and two independent callbacks.
    pub struct HookId;
}
