//! Contains the watchers that implement each exit condition.
//!
//! Every watcher is a small owned struct implementing [`Hook`](crate::hooks::Hook).
//! Its state is private and only changes when its own event fires.

pub mod watcher;
