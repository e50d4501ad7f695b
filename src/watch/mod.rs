// src/watch/mod.rs

//! Watch coordinator.
//!
//! - [`patterns`] compiles `[[watch]]` bindings (path globs -> task or reload).
//! - [`watcher`] wires up `notify` and forwards matching changes as
//!   `RuntimeEvent`s.
//! - [`session`] is the `watching` task tying the watcher, the engine
//!   runtime and the dev server together.
//!
//! Bindings never debounce: every matching change dispatches a run, even
//! while an earlier run of the same task is still going.

pub mod event_handler;
pub mod path_utils;
pub mod patterns;
pub mod session;
pub mod watcher;

pub use event_handler::events_for_path;
pub use patterns::{actions_for, build_bindings, check_binding_tasks, WatchAction, WatchBinding};
pub use session::WatchSession;
pub use watcher::{spawn_watcher, WatcherHandle};
