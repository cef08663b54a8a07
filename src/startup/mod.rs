//! Startup initialization and ensure mechanism.
//!
//! Resolves nothing on its own: callers build a [`crate::config::DojoConfig`]
//! first, then hand it to [`StartupContext`], which runs the enabled checks in
//! order and fails fast with a [`crate::error::StartupError`].

mod ensure;

pub use ensure::{EnsureStatus, StartupContext, StartupState};
