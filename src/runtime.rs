//! Process-lifetime holder for the validated startup state.
//!
//! Nothing is stored here implicitly: the orchestration layer calls
//! [`set_runtime`] after [`crate::startup::StartupContext::ensure_all`]
//! succeeds, and later code reads it back with [`get_runtime`]. Library users
//! that prefer to pass [`StartupState`] around explicitly can ignore this
//! module entirely.

use std::sync::OnceLock;

use crate::config::DojoConfig;
use crate::github::RepoClient;
use crate::startup::StartupState;

/// Global runtime singleton.
static RUNTIME: OnceLock<StartupState> = OnceLock::new();

/// Publish the startup state for the rest of the process.
///
/// Subsequent calls are ignored and the first state is kept.
pub fn set_runtime(state: StartupState) {
    if RUNTIME.set(state).is_err() {
        tracing::warn!(
            "Attempting to set runtime when one is already configured. Keeping existing."
        );
    }
}

/// Returns `None` if `set_runtime()` hasn't been called yet.
pub fn get_runtime() -> Option<&'static StartupState> {
    RUNTIME.get()
}

/// The published configuration
pub fn get_config() -> Option<&'static DojoConfig> {
    RUNTIME.get().map(|rt| &rt.config)
}

/// The published GitHub client, if the GitHub step ran
pub fn get_repos() -> Option<&'static RepoClient> {
    RUNTIME.get().and_then(|rt| rt.repos.as_ref())
}
