//! Log sink setup.
//!
//! Kept apart from configuration resolution: callers decide the level with
//! [`level_from_env`] (or a CLI flag) and then call [`init`] once.

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{vars, EnvMap};

/// DEBUG when `VERBOSE` or `DEBUG` is present (any value), INFO otherwise.
pub fn level_from_env(env: &EnvMap) -> Level {
    if env.contains_key(vars::VERBOSE) || env.contains_key(vars::DEBUG) {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Install the stderr subscriber.
///
/// Returns `false` if a global subscriber was already installed, in which case
/// the existing one is left alone.
pub fn init(level: Level) -> bool {
    let filter = if level == Level::DEBUG {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
