//! Startup configuration and preflight checks for LeanDojo.
//!
//! Typical use:
//! ```ignore
//! let config = DojoConfig::from_env()?;
//! logging::init(logging::level_from_env(&std::env::vars().collect()));
//! let state = StartupContext::new(config, Preflight::system())
//!     .ensure_all()
//!     .await?;
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod github;
pub mod logging;
pub mod preflight;
pub mod runtime;
pub mod startup;
pub mod version;

pub use config::DojoConfig;
pub use error::StartupError;
pub use startup::{StartupContext, StartupState};
