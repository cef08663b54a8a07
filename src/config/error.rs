use thiserror::Error;

/// Failure to turn the environment into a [`super::DojoConfig`].
///
/// A variable that is present but malformed is always an error; defaults only
/// apply when the variable is absent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: expected {expected}. Fix or unset {var}.")]
    Parse {
        var: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{var}={value} is out of range: {reason}. Fix or unset {var}.")]
    OutOfRange {
        var: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Could not determine home directory. Set CACHE_DIR explicitly.")]
    NoHomeDir,
}
