//! Environment-driven configuration.
//!
//! [`DojoConfig::resolve`] is a pure function of an environment map, the home
//! directory and the detected CPU count, so every field can be tested without
//! touching the real process environment. [`DojoConfig::from_env`] gathers
//! those inputs from the running process.

mod error;
mod memory;

pub use error::ConfigError;
pub use memory::MemoryLimit;

use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::constants::{
    CACHE_DIR_NAME, DEFAULT_GITHUB_TIMEOUT_SECS, DEFAULT_TACTIC_CPU_LIMIT,
    DEFAULT_TACTIC_MEMORY_LIMIT, DEFAULT_TACTIC_TIMEOUT_MS, GITHUB_API_URL, MAX_NUM_PROCS,
    MIN_LEAN3_VERSION, REMOTE_CACHE_URL,
};
use crate::version::Version;

/// Environment variable names
pub mod vars {
    pub const CACHE_DIR: &str = "CACHE_DIR";
    pub const TMP_DIR: &str = "TMP_DIR";
    pub const NUM_PROCS: &str = "NUM_PROCS";
    pub const DISABLE_REMOTE_CACHE: &str = "DISABLE_REMOTE_CACHE";
    pub const LOAD_USED_DEPS_ONLY: &str = "LOAD_USED_DEPS_ONLY";
    pub const TACTIC_TIMEOUT: &str = "TACTIC_TIMEOUT";
    pub const TACTIC_CPU_LIMIT: &str = "TACTIC_CPU_LIMIT";
    pub const TACTIC_MEMORY_LIMIT: &str = "TACTIC_MEMORY_LIMIT";
    pub const CONTAINER: &str = "CONTAINER";
    pub const GITHUB_ACCESS_TOKEN: &str = "GITHUB_ACCESS_TOKEN";
    pub const GITHUB_API_URL: &str = "GITHUB_API_URL";
    pub const GITHUB_API_TIMEOUT: &str = "GITHUB_API_TIMEOUT";
    pub const VERBOSE: &str = "VERBOSE";
    pub const DEBUG: &str = "DEBUG";

    /// Every variable this crate reads
    pub const ALL: &[&str] = &[
        CACHE_DIR,
        TMP_DIR,
        NUM_PROCS,
        DISABLE_REMOTE_CACHE,
        LOAD_USED_DEPS_ONLY,
        TACTIC_TIMEOUT,
        TACTIC_CPU_LIMIT,
        TACTIC_MEMORY_LIMIT,
        CONTAINER,
        GITHUB_ACCESS_TOKEN,
        GITHUB_API_URL,
        GITHUB_API_TIMEOUT,
        VERBOSE,
        DEBUG,
    ];
}

/// Snapshot of the process environment used for resolution.
pub type EnvMap = HashMap<String, String>;

/// Snapshot the current process environment.
pub fn env_snapshot() -> std::result::Result<EnvMap, ConfigError> {
    env_from_os(std::env::vars_os())
}

/// Build an [`EnvMap`] from raw OS strings.
///
/// Entries that are not valid UTF-8 are dropped unless they name a variable in
/// [`vars::ALL`], in which case the value is reported as unparseable.
pub fn env_from_os<I>(entries: I) -> std::result::Result<EnvMap, ConfigError>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut env = EnvMap::new();
    for (key, value) in entries {
        let Ok(key) = key.into_string() else {
            continue;
        };
        match value.into_string() {
            Ok(value) => {
                env.insert(key, value);
            }
            Err(raw) => {
                if let Some(var) = vars::ALL.iter().copied().find(|v| *v == key) {
                    return Err(ConfigError::Parse {
                        var,
                        value: raw.to_string_lossy().into_owned(),
                        expected: "valid UTF-8",
                    });
                }
            }
        }
    }
    Ok(env)
}

/// Where Lean code is executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerMode {
    #[default]
    Docker,
    Native,
}

impl ContainerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerMode::Docker => "docker",
            ContainerMode::Native => "native",
        }
    }
}

impl FromStr for ContainerMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "docker" => Ok(ContainerMode::Docker),
            "native" => Ok(ContainerMode::Native),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ContainerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved runtime configuration.
///
/// Built once at startup and passed by reference to whatever needs it; nothing
/// mutates it afterwards.
#[derive(Clone, Serialize)]
pub struct DojoConfig {
    pub cache_dir: PathBuf,
    pub remote_cache_url: String,
    pub disable_remote_cache: bool,
    pub tmp_dir: Option<PathBuf>,
    pub max_num_procs: usize,
    pub num_procs: usize,
    pub num_workers: usize,
    pub load_used_deps_only: bool,
    pub tactic_timeout_ms: u64,
    pub tactic_cpu_limit: u32,
    pub tactic_memory_limit: MemoryLimit,
    pub container_mode: ContainerMode,
    pub min_lean3_version: Version,
    #[serde(skip)]
    pub github_token: Option<String>,
    pub github_api_url: String,
    pub github_timeout_secs: u64,
}

impl DojoConfig {
    /// Resolve configuration from the current process environment.
    pub fn from_env() -> std::result::Result<Self, ConfigError> {
        Self::from_env_map(&env_snapshot()?)
    }

    /// Resolve configuration from an environment snapshot, using the real home
    /// directory and CPU count.
    pub fn from_env_map(env: &EnvMap) -> std::result::Result<Self, ConfigError> {
        let home = dirs::home_dir();
        let cpu_count = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::resolve(env, home.as_deref(), cpu_count)
    }

    /// Resolve configuration from explicit inputs.
    pub fn resolve(
        env: &EnvMap,
        home: Option<&Path>,
        cpu_count: usize,
    ) -> std::result::Result<Self, ConfigError> {
        let cache_dir = match env.get(vars::CACHE_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => home
                .ok_or(ConfigError::NoHomeDir)?
                .join(".cache")
                .join(CACHE_DIR_NAME),
        };

        let tmp_dir = env.get(vars::TMP_DIR).map(PathBuf::from);

        let num_procs = match env.get(vars::NUM_PROCS) {
            Some(raw) => parse_positive(vars::NUM_PROCS, raw, "a positive integer")?,
            None => cpu_count.clamp(1, MAX_NUM_PROCS),
        };

        let tactic_timeout_ms = match env.get(vars::TACTIC_TIMEOUT) {
            Some(raw) => parse_positive(vars::TACTIC_TIMEOUT, raw, "milliseconds as an integer")?,
            None => DEFAULT_TACTIC_TIMEOUT_MS,
        };

        let tactic_cpu_limit = match env.get(vars::TACTIC_CPU_LIMIT) {
            Some(raw) => parse_positive(vars::TACTIC_CPU_LIMIT, raw, "a positive integer")?,
            None => DEFAULT_TACTIC_CPU_LIMIT,
        };

        let memory_raw = env
            .get(vars::TACTIC_MEMORY_LIMIT)
            .map(String::as_str)
            .unwrap_or(DEFAULT_TACTIC_MEMORY_LIMIT);
        let tactic_memory_limit =
            memory_raw
                .parse::<MemoryLimit>()
                .map_err(|_| ConfigError::Parse {
                    var: vars::TACTIC_MEMORY_LIMIT,
                    value: memory_raw.to_string(),
                    expected: "a size like 16g, 512m, 64k or a byte count",
                })?;

        let container_mode = match env.get(vars::CONTAINER) {
            Some(raw) => raw.parse::<ContainerMode>().map_err(|_| ConfigError::Parse {
                var: vars::CONTAINER,
                value: raw.clone(),
                expected: "'docker' or 'native'",
            })?,
            None => ContainerMode::default(),
        };

        let github_token = env
            .get(vars::GITHUB_ACCESS_TOKEN)
            .filter(|token| !token.is_empty())
            .cloned();

        let github_api_url = match env.get(vars::GITHUB_API_URL) {
            Some(raw) => {
                url::Url::parse(raw).map_err(|_| ConfigError::Parse {
                    var: vars::GITHUB_API_URL,
                    value: raw.clone(),
                    expected: "an absolute URL such as https://api.github.com",
                })?;
                raw.trim_end_matches('/').to_string()
            }
            None => GITHUB_API_URL.to_string(),
        };

        let github_timeout_secs = match env.get(vars::GITHUB_API_TIMEOUT) {
            Some(raw) => parse_positive(vars::GITHUB_API_TIMEOUT, raw, "seconds as an integer")?,
            None => DEFAULT_GITHUB_TIMEOUT_SECS,
        };

        Ok(Self {
            cache_dir,
            remote_cache_url: REMOTE_CACHE_URL.to_string(),
            disable_remote_cache: env.contains_key(vars::DISABLE_REMOTE_CACHE),
            tmp_dir,
            max_num_procs: MAX_NUM_PROCS,
            num_procs,
            num_workers: num_procs - 1,
            load_used_deps_only: env.contains_key(vars::LOAD_USED_DEPS_ONLY),
            tactic_timeout_ms,
            tactic_cpu_limit,
            tactic_memory_limit,
            container_mode,
            min_lean3_version: MIN_LEAN3_VERSION,
            github_token,
            github_api_url,
            github_timeout_secs,
        })
    }

    /// Whether a GitHub token was supplied
    pub fn has_github_token(&self) -> bool {
        self.github_token.is_some()
    }

    /// Create the cache directory and check that the temp directory, if set,
    /// accepts new files.
    pub fn prepare_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.cache_dir).with_context(|| {
            format!(
                "Failed to create cache directory {:?}. Set CACHE_DIR to a writable location.",
                self.cache_dir
            )
        })?;
        debug!("Cache directory: {:?}", self.cache_dir);

        if let Some(tmp_dir) = &self.tmp_dir {
            tempfile::tempfile_in(tmp_dir).with_context(|| {
                format!(
                    "Temporary directory {:?} is not writable. Fix permissions or unset TMP_DIR.",
                    tmp_dir
                )
            })?;
            debug!("Temporary directory: {:?}", tmp_dir);
        }

        Ok(())
    }
}

impl fmt::Debug for DojoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DojoConfig")
            .field("cache_dir", &self.cache_dir)
            .field("remote_cache_url", &self.remote_cache_url)
            .field("disable_remote_cache", &self.disable_remote_cache)
            .field("tmp_dir", &self.tmp_dir)
            .field("max_num_procs", &self.max_num_procs)
            .field("num_procs", &self.num_procs)
            .field("num_workers", &self.num_workers)
            .field("load_used_deps_only", &self.load_used_deps_only)
            .field("tactic_timeout_ms", &self.tactic_timeout_ms)
            .field("tactic_cpu_limit", &self.tactic_cpu_limit)
            .field("tactic_memory_limit", &self.tactic_memory_limit)
            .field("container_mode", &self.container_mode)
            .field("min_lean3_version", &self.min_lean3_version)
            .field(
                "github_token",
                &self.github_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("github_api_url", &self.github_api_url)
            .field("github_timeout_secs", &self.github_timeout_secs)
            .finish()
    }
}

fn parse_positive<T>(
    var: &'static str,
    raw: &str,
    expected: &'static str,
) -> std::result::Result<T, ConfigError>
where
    T: FromStr + Default + PartialEq,
{
    let value: T = raw.trim().parse().map_err(|_| ConfigError::Parse {
        var,
        value: raw.to_string(),
        expected,
    })?;

    if value == T::default() {
        return Err(ConfigError::OutOfRange {
            var,
            value: raw.to_string(),
            reason: "must be at least 1",
        });
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> EnvMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn resolve(pairs: &[(&str, &str)]) -> std::result::Result<DojoConfig, ConfigError> {
        DojoConfig::resolve(&env(pairs), Some(Path::new("/home/lean")), 8)
    }

    #[test]
    fn test_defaults() {
        let config = resolve(&[]).unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("/home/lean/.cache/lean_dojo"));
        assert_eq!(config.remote_cache_url, "https://lean-dojo.s3.amazonaws.com");
        assert!(!config.disable_remote_cache);
        assert_eq!(config.tmp_dir, None);
        assert_eq!(config.max_num_procs, 32);
        assert_eq!(config.num_procs, 8);
        assert_eq!(config.num_workers, 7);
        assert!(!config.load_used_deps_only);
        assert_eq!(config.tactic_timeout_ms, 5000);
        assert_eq!(config.tactic_cpu_limit, 1);
        assert_eq!(config.tactic_memory_limit.as_str(), "16g");
        assert_eq!(config.container_mode, ContainerMode::Docker);
        assert_eq!(config.min_lean3_version, Version::new(3, 42, 1));
        assert_eq!(config.github_token, None);
        assert_eq!(config.github_api_url, "https://api.github.com");
        assert_eq!(config.github_timeout_secs, 30);
    }

    #[test]
    fn test_cache_dir_override_is_verbatim() {
        let config = resolve(&[("CACHE_DIR", "/x")]).unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("/x"));

        let config = resolve(&[("CACHE_DIR", "relative/dir/")]).unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("relative/dir/"));
    }

    #[test]
    fn test_cache_dir_requires_home_without_override() {
        let err = DojoConfig::resolve(&env(&[]), None, 4).unwrap_err();
        assert_eq!(err, ConfigError::NoHomeDir);

        let config = DojoConfig::resolve(&env(&[("CACHE_DIR", "/x")]), None, 4).unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("/x"));
    }

    #[test]
    fn test_tmp_dir_override() {
        let config = resolve(&[("TMP_DIR", "/scratch")]).unwrap();
        assert_eq!(config.tmp_dir, Some(PathBuf::from("/scratch")));
    }

    #[test]
    fn test_num_procs_override() {
        for v in [1usize, 2, 7, 32, 64] {
            let raw = v.to_string();
            let config = resolve(&[("NUM_PROCS", raw.as_str())]).unwrap();
            assert_eq!(config.num_procs, v);
            assert_eq!(config.num_workers, v - 1);
        }
    }

    #[test]
    fn test_num_procs_default_is_capped() {
        let vars = env(&[]);
        let home = Some(Path::new("/home/lean"));
        for (cpus, expected) in [(0usize, 1usize), (1, 1), (4, 4), (32, 32), (128, 32)] {
            let config = DojoConfig::resolve(&vars, home, cpus).unwrap();
            assert_eq!(config.num_procs, expected, "cpu_count = {}", cpus);
            assert!(config.num_procs >= 1);
        }
    }

    #[test]
    fn test_num_procs_rejects_bad_values() {
        let err = resolve(&[("NUM_PROCS", "many")]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { var: "NUM_PROCS", .. }));

        let err = resolve(&[("NUM_PROCS", "-2")]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { var: "NUM_PROCS", .. }));

        let err = resolve(&[("NUM_PROCS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { var: "NUM_PROCS", .. }));
    }

    #[test]
    fn test_presence_flags_ignore_value() {
        let config = resolve(&[("DISABLE_REMOTE_CACHE", "")]).unwrap();
        assert!(config.disable_remote_cache);

        let config = resolve(&[("DISABLE_REMOTE_CACHE", "0")]).unwrap();
        assert!(config.disable_remote_cache);

        let config = resolve(&[("LOAD_USED_DEPS_ONLY", "false")]).unwrap();
        assert!(config.load_used_deps_only);
        assert!(!config.disable_remote_cache);
    }

    #[test]
    fn test_tactic_overrides() {
        let config = resolve(&[
            ("TACTIC_TIMEOUT", "12000"),
            ("TACTIC_CPU_LIMIT", "4"),
            ("TACTIC_MEMORY_LIMIT", "8G"),
        ])
        .unwrap();
        assert_eq!(config.tactic_timeout_ms, 12000);
        assert_eq!(config.tactic_cpu_limit, 4);
        assert_eq!(config.tactic_memory_limit.as_str(), "8G");
    }

    #[test]
    fn test_tactic_overrides_reject_bad_values() {
        let err = resolve(&[("TACTIC_TIMEOUT", "5s")]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { var: "TACTIC_TIMEOUT", .. }));

        let err = resolve(&[("TACTIC_CPU_LIMIT", "")]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { var: "TACTIC_CPU_LIMIT", .. }));

        let err = resolve(&[("TACTIC_MEMORY_LIMIT", "lots")]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { var: "TACTIC_MEMORY_LIMIT", .. }));
    }

    #[test]
    fn test_container_mode() {
        let config = resolve(&[("CONTAINER", "native")]).unwrap();
        assert_eq!(config.container_mode, ContainerMode::Native);

        let config = resolve(&[("CONTAINER", "Docker")]).unwrap();
        assert_eq!(config.container_mode, ContainerMode::Docker);

        let err = resolve(&[("CONTAINER", "podman")]).unwrap_err();
        assert!(err.to_string().contains("'docker' or 'native'"));
    }

    #[test]
    fn test_github_settings() {
        let config = resolve(&[("GITHUB_ACCESS_TOKEN", "")]).unwrap();
        assert!(!config.has_github_token());

        let config = resolve(&[
            ("GITHUB_ACCESS_TOKEN", "ghp_secret"),
            ("GITHUB_API_URL", "https://ghe.example.com/api/v3/"),
            ("GITHUB_API_TIMEOUT", "5"),
        ])
        .unwrap();
        assert_eq!(config.github_token.as_deref(), Some("ghp_secret"));
        assert_eq!(config.github_api_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.github_timeout_secs, 5);

        let err = resolve(&[("GITHUB_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { var: "GITHUB_API_URL", .. }));
    }

    #[test]
    fn test_token_is_redacted() {
        let config = resolve(&[("GITHUB_ACCESS_TOKEN", "ghp_secret")]).unwrap();
        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("ghp_secret"));
        assert!(debug_str.contains("[REDACTED]"));

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("ghp_secret"));
        assert!(json.contains("\"container_mode\":\"docker\""));
    }

    #[test]
    fn test_error_mentions_variable() {
        let err = resolve(&[("NUM_PROCS", "abc")]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("NUM_PROCS"));
        assert!(msg.contains("abc"));
    }

    #[test]
    fn test_prepare_dirs() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("nested").join("cache");
        let cache_str = cache.to_string_lossy().to_string();
        let tmp_str = tmp.path().to_string_lossy().to_string();

        let config = resolve(&[("CACHE_DIR", cache_str.as_str()), ("TMP_DIR", tmp_str.as_str())]).unwrap();
        config.prepare_dirs().unwrap();
        assert!(cache.is_dir());
    }

    #[test]
    fn test_prepare_dirs_missing_tmp_dir() {
        let tmp = TempDir::new().unwrap();
        let cache_str = tmp.path().join("cache").to_string_lossy().to_string();
        let missing = tmp.path().join("does-not-exist").to_string_lossy().to_string();

        let config = resolve(&[("CACHE_DIR", cache_str.as_str()), ("TMP_DIR", missing.as_str())]).unwrap();
        let err = config.prepare_dirs().unwrap_err();
        assert!(err.to_string().contains("TMP_DIR"));
    }

    #[cfg(unix)]
    #[test]
    fn test_env_from_os_skips_unrelated_non_utf8() {
        use std::os::unix::ffi::OsStringExt;

        let entries = vec![
            (OsString::from("NUM_PROCS"), OsString::from("3")),
            (OsString::from("SOME_OTHER_TOOL"), OsString::from_vec(b"\xff\xfe".to_vec())),
            (OsString::from_vec(b"\xffKEY".to_vec()), OsString::from("x")),
        ];
        let env = env_from_os(entries).unwrap();
        assert_eq!(env.len(), 1);
        assert_eq!(env.get("NUM_PROCS").map(String::as_str), Some("3"));
    }

    #[cfg(unix)]
    #[test]
    fn test_env_from_os_rejects_non_utf8_known_variable() {
        use std::os::unix::ffi::OsStringExt;

        let entries = vec![(OsString::from("CACHE_DIR"), OsString::from_vec(b"/tmp/\xff".to_vec()))];
        let err = env_from_os(entries).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { var: "CACHE_DIR", .. }));
        assert!(err.to_string().contains("UTF-8"));
    }

    #[cfg(unix)]
    #[test]
    fn test_from_env_tolerates_non_utf8_process_variable() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let key = "DOJO_CONFIG_TEST_NON_UTF8";
        std::env::set_var(key, OsStr::from_bytes(b"\xff"));
        let result = DojoConfig::from_env();
        std::env::remove_var(key);

        assert!(result.is_ok(), "unexpected error: {:?}", result.err());
    }
}
