//! Constants shared by the rest of the toolkit.
//!
//! Values that can be tuned at runtime live in [`crate::config::DojoConfig`];
//! everything here is fixed at build time.

use crate::version::Version;

/// Toolkit version (from Cargo.toml)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Directory name under `~/.cache` used when `CACHE_DIR` is not set
pub const CACHE_DIR_NAME: &str = "lean_dojo";

/// Remote cache of traced repos
pub const REMOTE_CACHE_URL: &str = "https://lean-dojo.s3.amazonaws.com";

/// Upper bound on the default process count
pub const MAX_NUM_PROCS: usize = 32;

/// URL of the Lean 3 repo
pub const LEAN3_URL: &str = "https://github.com/leanprover-community/lean";

/// Directory where Lean 3 dependencies are stored
pub const LEAN3_DEPS_DIR: &str = "_target/deps";

/// URL of the Lean 4 repo
pub const LEAN4_URL: &str = "https://github.com/leanprover/lean4";

/// Directory where Lean 4 dependencies are stored
pub const LEAN4_DEPS_DIR: &str = "lake-packages";

/// GitHub repo for Lean 4 itself
pub const LEAN4_REPO: &str = "leanprover/lean4";

/// GitHub repo for Lean 4 nightly releases
pub const LEAN4_NIGHTLY_REPO: &str = "leanprover/lean4-nightly";

/// Minimum Lean 3 release supported by the tracer (tag `v3.42.1`)
pub const MIN_LEAN3_VERSION: Version = Version::new(3, 42, 1);

/// Minimum git version required on the host
pub const MIN_GIT_VERSION: Version = Version::new(2, 25, 0);

/// Docker image used when running in container mode
pub const DOCKER_TAG: &str = "yangky11/lean-dojo";

/// Default GitHub REST endpoint
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Tactic defaults
pub const DEFAULT_TACTIC_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_TACTIC_CPU_LIMIT: u32 = 1;
pub const DEFAULT_TACTIC_MEMORY_LIMIT: &str = "16g";

/// Default request timeout in seconds
pub const DEFAULT_GITHUB_TIMEOUT_SECS: u64 = 30;
