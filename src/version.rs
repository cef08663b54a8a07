//! Semantic version triples for external tools.
//!
//! Versions compare lexicographically on `(major, minor, patch)`, which is
//! what the derived `Ord` gives us through field order.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse the first line of `git --version` output.
    ///
    /// Accepts `git version 2.39.2`, `git version 2.39.2.windows.1`,
    /// `git version 2.39.2 (Apple Git-143)` and two-component versions such as
    /// `git version 2.40` (patch defaults to 0).
    pub fn parse_git_output(output: &str) -> Option<Self> {
        static GIT_VERSION: OnceLock<Regex> = OnceLock::new();
        let re = GIT_VERSION.get_or_init(|| {
            Regex::new(r"^git version (\d+)\.(\d+)(?:\.(\d+))?").expect("valid git version regex")
        });

        let caps = re.captures(output.trim_start())?;
        let major = caps.get(1)?.as_str().parse().ok()?;
        let minor = caps.get(2)?.as_str().parse().ok()?;
        let patch = match caps.get(3) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        Some(Self::new(major, minor, patch))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(format!("expected MAJOR.MINOR.PATCH, got '{}'", s));
        }

        let mut nums = [0u32; 3];
        for (slot, part) in nums.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| format!("invalid version component '{}' in '{}'", part, s))?;
        }
        Ok(Self::new(nums[0], nums[1], nums[2]))
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
