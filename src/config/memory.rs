//! Memory size limits in the notation Docker's `--memory` flag accepts.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Memory size such as `16g`, `512m` or `1073741824`.
///
/// The grammar is `<digits>[b|k|m|g]`, unit case-insensitive. The original
/// spelling is kept so it can be passed through to the container runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryLimit {
    raw: String,
    bytes: u64,
}

impl MemoryLimit {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }
}

impl FromStr for MemoryLimit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let (digits, multiplier) = match raw.chars().last() {
            Some(c) if c.is_ascii_alphabetic() => {
                let multiplier: u64 = match c.to_ascii_lowercase() {
                    'b' => 1,
                    'k' => 1 << 10,
                    'm' => 1 << 20,
                    'g' => 1 << 30,
                    _ => return Err(()),
                };
                (&raw[..raw.len() - 1], multiplier)
            }
            _ => (raw, 1),
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(());
        }

        let value: u64 = digits.parse().map_err(|_| ())?;
        let bytes = value.checked_mul(multiplier).ok_or(())?;
        if bytes == 0 {
            return Err(());
        }

        Ok(Self {
            raw: raw.to_string(),
            bytes,
        })
    }
}

impl fmt::Display for MemoryLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for MemoryLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}
