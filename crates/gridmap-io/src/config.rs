//! Configuration for the mapping engine.
//!
//! Stored as TOML. Every section is optional and unspecified values fall back
//! to the defaults below:
//!
//! ```toml
//! [decode]
//! boolean_policy = "strict"
//!
//! [extract]
//! parallel = true
//!
//! [batch]
//! parallel = true
//! fail_fast = false
//! threads = 0
//! ```

use std::path::Path;

use gridmap_core::{MappingError, MappingResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Leaf decoding options.
    pub decode: DecodeConfig,

    /// Dependency extraction options.
    pub extract: ExtractConfig,

    /// Batch decode/flatten options.
    pub batch: BatchConfig,
}

/// How boolean fields treat text other than `true`/`false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BooleanPolicy {
    /// Anything else is a parsing failure.
    #[default]
    Strict,
    /// Anything else reads as `false`.
    Lenient,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    pub boolean_policy: BooleanPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Walk the relations of each directly discovered entity on its own task.
    pub parallel: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Map rows in parallel.
    pub parallel: bool,

    /// Abort on the first bad row instead of skipping it.
    pub fail_fast: bool,

    /// Number of worker threads (0 = rayon's global pool).
    pub threads: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            fail_fast: false,
            threads: 0,
        }
    }
}

impl MappingConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> MappingResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> MappingResult<Self> {
        toml::from_str(contents).map_err(|e| MappingError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> MappingResult<String> {
        toml::to_string_pretty(self).map_err(|e| MappingError::Config(e.to_string()))
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: impl AsRef<Path>) -> MappingResult<()> {
        std::fs::write(path.as_ref(), self.to_toml_string()?)?;
        Ok(())
    }
}
