//! Codec configuration.
//!
//! Limits applied when reading untrusted input. Encoding takes no
//! configuration. Once built, a `CodecConfig` is plain data and can be
//! shared freely between threads.
//!
//! # Example
//!
//! ```rust
//! use laurel_ion::config::CodecConfig;
//!
//! let config = CodecConfig::builder()
//!     .max_depth(64)
//!     .max_input_len(1 << 20)
//!     .build();
//!
//! assert_eq!(config.max_depth, 64);
//! assert_eq!(config.max_input_len, Some(1 << 20));
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default bound on nesting depth.
///
/// Deep enough for any program a person writes. Reading and decoding run
/// on a stack sized from the limit, so raising it costs address space.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Limits for reading and decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Deepest container nesting the reader accepts, and deepest AST
    /// nesting the decoder descends into.
    pub max_depth: usize,
    /// Largest accepted input, in bytes. `None` for no limit.
    pub max_input_len: Option<usize>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_input_len: None,
        }
    }
}

impl CodecConfig {
    /// Create a new builder for `CodecConfig`.
    pub fn builder() -> CodecConfigBuilder {
        CodecConfigBuilder::default()
    }

    /// Parse a configuration from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Load a configuration from a JSON file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&text)?)
    }
}

/// Builder for `CodecConfig`.
#[derive(Debug, Default)]
pub struct CodecConfigBuilder {
    config: CodecConfig,
}

impl CodecConfigBuilder {
    /// Set the maximum nesting depth.
    pub fn max_depth(mut self, value: usize) -> Self {
        self.config.max_depth = value;
        self
    }

    /// Set the maximum input length in bytes.
    pub fn max_input_len(mut self, value: usize) -> Self {
        self.config.max_input_len = Some(value);
        self
    }

    /// Remove the input length limit.
    pub fn unlimited_input(mut self) -> Self {
        self.config.max_input_len = None;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> CodecConfig {
        self.config
    }
}
