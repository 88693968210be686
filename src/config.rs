//! Export configuration, version 1.
//!
//! One `ExportConfig` governs a whole export run: page geometry for the
//! packer, naming of page files, the recursion limit for nested symbols and
//! the retry budget of the shape conversion pass.
//!
//! ## Hashing
//!
//! `params_hash()` fingerprints every field so manifests record exactly which
//! configuration produced them. Every hashed field is an integer or a
//! string.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::canonical::{canonical_hash_hex, CanonicalError};
use crate::timeline::DEFAULT_MAX_NESTING_DEPTH;
use crate::DEFAULT_CONFIG_VERSION;

/// Default page edge in pixels.
pub const DEFAULT_PAGE_SIZE: u32 = 8192;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The config is not valid JSON for this schema.
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds an unusable value.
    #[error("Invalid config field {field}: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Export configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Config version identifier.
    pub version: String,
    /// Page width in pixels.
    pub page_width: u32,
    /// Page height in pixels.
    pub page_height: u32,
    /// Image format written into page names and the manifest (`SVG`, `PNG`).
    pub image_format: String,
    /// Prefix of page file names (`spritemap0.svg`, ...).
    pub page_name_prefix: String,
    /// Nesting limit for recursive symbol descent.
    pub max_nesting_depth: usize,
    /// Retry rounds for failed shape conversions.
    pub max_conversion_rounds: usize,
    /// Application name recorded in manifests.
    pub app_name: String,
}

impl ExportConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Check field values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_width == 0 || self.page_height == 0 {
            return Err(ConfigError::Invalid {
                field: "page_width/page_height",
                reason: format!("page must have area, got {}x{}", self.page_width, self.page_height),
            });
        }
        if self.image_format.is_empty() {
            return Err(ConfigError::Invalid {
                field: "image_format",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// File name of page `index`.
    pub fn page_filename(&self, index: usize) -> String {
        format!(
            "{}{}.{}",
            self.page_name_prefix,
            index,
            self.image_format.to_ascii_lowercase()
        )
    }

    /// Compute a hash of the config parameters.
    pub fn params_hash(&self) -> Result<String, CanonicalError> {
        canonical_hash_hex(self)
    }

    /// Small pages for tests.
    #[cfg(test)]
    pub fn minimal() -> Self {
        Self {
            page_width: 64,
            page_height: 64,
            ..Self::default()
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_CONFIG_VERSION.to_string(),
            page_width: DEFAULT_PAGE_SIZE,
            page_height: DEFAULT_PAGE_SIZE,
            image_format: "SVG".to_string(),
            page_name_prefix: "spritemap".to_string(),
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            max_conversion_rounds: 8,
            app_name: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}
