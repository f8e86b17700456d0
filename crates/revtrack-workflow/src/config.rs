use std::path::Path;

use revtrack_store::DEFAULT_PATCH_SUFFIX;
use serde::{Deserialize, Serialize};

/// Configuration for the revision workflow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkflowConfig {
    /// Appended to a document's path to locate its stored patch.
    pub patch_suffix: String,
    /// Whether to pre-render split-view markup for the presentation sink.
    pub render_markup: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            patch_suffix: DEFAULT_PATCH_SUFFIX.to_string(),
            render_markup: true,
        }
    }
}

/// Errors from loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl WorkflowConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Check invariants the rest of the workflow relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.patch_suffix.is_empty() {
            return Err(ConfigError::Invalid("patch_suffix must not be empty".into()));
        }
        if self.patch_suffix.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(
                "patch_suffix must not contain a path separator".into(),
            ));
        }
        Ok(())
    }
}
