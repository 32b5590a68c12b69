//! Migration configuration
//!
//! Selects which in-tree plugins are migrated to CSI. Loaded from YAML or
//! JSON; an empty plugin list enables every built-in translator.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the translator registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MigrationConfig {
    /// CSI driver names or in-tree plugin names to register
    pub enabled_plugins: Vec<String>,
}

impl MigrationConfig {
    /// Configuration enabling only the named plugins
    pub fn with_plugins<I, S>(plugins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enabled_plugins: plugins.into_iter().map(Into::into).collect(),
        }
    }

    /// Load configuration from a `.yaml`/`.yml` or `.json` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(serde_json::from_str(&raw)?),
            Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&raw)?),
            other => Err(Error::Configuration(format!(
                "unsupported config file extension {:?} for {}",
                other,
                path.display()
            ))),
        }
    }

    /// True when every built-in plugin should be registered
    pub fn enables_all(&self) -> bool {
        self.enabled_plugins.is_empty()
    }
}
