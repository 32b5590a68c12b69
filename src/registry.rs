//! In-Tree Plugin Registry
//!
//! An immutable map from CSI driver name to translator. The registry is
//! assembled once through [`PluginRegistryBuilder`] and is read-only after
//! [`PluginRegistryBuilder::build`], so it can be shared across threads
//! behind an `Arc` without locking.

use crate::config::MigrationConfig;
use crate::domain::ports::InTreePluginRef;
use crate::error::{Error, Result};
use crate::plugins::{pv_name, PluginFactory};
use k8s_openapi::api::core::v1::PersistentVolume;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

// =============================================================================
// Builder
// =============================================================================

/// Collects translators and rejects duplicate registrations
#[derive(Default)]
pub struct PluginRegistryBuilder {
    plugins: BTreeMap<String, InTreePluginRef>,
    in_tree_names: BTreeSet<String>,
}

impl std::fmt::Debug for PluginRegistryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistryBuilder")
            .field("drivers", &self.plugins.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PluginRegistryBuilder {
    /// Register a translator under its CSI driver name
    ///
    /// Fails if either its CSI driver name or its in-tree plugin name is
    /// already claimed by another translator.
    pub fn register(mut self, plugin: InTreePluginRef) -> Result<Self> {
        let driver = plugin.csi_driver_name().to_string();
        let in_tree = plugin.in_tree_plugin_name().to_string();

        if driver.is_empty() {
            return Err(Error::Configuration(format!(
                "translator for {} has an empty CSI driver name",
                in_tree
            )));
        }
        if self.plugins.contains_key(&driver) {
            return Err(Error::DuplicateTranslator { driver });
        }
        if !self.in_tree_names.insert(in_tree.clone()) {
            return Err(Error::DuplicateInTreePlugin { name: in_tree });
        }

        debug!("Registered translator {} for {}", driver, in_tree);
        self.plugins.insert(driver, plugin);
        Ok(self)
    }

    /// Register every translator in order
    pub fn register_all(self, plugins: impl IntoIterator<Item = InTreePluginRef>) -> Result<Self> {
        plugins.into_iter().try_fold(self, |builder, plugin| builder.register(plugin))
    }

    /// Freeze into an immutable registry
    pub fn build(self) -> PluginRegistry {
        info!(
            "Translator registry initialized with {} plugin(s)",
            self.plugins.len()
        );
        PluginRegistry {
            plugins: self.plugins,
        }
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Immutable set of translators keyed by CSI driver name
pub struct PluginRegistry {
    plugins: BTreeMap<String, InTreePluginRef>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("drivers", &self.plugins.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PluginRegistry {
    pub fn builder() -> PluginRegistryBuilder {
        PluginRegistryBuilder::default()
    }

    /// Registry with no translators
    pub fn empty() -> Self {
        Self::builder().build()
    }

    /// Registry holding every built-in translator
    pub fn with_default_plugins() -> Result<Self> {
        Ok(Self::builder().register_all(PluginFactory::all())?.build())
    }

    /// Registry holding the translators enabled by `config`
    pub fn from_config(config: &MigrationConfig) -> Result<Self> {
        if config.enables_all() {
            return Self::with_default_plugins();
        }

        let plugins = config
            .enabled_plugins
            .iter()
            .map(|name| PluginFactory::create(name))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::builder().register_all(plugins)?.build())
    }

    /// Look up a translator by exact CSI driver name
    pub fn get(&self, driver: &str) -> Option<&InTreePluginRef> {
        self.plugins.get(driver)
    }

    /// Look up a translator by in-tree plugin name
    pub fn get_by_in_tree_name(&self, plugin_name: &str) -> Option<&InTreePluginRef> {
        self.plugins
            .values()
            .find(|p| p.in_tree_plugin_name() == plugin_name)
    }

    /// First translator whose `can_support` accepts the volume
    pub fn find_supporting(&self, pv: &PersistentVolume) -> Option<&InTreePluginRef> {
        self.plugins.values().find(|p| p.can_support(pv))
    }

    /// CSI driver names of every translator claiming the volume
    pub fn claimants(&self, pv: &PersistentVolume) -> Vec<&str> {
        self.plugins
            .values()
            .filter(|p| p.can_support(pv))
            .map(|p| p.csi_driver_name())
            .collect()
    }

    /// Verify that at most one translator claims the volume
    pub fn ensure_exclusive(&self, pv: &PersistentVolume) -> Result<()> {
        let claimants = self.claimants(pv);
        if claimants.len() > 1 {
            return Err(Error::AmbiguousTranslators {
                volume: pv_name(pv).to_string(),
                drivers: claimants.into_iter().map(str::to_string).collect(),
            });
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &InTreePluginRef> {
        self.plugins.values()
    }

    pub fn driver_names(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
