//! Domain Ports - Translator contract for in-tree volume plugins
//!
//! Each in-tree volume plugin that has been migrated to CSI provides an
//! implementation of [`InTreePlugin`]. The dispatcher only selects and
//! invokes plugins; all field mapping lives behind this trait.

use crate::error::Result;
use k8s_openapi::api::core::v1::PersistentVolume;
use std::sync::Arc;

// =============================================================================
// In-Tree Plugin Port
// =============================================================================

/// Port implemented by every in-tree to CSI translator
///
/// Implementations are stateless and shared across threads. None of the
/// methods may mutate the volume they are handed; translations return a
/// fresh, independent copy.
pub trait InTreePlugin: Send + Sync {
    /// Test whether this plugin owns the given persistent volume.
    ///
    /// Must be total: unsupported input yields `false`. Across a registry
    /// at most one plugin may answer `true` for any volume.
    fn can_support(&self, pv: &PersistentVolume) -> bool;

    /// Translate an in-tree persistent volume into a CSI persistent volume
    fn translate_in_tree_pv_to_csi(&self, pv: &PersistentVolume) -> Result<PersistentVolume>;

    /// Translate a CSI persistent volume back into this plugin's in-tree form
    fn translate_csi_pv_to_in_tree(&self, pv: &PersistentVolume) -> Result<PersistentVolume>;

    /// CSI driver name this plugin is registered under
    fn csi_driver_name(&self) -> &str;

    /// In-tree plugin name this plugin migrates (e.g. `kubernetes.io/gce-pd`)
    fn in_tree_plugin_name(&self) -> &str;
}

impl std::fmt::Debug for dyn InTreePlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InTreePlugin")
            .field("in_tree_plugin_name", &self.in_tree_plugin_name())
            .field("csi_driver_name", &self.csi_driver_name())
            .finish()
    }
}

// =============================================================================
// Type Aliases for Arc'd Traits
// =============================================================================

pub type InTreePluginRef = Arc<dyn InTreePlugin>;
