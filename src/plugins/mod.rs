//! In-Tree Plugin Adapters
//!
//! Provides CSI translators for migrated in-tree volume plugins:
//! - GCE PD: `kubernetes.io/gce-pd` -> `pd.csi.storage.gke.io`
//! - AWS EBS: `kubernetes.io/aws-ebs` -> `ebs.csi.aws.com`
//! - Cinder: `kubernetes.io/cinder` -> `cinder.csi.openstack.org`

pub mod aws_ebs;
pub mod cinder;
pub mod gce_pd;

pub use aws_ebs::*;
pub use cinder::*;
pub use gce_pd::*;

use crate::domain::ports::InTreePluginRef;
use crate::error::{Error, Result};
use k8s_openapi::api::core::v1::{PersistentVolume, PersistentVolumeSpec};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Volume attribute carrying the in-tree partition number
pub const PARTITION_ATTRIBUTE: &str = "partition";

/// Factory for creating in-tree plugin translators
pub struct PluginFactory;

impl PluginFactory {
    /// Create a translator by CSI driver name or in-tree plugin name
    pub fn create(name: &str) -> Result<InTreePluginRef> {
        match name {
            GCE_PD_DRIVER_NAME | GCE_PD_IN_TREE_PLUGIN_NAME => Ok(Arc::new(GcePersistentDisk)),
            AWS_EBS_DRIVER_NAME | AWS_EBS_IN_TREE_PLUGIN_NAME => Ok(Arc::new(AwsElasticBlockStore)),
            CINDER_DRIVER_NAME | CINDER_IN_TREE_PLUGIN_NAME => Ok(Arc::new(Cinder)),
            _ => Err(Error::UnknownPlugin {
                name: name.to_string(),
            }),
        }
    }

    /// Every built-in translator
    pub fn all() -> Vec<InTreePluginRef> {
        vec![
            Arc::new(GcePersistentDisk),
            Arc::new(AwsElasticBlockStore),
            Arc::new(Cinder),
        ]
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Name of a persistent volume for log and error messages
pub(crate) fn pv_name(pv: &PersistentVolume) -> &str {
    pv.metadata.name.as_deref().unwrap_or("<unnamed>")
}

/// Borrow the spec of a volume, failing the translation if it is absent
pub(crate) fn require_spec<'a>(
    pv: &'a PersistentVolume,
    driver: &str,
) -> Result<&'a PersistentVolumeSpec> {
    pv.spec
        .as_ref()
        .ok_or_else(|| Error::translation(driver, format!("pv {} has no spec", pv_name(pv))))
}

/// Volume attributes for a non-zero partition
pub(crate) fn partition_attributes(partition: Option<i32>) -> Option<BTreeMap<String, String>> {
    match partition {
        Some(p) if p != 0 => {
            let mut attributes = BTreeMap::new();
            attributes.insert(PARTITION_ATTRIBUTE.to_string(), p.to_string());
            Some(attributes)
        }
        _ => None,
    }
}

/// Recover the partition number from CSI volume attributes
pub(crate) fn parse_partition(
    attributes: Option<&BTreeMap<String, String>>,
    driver: &str,
) -> Result<Option<i32>> {
    match attributes.and_then(|a| a.get(PARTITION_ATTRIBUTE)) {
        Some(raw) if !raw.is_empty() => raw.parse::<i32>().map(Some).map_err(|e| {
            Error::translation(driver, format!("failed to parse partition {:?}: {}", raw, e))
        }),
        _ => Ok(None),
    }
}
