//! OpenStack Cinder Translator
//!
//! Maps `kubernetes.io/cinder` volumes onto the Cinder CSI driver.

use super::{pv_name, require_spec};
use crate::domain::ports::InTreePlugin;
use crate::error::{Error, Result};
use k8s_openapi::api::core::v1::{
    CSIPersistentVolumeSource, CinderPersistentVolumeSource, PersistentVolume,
};

/// CSI driver name for Cinder
pub const CINDER_DRIVER_NAME: &str = "cinder.csi.openstack.org";

/// In-tree plugin name for Cinder
pub const CINDER_IN_TREE_PLUGIN_NAME: &str = "kubernetes.io/cinder";

/// Translator for OpenStack Cinder volumes
#[derive(Debug, Clone, Copy, Default)]
pub struct Cinder;

impl InTreePlugin for Cinder {
    fn can_support(&self, pv: &PersistentVolume) -> bool {
        pv.spec.as_ref().map_or(false, |spec| spec.cinder.is_some())
    }

    fn translate_in_tree_pv_to_csi(&self, pv: &PersistentVolume) -> Result<PersistentVolume> {
        let spec = require_spec(pv, CINDER_DRIVER_NAME)?;
        let source = spec.cinder.as_ref().ok_or_else(|| {
            Error::translation(
                CINDER_DRIVER_NAME,
                format!("Cinder source not defined on pv {}", pv_name(pv)),
            )
        })?;
        if source.volume_id.is_empty() {
            return Err(Error::translation(CINDER_DRIVER_NAME, "volume ID is empty"));
        }

        // The in-tree secret only ever reached the node publish step
        let csi = CSIPersistentVolumeSource {
            driver: CINDER_DRIVER_NAME.to_string(),
            volume_handle: source.volume_id.clone(),
            read_only: source.read_only,
            fs_type: source.fs_type.clone(),
            node_publish_secret_ref: source.secret_ref.clone(),
            ..Default::default()
        };

        let mut translated = pv.clone();
        if let Some(spec) = translated.spec.as_mut() {
            spec.cinder = None;
            spec.csi = Some(csi);
        }
        Ok(translated)
    }

    fn translate_csi_pv_to_in_tree(&self, pv: &PersistentVolume) -> Result<PersistentVolume> {
        let spec = require_spec(pv, CINDER_DRIVER_NAME)?;
        let csi = spec
            .csi
            .as_ref()
            .filter(|csi| csi.driver == CINDER_DRIVER_NAME)
            .ok_or_else(|| {
                Error::translation(
                    CINDER_DRIVER_NAME,
                    format!("Cinder CSI source not defined on pv {}", pv_name(pv)),
                )
            })?;

        let source = CinderPersistentVolumeSource {
            volume_id: csi.volume_handle.clone(),
            fs_type: csi.fs_type.clone(),
            read_only: csi.read_only,
            secret_ref: csi.node_publish_secret_ref.clone(),
        };

        let mut translated = pv.clone();
        if let Some(spec) = translated.spec.as_mut() {
            spec.csi = None;
            spec.cinder = Some(source);
        }
        Ok(translated)
    }

    fn csi_driver_name(&self) -> &str {
        CINDER_DRIVER_NAME
    }

    fn in_tree_plugin_name(&self) -> &str {
        CINDER_IN_TREE_PLUGIN_NAME
    }
}
