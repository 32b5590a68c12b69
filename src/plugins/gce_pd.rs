//! GCE Persistent Disk Translator
//!
//! Maps `kubernetes.io/gce-pd` volumes onto the GCE PD CSI driver. The CSI
//! volume handle encodes project, location and disk name:
//! `projects/{project}/zones/{zone}/disks/{name}` for zonal disks and
//! `projects/{project}/regions/{region}/disks/{name}` for regional ones.

use super::{parse_partition, partition_attributes, pv_name, require_spec};
use crate::domain::ports::InTreePlugin;
use crate::error::{Error, Result};
use k8s_openapi::api::core::v1::{
    CSIPersistentVolumeSource, GCEPersistentDiskVolumeSource, PersistentVolume,
};
use tracing::debug;

/// CSI driver name for GCE PD
pub const GCE_PD_DRIVER_NAME: &str = "pd.csi.storage.gke.io";

/// In-tree plugin name for GCE PD
pub const GCE_PD_IN_TREE_PLUGIN_NAME: &str = "kubernetes.io/gce-pd";

/// Placeholder for handle components the in-tree volume does not know
pub const UNSPECIFIED_VALUE: &str = "UNSPECIFIED";

/// Zone label (GA)
pub const LABEL_TOPOLOGY_ZONE: &str = "topology.kubernetes.io/zone";

/// Zone label (beta)
pub const LABEL_FAILURE_DOMAIN_ZONE: &str = "failure-domain.beta.kubernetes.io/zone";

/// Delimiter between zones of a multi-zone volume label
pub const MULTI_ZONE_DELIMITER: &str = "__";

const VOLUME_HANDLE_ELEMENTS: usize = 6;
const VOLUME_HANDLE_DISK_NAME_INDEX: usize = 5;

/// Translator for GCE persistent disks
#[derive(Debug, Clone, Copy, Default)]
pub struct GcePersistentDisk;

impl GcePersistentDisk {
    /// Build the CSI volume handle from the volume's zone labels
    fn volume_handle(&self, pv: &PersistentVolume, pd_name: &str) -> Result<String> {
        let zones: Vec<&str> = zone_label(pv)
            .map(|label| {
                label
                    .split(MULTI_ZONE_DELIMITER)
                    .filter(|z| !z.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        match zones.as_slice() {
            [] => Ok(zonal_handle(UNSPECIFIED_VALUE, pd_name)),
            [zone] => Ok(zonal_handle(zone, pd_name)),
            _ => {
                let region = region_from_zones(&zones)?;
                Ok(format!(
                    "projects/{}/regions/{}/disks/{}",
                    UNSPECIFIED_VALUE, region, pd_name
                ))
            }
        }
    }
}

impl InTreePlugin for GcePersistentDisk {
    fn can_support(&self, pv: &PersistentVolume) -> bool {
        pv.spec
            .as_ref()
            .map_or(false, |spec| spec.gce_persistent_disk.is_some())
    }

    fn translate_in_tree_pv_to_csi(&self, pv: &PersistentVolume) -> Result<PersistentVolume> {
        let spec = require_spec(pv, GCE_PD_DRIVER_NAME)?;
        let source = spec.gce_persistent_disk.as_ref().ok_or_else(|| {
            Error::translation(
                GCE_PD_DRIVER_NAME,
                format!("GCE persistent disk source not defined on pv {}", pv_name(pv)),
            )
        })?;
        if source.pd_name.is_empty() {
            return Err(Error::translation(GCE_PD_DRIVER_NAME, "pdName is empty"));
        }

        let volume_handle = self.volume_handle(pv, &source.pd_name)?;
        debug!("GCE PD {} -> volume handle {}", pv_name(pv), volume_handle);

        let csi = CSIPersistentVolumeSource {
            driver: GCE_PD_DRIVER_NAME.to_string(),
            volume_handle,
            read_only: source.read_only,
            fs_type: source.fs_type.clone(),
            volume_attributes: partition_attributes(source.partition),
            ..Default::default()
        };

        let mut translated = pv.clone();
        if let Some(spec) = translated.spec.as_mut() {
            spec.gce_persistent_disk = None;
            spec.csi = Some(csi);
        }
        Ok(translated)
    }

    fn translate_csi_pv_to_in_tree(&self, pv: &PersistentVolume) -> Result<PersistentVolume> {
        let spec = require_spec(pv, GCE_PD_DRIVER_NAME)?;
        let csi = spec
            .csi
            .as_ref()
            .filter(|csi| csi.driver == GCE_PD_DRIVER_NAME)
            .ok_or_else(|| {
                Error::translation(
                    GCE_PD_DRIVER_NAME,
                    format!("GCE PD CSI source not defined on pv {}", pv_name(pv)),
                )
            })?;

        let parts: Vec<&str> = csi.volume_handle.split('/').collect();
        if parts.len() != VOLUME_HANDLE_ELEMENTS {
            return Err(Error::translation(
                GCE_PD_DRIVER_NAME,
                format!(
                    "failed to get disk name from volume handle {:?}: expected {} elements, got {}",
                    csi.volume_handle,
                    VOLUME_HANDLE_ELEMENTS,
                    parts.len()
                ),
            ));
        }
        let pd_name = parts[VOLUME_HANDLE_DISK_NAME_INDEX];
        if pd_name.is_empty() {
            return Err(Error::translation(
                GCE_PD_DRIVER_NAME,
                format!("volume handle {:?} has an empty disk name", csi.volume_handle),
            ));
        }

        let source = GCEPersistentDiskVolumeSource {
            pd_name: pd_name.to_string(),
            fs_type: csi.fs_type.clone(),
            read_only: csi.read_only,
            partition: parse_partition(csi.volume_attributes.as_ref(), GCE_PD_DRIVER_NAME)?,
        };

        let mut translated = pv.clone();
        if let Some(spec) = translated.spec.as_mut() {
            spec.csi = None;
            spec.gce_persistent_disk = Some(source);
        }
        Ok(translated)
    }

    fn csi_driver_name(&self) -> &str {
        GCE_PD_DRIVER_NAME
    }

    fn in_tree_plugin_name(&self) -> &str {
        GCE_PD_IN_TREE_PLUGIN_NAME
    }
}

fn zone_label(pv: &PersistentVolume) -> Option<&str> {
    let labels = pv.metadata.labels.as_ref()?;
    labels
        .get(LABEL_TOPOLOGY_ZONE)
        .or_else(|| labels.get(LABEL_FAILURE_DOMAIN_ZONE))
        .map(String::as_str)
}

fn zonal_handle(zone: &str, pd_name: &str) -> String {
    format!("projects/{}/zones/{}/disks/{}", UNSPECIFIED_VALUE, zone, pd_name)
}

/// Derive the single region shared by all zones (`us-central1-a` -> `us-central1`)
fn region_from_zones(zones: &[&str]) -> Result<String> {
    let mut region: Option<&str> = None;
    for zone in zones {
        let candidate = zone
            .rsplit_once('-')
            .map(|(r, _)| r)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| {
                Error::translation(
                    GCE_PD_DRIVER_NAME,
                    format!("zone {:?} does not name a region", zone),
                )
            })?;
        match region {
            None => region = Some(candidate),
            Some(existing) if existing != candidate => {
                return Err(Error::translation(
                    GCE_PD_DRIVER_NAME,
                    format!("zones {:?} span more than one region", zones),
                ));
            }
            Some(_) => {}
        }
    }
    region
        .map(str::to_string)
        .ok_or_else(|| Error::translation(GCE_PD_DRIVER_NAME, "no zones given"))
}
