//! AWS Elastic Block Store Translator
//!
//! Maps `kubernetes.io/aws-ebs` volumes onto the EBS CSI driver. The CSI
//! volume handle is the bare EBS volume ID (`vol-0123456789abcdef0`).

use super::{parse_partition, partition_attributes, pv_name, require_spec};
use crate::domain::ports::InTreePlugin;
use crate::error::{Error, Result};
use k8s_openapi::api::core::v1::{
    AWSElasticBlockStoreVolumeSource, CSIPersistentVolumeSource, PersistentVolume,
};
use tracing::debug;

/// CSI driver name for AWS EBS
pub const AWS_EBS_DRIVER_NAME: &str = "ebs.csi.aws.com";

/// In-tree plugin name for AWS EBS
pub const AWS_EBS_IN_TREE_PLUGIN_NAME: &str = "kubernetes.io/aws-ebs";

const AWS_URL_SCHEME: &str = "aws://";
const EBS_VOLUME_PREFIX: &str = "vol-";

/// Translator for AWS EBS volumes
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsElasticBlockStore;

impl InTreePlugin for AwsElasticBlockStore {
    fn can_support(&self, pv: &PersistentVolume) -> bool {
        pv.spec
            .as_ref()
            .map_or(false, |spec| spec.aws_elastic_block_store.is_some())
    }

    fn translate_in_tree_pv_to_csi(&self, pv: &PersistentVolume) -> Result<PersistentVolume> {
        let spec = require_spec(pv, AWS_EBS_DRIVER_NAME)?;
        let source = spec.aws_elastic_block_store.as_ref().ok_or_else(|| {
            Error::translation(
                AWS_EBS_DRIVER_NAME,
                format!("AWS EBS source not defined on pv {}", pv_name(pv)),
            )
        })?;

        let volume_handle = ebs_volume_id(&source.volume_id)?;
        debug!("AWS EBS {} -> volume handle {}", pv_name(pv), volume_handle);

        let csi = CSIPersistentVolumeSource {
            driver: AWS_EBS_DRIVER_NAME.to_string(),
            volume_handle,
            read_only: source.read_only,
            fs_type: source.fs_type.clone(),
            volume_attributes: partition_attributes(source.partition),
            ..Default::default()
        };

        let mut translated = pv.clone();
        if let Some(spec) = translated.spec.as_mut() {
            spec.aws_elastic_block_store = None;
            spec.csi = Some(csi);
        }
        Ok(translated)
    }

    fn translate_csi_pv_to_in_tree(&self, pv: &PersistentVolume) -> Result<PersistentVolume> {
        let spec = require_spec(pv, AWS_EBS_DRIVER_NAME)?;
        let csi = spec
            .csi
            .as_ref()
            .filter(|csi| csi.driver == AWS_EBS_DRIVER_NAME)
            .ok_or_else(|| {
                Error::translation(
                    AWS_EBS_DRIVER_NAME,
                    format!("EBS CSI source not defined on pv {}", pv_name(pv)),
                )
            })?;
        if csi.volume_handle.is_empty() {
            return Err(Error::translation(AWS_EBS_DRIVER_NAME, "volume handle is empty"));
        }

        let source = AWSElasticBlockStoreVolumeSource {
            volume_id: csi.volume_handle.clone(),
            fs_type: csi.fs_type.clone(),
            read_only: csi.read_only,
            partition: parse_partition(csi.volume_attributes.as_ref(), AWS_EBS_DRIVER_NAME)?,
        };

        let mut translated = pv.clone();
        if let Some(spec) = translated.spec.as_mut() {
            spec.csi = None;
            spec.aws_elastic_block_store = Some(source);
        }
        Ok(translated)
    }

    fn csi_driver_name(&self) -> &str {
        AWS_EBS_DRIVER_NAME
    }

    fn in_tree_plugin_name(&self) -> &str {
        AWS_EBS_IN_TREE_PLUGIN_NAME
    }
}

/// Reduce an in-tree volume ID to a bare EBS volume ID
///
/// Accepts `vol-x`, `aws://<zone>/vol-x` and `aws:///vol-x`.
fn ebs_volume_id(volume_id: &str) -> Result<String> {
    if volume_id.is_empty() {
        return Err(Error::translation(AWS_EBS_DRIVER_NAME, "volume ID is empty"));
    }

    let Some(rest) = volume_id.strip_prefix(AWS_URL_SCHEME) else {
        return Ok(volume_id.to_string());
    };

    let id = rest
        .split_once('/')
        .map(|(_, path)| path.trim_matches('/'))
        .unwrap_or_default();
    if !id.starts_with(EBS_VOLUME_PREFIX) || id.contains('/') {
        return Err(Error::translation(
            AWS_EBS_DRIVER_NAME,
            format!("invalid format for AWS volume ({})", volume_id),
        ));
    }
    Ok(id.to_string())
}
