//! CSI Translation Dispatcher
//!
//! Routes a translation request to exactly one registered in-tree plugin.
//! In-tree volumes are matched by scanning `can_support` predicates, since
//! they carry no stable driver name; CSI volumes are matched by exact
//! lookup on their driver name. The dispatcher holds no translation logic
//! of its own and never mutates the volume it is given.

use crate::domain::ports::InTreePluginRef;
use crate::error::{Error, Result};
use crate::metrics::{Direction, Outcome, TranslationMetrics};
use crate::plugins::pv_name;
use crate::registry::PluginRegistry;
use k8s_openapi::api::core::v1::{PersistentVolume, Volume};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Dispatcher over an injected, immutable plugin registry
#[derive(Debug, Clone)]
pub struct CsiTranslator {
    registry: Arc<PluginRegistry>,
    metrics: Option<TranslationMetrics>,
}

impl CsiTranslator {
    /// Create a dispatcher over the given registry
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self {
            registry,
            metrics: None,
        }
    }

    /// Dispatcher over every built-in translator
    pub fn with_default_plugins() -> Result<Self> {
        Ok(Self::new(Arc::new(PluginRegistry::with_default_plugins()?)))
    }

    /// Record dispatch outcomes on `metrics`
    pub fn with_metrics(mut self, metrics: TranslationMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    // =========================================================================
    // Translation
    // =========================================================================

    /// Translate an in-tree persistent volume to its CSI form.
    ///
    /// Fails with [`Error::InvalidInput`] when the volume has no spec and
    /// with [`Error::NoTranslatorFound`] when no plugin claims it. Plugin
    /// errors are returned unchanged.
    pub fn translate_in_tree_pv_to_csi(&self, pv: &PersistentVolume) -> Result<PersistentVolume> {
        if pv.spec.is_none() {
            return self.reject(
                Direction::ToCsi,
                Error::InvalidInput(format!("persistent volume {} has no spec", pv_name(pv))),
            );
        }

        if cfg!(debug_assertions) {
            if let Err(e) = self.registry.ensure_exclusive(pv) {
                error!("Translator registry violates exclusivity: {}", e);
            }
        }

        let Some(plugin) = self.registry.find_supporting(pv) else {
            return self.reject(
                Direction::ToCsi,
                Error::NoTranslatorFound {
                    what: format!("pv {}", pv_name(pv)),
                },
            );
        };

        debug!(
            "Translating pv {} from {} to CSI driver {}",
            pv_name(pv),
            plugin.in_tree_plugin_name(),
            plugin.csi_driver_name()
        );
        let result = plugin.translate_in_tree_pv_to_csi(pv);
        self.observe(Direction::ToCsi, plugin, &result);
        result
    }

    /// Translate a CSI persistent volume back to its in-tree form.
    ///
    /// The volume must carry a CSI source with a non-empty driver name,
    /// otherwise [`Error::InvalidInput`] is returned. Fails with
    /// [`Error::NoTranslatorFound`] when no plugin is registered under
    /// that driver name.
    pub fn translate_csi_pv_to_in_tree(&self, pv: &PersistentVolume) -> Result<PersistentVolume> {
        let Some(csi) = pv.spec.as_ref().and_then(|spec| spec.csi.as_ref()) else {
            return self.reject(
                Direction::ToInTree,
                Error::InvalidInput(format!(
                    "CSI persistent volume source missing on pv {}",
                    pv_name(pv)
                )),
            );
        };
        if csi.driver.is_empty() {
            return self.reject(
                Direction::ToInTree,
                Error::InvalidInput(format!("CSI driver name is empty on pv {}", pv_name(pv))),
            );
        }

        let Some(plugin) = self.registry.get(&csi.driver) else {
            return self.reject(
                Direction::ToInTree,
                Error::NoTranslatorFound {
                    what: csi.driver.clone(),
                },
            );
        };

        debug!(
            "Translating pv {} from CSI driver {} to {}",
            pv_name(pv),
            plugin.csi_driver_name(),
            plugin.in_tree_plugin_name()
        );
        let result = plugin.translate_csi_pv_to_in_tree(pv);
        self.observe(Direction::ToInTree, plugin, &result);
        result
    }

    // =========================================================================
    // Migration Queries
    // =========================================================================

    /// True iff a translator is registered under this CSI driver name
    pub fn is_migrated_by_name(&self, name: &str) -> bool {
        self.registry.get(name).is_some()
    }

    /// True iff some translator claims this persistent volume
    pub fn is_pv_migrated(&self, pv: &PersistentVolume) -> bool {
        self.registry.find_supporting(pv).is_some()
    }

    /// Inline pod volumes are never migrated; no inline translators exist yet.
    pub fn is_inline_migrated(&self, _volume: &Volume) -> bool {
        false
    }

    /// True iff a translator migrates this in-tree plugin name
    pub fn is_migratable_in_tree_plugin(&self, plugin_name: &str) -> bool {
        self.registry.get_by_in_tree_name(plugin_name).is_some()
    }

    /// In-tree plugin name migrated by the given CSI driver
    pub fn in_tree_plugin_name_from_csi_name(&self, driver: &str) -> Result<&str> {
        self.registry
            .get(driver)
            .map(|p| p.in_tree_plugin_name())
            .ok_or_else(|| Error::NoTranslatorFound {
                what: driver.to_string(),
            })
    }

    /// CSI driver name that replaces the given in-tree plugin
    pub fn csi_name_from_in_tree_name(&self, plugin_name: &str) -> Result<&str> {
        self.registry
            .get_by_in_tree_name(plugin_name)
            .map(|p| p.csi_driver_name())
            .ok_or_else(|| Error::NoTranslatorFound {
                what: plugin_name.to_string(),
            })
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn reject(&self, direction: Direction, err: Error) -> Result<PersistentVolume> {
        warn!("{} translation rejected: {}", direction, err);
        if let Some(metrics) = &self.metrics {
            metrics.record(direction, "", Outcome::from_error(&err));
        }
        Err(err)
    }

    fn observe(
        &self,
        direction: Direction,
        plugin: &InTreePluginRef,
        result: &Result<PersistentVolume>,
    ) {
        if let Err(e) = result {
            warn!(
                "{} translation by {} failed: {}",
                direction,
                plugin.csi_driver_name(),
                e
            );
        }
        if let Some(metrics) = &self.metrics {
            metrics.record(direction, plugin.csi_driver_name(), Outcome::of(result));
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::{AWS_EBS_DRIVER_NAME, GCE_PD_DRIVER_NAME, GCE_PD_IN_TREE_PLUGIN_NAME};
    use assert_matches::assert_matches;
    use k8s_openapi::api::core::v1::{
        AWSElasticBlockStoreVolumeSource, CSIPersistentVolumeSource, CinderPersistentVolumeSource,
        GCEPersistentDiskVolumeSource, PersistentVolumeSpec,
    };

    fn ebs_pv() -> PersistentVolume {
        let mut pv = PersistentVolume::default();
        pv.metadata.name = Some("pv-ebs".into());
        pv.spec = Some(PersistentVolumeSpec {
            aws_elastic_block_store: Some(AWSElasticBlockStoreVolumeSource {
                volume_id: "vol-0abc".into(),
                ..Default::default()
            }),
            ..Default::default()
        });
        pv
    }

    fn csi_pv(driver: &str) -> PersistentVolume {
        let mut pv = PersistentVolume::default();
        pv.spec = Some(PersistentVolumeSpec {
            csi: Some(CSIPersistentVolumeSource {
                driver: driver.into(),
                volume_handle: "vol-0abc".into(),
                ..Default::default()
            }),
            ..Default::default()
        });
        pv
    }

    #[test]
    fn test_translate_to_csi_dispatches_by_predicate() {
        let translator = CsiTranslator::with_default_plugins().unwrap();
        let pv = ebs_pv();

        let translated = translator.translate_in_tree_pv_to_csi(&pv).unwrap();
        let csi = translated.spec.unwrap().csi.unwrap();
        assert_eq!(csi.driver, AWS_EBS_DRIVER_NAME);
        assert_eq!(pv, ebs_pv());
    }

    #[test]
    fn test_missing_spec_is_invalid_input() {
        let translator = CsiTranslator::with_default_plugins().unwrap();
        let pv = PersistentVolume::default();

        assert_matches!(
            translator.translate_in_tree_pv_to_csi(&pv),
            Err(Error::InvalidInput(_))
        );
        assert_matches!(
            translator.translate_csi_pv_to_in_tree(&pv),
            Err(Error::InvalidInput(_))
        );
    }

    #[test]
    fn test_empty_driver_is_invalid_input() {
        let translator = CsiTranslator::with_default_plugins().unwrap();
        assert_matches!(
            translator.translate_csi_pv_to_in_tree(&csi_pv("")),
            Err(Error::InvalidInput(_))
        );
    }

    #[test]
    fn test_unclaimed_volume() {
        let translator = CsiTranslator::with_default_plugins().unwrap();
        let mut pv = PersistentVolume::default();
        pv.spec = Some(PersistentVolumeSpec::default());

        assert!(!translator.is_pv_migrated(&pv));
        assert_matches!(
            translator.translate_in_tree_pv_to_csi(&pv),
            Err(Error::NoTranslatorFound { .. })
        );
    }

    #[test]
    fn test_built_in_sources_are_migrated() {
        let translator = CsiTranslator::with_default_plugins().unwrap();

        let mut gce = PersistentVolume::default();
        gce.spec = Some(PersistentVolumeSpec {
            gce_persistent_disk: Some(GCEPersistentDiskVolumeSource {
                pd_name: "disk-1".into(),
                ..Default::default()
            }),
            ..Default::default()
        });
        let mut cinder = PersistentVolume::default();
        cinder.spec = Some(PersistentVolumeSpec {
            cinder: Some(CinderPersistentVolumeSource {
                volume_id: "c0ffee".into(),
                ..Default::default()
            }),
            ..Default::default()
        });

        for pv in [gce, ebs_pv(), cinder] {
            assert!(translator.is_pv_migrated(&pv));
            assert!(translator.translate_in_tree_pv_to_csi(&pv).is_ok());
        }
    }

    #[test]
    fn test_translate_to_in_tree_dispatches_by_driver() {
        let translator = CsiTranslator::with_default_plugins().unwrap();

        let back = translator
            .translate_csi_pv_to_in_tree(&csi_pv(AWS_EBS_DRIVER_NAME))
            .unwrap();
        assert_eq!(
            back.spec.unwrap().aws_elastic_block_store.unwrap().volume_id,
            "vol-0abc"
        );

        assert_matches!(
            translator.translate_csi_pv_to_in_tree(&csi_pv("unknown.csi.driver")),
            Err(Error::NoTranslatorFound { what }) if what == "unknown.csi.driver"
        );
    }

    #[test]
    fn test_plugin_errors_propagate_unchanged() {
        let translator = CsiTranslator::with_default_plugins().unwrap();
        let mut pv = csi_pv(GCE_PD_DRIVER_NAME);
        if let Some(csi) = pv.spec.as_mut().and_then(|s| s.csi.as_mut()) {
            csi.volume_handle = "not-a-handle".into();
        }

        assert_matches!(
            translator.translate_csi_pv_to_in_tree(&pv),
            Err(Error::Translation { driver, .. }) if driver == GCE_PD_DRIVER_NAME
        );
    }

    #[test]
    fn test_name_lookups() {
        let translator = CsiTranslator::with_default_plugins().unwrap();

        assert!(translator.is_migrated_by_name(GCE_PD_DRIVER_NAME));
        assert!(!translator.is_migrated_by_name("nfs.csi.k8s.io"));
        assert!(translator.is_migratable_in_tree_plugin(GCE_PD_IN_TREE_PLUGIN_NAME));
        assert_eq!(
            translator
                .in_tree_plugin_name_from_csi_name(GCE_PD_DRIVER_NAME)
                .unwrap(),
            GCE_PD_IN_TREE_PLUGIN_NAME
        );
        assert_eq!(
            translator
                .csi_name_from_in_tree_name(GCE_PD_IN_TREE_PLUGIN_NAME)
                .unwrap(),
            GCE_PD_DRIVER_NAME
        );
        assert_matches!(
            translator.csi_name_from_in_tree_name("kubernetes.io/nfs"),
            Err(Error::NoTranslatorFound { .. })
        );
    }

    #[test]
    fn test_inline_volumes_never_migrated() {
        let translator = CsiTranslator::with_default_plugins().unwrap();
        assert!(!translator.is_inline_migrated(&Volume::default()));
    }

    #[test]
    fn test_metrics_recorded() {
        let metrics = TranslationMetrics::new().unwrap();
        let translator = CsiTranslator::with_default_plugins()
            .unwrap()
            .with_metrics(metrics.clone());

        translator.translate_in_tree_pv_to_csi(&ebs_pv()).unwrap();
        let _ = translator.translate_csi_pv_to_in_tree(&csi_pv("unknown.csi.driver"));

        assert_eq!(
            metrics.count(Direction::ToCsi, AWS_EBS_DRIVER_NAME, Outcome::Success),
            1
        );
        assert_eq!(metrics.count(Direction::ToInTree, "", Outcome::NoTranslator), 1);
    }
}
