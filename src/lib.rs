//! CSI Translation - In-Tree to CSI Volume Migration
//!
//! Translates Kubernetes PersistentVolumes between legacy in-tree volume
//! sources and CSI volume sources, so an orchestrator can hand existing
//! volumes to external CSI drivers.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        CsiTranslator                          │
//! │   in-tree -> CSI: scan can_support()                          │
//! │   CSI -> in-tree: lookup by CSI driver name                   │
//! ├──────────────────────────────────────────────────────────────┤
//! │              PluginRegistry (immutable, Arc-shared)           │
//! ├──────────────────┬──────────────────┬────────────────────────┤
//! │     GCE PD       │     AWS EBS      │        Cinder          │
//! │ pd.csi.storage.  │ ebs.csi.aws.com  │ cinder.csi.openstack.  │
//! │     gke.io       │                  │         org            │
//! └──────────────────┴──────────────────┴────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`translator`]: Dispatcher selecting exactly one plugin per call
//! - [`registry`]: Immutable plugin registry and exclusivity checks
//! - [`plugins`]: Built-in in-tree plugin translators
//! - [`domain`]: The [`InTreePlugin`] port
//! - [`config`]: Which plugins are migrated
//! - [`metrics`]: Prometheus dispatch counters
//! - [`io`]: Manifest loading and rendering
//! - [`error`]: Error types and handling

pub mod config;
pub mod domain;
pub mod error;
pub mod io;
pub mod metrics;
pub mod plugins;
pub mod registry;
pub mod translator;

// Re-export commonly used types
pub use config::MigrationConfig;

pub use domain::ports::{InTreePlugin, InTreePluginRef};

pub use error::{Error, ErrorKind, Result};

pub use io::{load_persistent_volume, render_persistent_volume, OutputFormat};

pub use metrics::{Direction, Outcome, TranslationMetrics};

pub use plugins::{
    AwsElasticBlockStore, Cinder, GcePersistentDisk, PluginFactory, AWS_EBS_DRIVER_NAME,
    AWS_EBS_IN_TREE_PLUGIN_NAME, CINDER_DRIVER_NAME, CINDER_IN_TREE_PLUGIN_NAME,
    GCE_PD_DRIVER_NAME, GCE_PD_IN_TREE_PLUGIN_NAME,
};

pub use registry::{PluginRegistry, PluginRegistryBuilder};

pub use translator::CsiTranslator;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
