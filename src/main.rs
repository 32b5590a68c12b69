//! csi-translate
//!
//! Command line front end for the CSI translation library: translates
//! PersistentVolume manifests between in-tree and CSI form, answers
//! migration queries, and scans a cluster for migratable volumes.

use clap::{Parser, Subcommand};
use k8s_openapi::api::core::v1::PersistentVolume;
use kube::{api::ListParams, Api, Client};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use csi_translation::{
    load_persistent_volume, render_persistent_volume, CsiTranslator, MigrationConfig,
    OutputFormat, PluginRegistry, Result, TranslationMetrics,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Translate Kubernetes PersistentVolumes between in-tree and CSI sources
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Migration config file (YAML or JSON); all built-in plugins when unset
    #[arg(long, env = "MIGRATION_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn", global = true)]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON", global = true)]
    log_json: bool,

    /// Print dispatch metrics to stderr on exit
    #[arg(long, env = "PRINT_METRICS", global = true)]
    print_metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate an in-tree PersistentVolume manifest to CSI
    ToCsi {
        /// Manifest path, `-` for stdin
        #[arg(long, short)]
        file: PathBuf,

        /// Output format (yaml, json)
        #[arg(long, short, default_value = "yaml")]
        output: OutputFormat,
    },

    /// Translate a CSI PersistentVolume manifest back to its in-tree source
    ToInTree {
        /// Manifest path, `-` for stdin
        #[arg(long, short)]
        file: PathBuf,

        /// Output format (yaml, json)
        #[arg(long, short, default_value = "yaml")]
        output: OutputFormat,
    },

    /// Report whether a CSI driver name is migrated
    IsMigrated {
        #[arg(long)]
        name: String,
    },

    /// List registered translators
    List,

    /// List cluster PersistentVolumes and report which can be migrated
    Scan,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    let config = match &args.config {
        Some(path) => MigrationConfig::from_file(path)?,
        None => MigrationConfig::default(),
    };
    let registry = Arc::new(PluginRegistry::from_config(&config)?);
    let metrics = TranslationMetrics::new()?;
    let translator = CsiTranslator::new(registry).with_metrics(metrics.clone());

    info!(
        "csi-translate {} with translators: {}",
        csi_translation::VERSION,
        translator.registry().driver_names().collect::<Vec<_>>().join(", ")
    );

    match args.command {
        Command::ToCsi { file, output } => {
            let pv = load_persistent_volume(&file)?;
            let translated = translator.translate_in_tree_pv_to_csi(&pv)?;
            print!("{}", render_persistent_volume(&translated, output)?);
        }
        Command::ToInTree { file, output } => {
            let pv = load_persistent_volume(&file)?;
            let translated = translator.translate_csi_pv_to_in_tree(&pv)?;
            print!("{}", render_persistent_volume(&translated, output)?);
        }
        Command::IsMigrated { name } => {
            println!("{}", translator.is_migrated_by_name(&name));
        }
        Command::List => {
            for plugin in translator.registry().iter() {
                println!(
                    "{}\t{}",
                    plugin.csi_driver_name(),
                    plugin.in_tree_plugin_name()
                );
            }
        }
        Command::Scan => scan_cluster(&translator).await?,
    }

    if args.print_metrics {
        eprint!("{}", metrics.gather_text()?);
    }

    Ok(())
}

// =============================================================================
// Cluster Scan
// =============================================================================

async fn scan_cluster(translator: &CsiTranslator) -> Result<()> {
    let client = Client::try_default().await?;
    let api: Api<PersistentVolume> = Api::all(client);
    let volumes = api.list(&ListParams::default()).await?;

    info!("Scanning {} persistent volume(s)", volumes.items.len());

    for pv in &volumes.items {
        let name = pv.metadata.name.as_deref().unwrap_or("<unnamed>");
        if !translator.is_pv_migrated(pv) {
            println!("{}\tnot-migrated", name);
            continue;
        }
        match translator.translate_in_tree_pv_to_csi(pv) {
            Ok(translated) => {
                let driver = translated
                    .spec
                    .as_ref()
                    .and_then(|spec| spec.csi.as_ref())
                    .map(|csi| csi.driver.as_str())
                    .unwrap_or_default();
                println!("{}\tmigratable\t{}", name, driver);
            }
            Err(e) => {
                warn!("Volume {} cannot be translated: {}", name, e);
                println!("{}\tfailed\t{}", name, e);
            }
        }
    }

    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for directive in ["hyper=warn", "kube=info", "tower=warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    // Logs go to stderr so translated manifests on stdout stay clean
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
