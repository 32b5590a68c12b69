//! Persistent volume manifest I/O
//!
//! Reads PersistentVolume manifests (YAML or JSON) and renders translated
//! volumes for the command line.

use crate::error::{Error, Result};
use k8s_openapi::api::core::v1::PersistentVolume;
use std::io::Read;
use std::path::Path;

/// Output encoding for rendered volumes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    #[value(alias = "yml")]
    Yaml,
    Json,
}

/// Load a PersistentVolume manifest from a file; `-` reads stdin
pub fn load_persistent_volume(path: impl AsRef<Path>) -> Result<PersistentVolume> {
    let path = path.as_ref();
    if path == Path::new("-") {
        return read_persistent_volume(std::io::stdin().lock());
    }
    let raw = std::fs::read_to_string(path)?;
    parse_persistent_volume(&raw)
}

/// Read a PersistentVolume manifest from any reader
pub fn read_persistent_volume(mut reader: impl Read) -> Result<PersistentVolume> {
    let mut raw = String::new();
    reader.read_to_string(&mut raw)?;
    parse_persistent_volume(&raw)
}

/// Parse a YAML or JSON manifest; JSON is accepted as a subset of YAML
pub fn parse_persistent_volume(raw: &str) -> Result<PersistentVolume> {
    if raw.trim().is_empty() {
        return Err(Error::InvalidInput("empty persistent volume manifest".into()));
    }
    Ok(serde_yaml::from_str(raw)?)
}

/// Render a volume in the requested format
pub fn render_persistent_volume(pv: &PersistentVolume, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => Ok(serde_yaml::to_string(pv)?),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(pv)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    const GCE_PV_YAML: &str = r#"
apiVersion: v1
kind: PersistentVolume
metadata:
  name: gce-pv
  labels:
    topology.kubernetes.io/zone: us-central1-a
spec:
  capacity:
    storage: 10Gi
  accessModes:
    - ReadWriteOnce
  gcePersistentDisk:
    pdName: my-disk
    fsType: ext4
"#;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(GCE_PV_YAML.as_bytes()).unwrap();

        let pv = load_persistent_volume(file.path()).unwrap();
        assert_eq!(pv.metadata.name.as_deref(), Some("gce-pv"));
        let gce = pv.spec.unwrap().gce_persistent_disk.unwrap();
        assert_eq!(gce.pd_name, "my-disk");
    }

    #[test]
    fn test_render_json() {
        let pv = parse_persistent_volume(GCE_PV_YAML).unwrap();
        let json = render_persistent_volume(&pv, OutputFormat::Json).unwrap();
        assert!(json.contains("\"pdName\": \"my-disk\""));

        let reparsed = parse_persistent_volume(&json).unwrap();
        assert_eq!(reparsed, pv);
    }

    #[test]
    fn test_empty_manifest() {
        assert_matches!(
            read_persistent_volume("   \n".as_bytes()),
            Err(Error::InvalidInput(_))
        );
    }

    #[test]
    fn test_output_format_parse() {
        use clap::ValueEnum;

        assert_eq!(OutputFormat::from_str("JSON", true).unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("yml", false).unwrap(), OutputFormat::Yaml);
        assert!(OutputFormat::from_str("toml", true).is_err());
    }
}
