//! Error types for CSI translation
//!
//! Dispatch errors (invalid input, missing translator) are raised by the
//! translator itself; translation errors come verbatim from the in-tree
//! plugin that rejected the volume.

use thiserror::Error;

/// Unified error type for the translation library
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Dispatch Errors
    // =========================================================================
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Could not find in-tree plugin translation logic for {what}")]
    NoTranslatorFound { what: String },

    // =========================================================================
    // Plugin Errors
    // =========================================================================
    #[error("Translation failed for driver {driver}: {reason}")]
    Translation { driver: String, reason: String },

    // =========================================================================
    // Registration Errors
    // =========================================================================
    #[error("Translator already registered: {driver}")]
    DuplicateTranslator { driver: String },

    #[error("In-tree plugin already migrated by another translator: {name}")]
    DuplicateInTreePlugin { name: String },

    #[error("Volume {volume} is claimed by more than one translator: {drivers:?}")]
    AmbiguousTranslators { volume: String, drivers: Vec<String> },

    #[error("Unknown in-tree plugin: {name}")]
    UnknownPlugin { name: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Environment Errors
    // =========================================================================
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or structurally incomplete volume
    InvalidInput,
    /// No registered translator claims the volume
    NoTranslatorFound,
    /// A translator rejected the volume content
    Translation,
    /// The translator set itself is inconsistent
    Registration,
    /// Cluster access, file or parse failures outside the core
    Environment,
}

impl Error {
    /// Shorthand for a plugin-side translation failure
    pub fn translation(driver: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Translation {
            driver: driver.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::NoTranslatorFound { .. } => ErrorKind::NoTranslatorFound,
            Error::Translation { .. } => ErrorKind::Translation,
            Error::DuplicateTranslator { .. }
            | Error::DuplicateInTreePlugin { .. }
            | Error::AmbiguousTranslators { .. }
            | Error::UnknownPlugin { .. }
            | Error::Configuration(_) => ErrorKind::Registration,
            Error::Kube(_)
            | Error::JsonParse(_)
            | Error::YamlParse(_)
            | Error::Io(_)
            | Error::Metrics(_) => ErrorKind::Environment,
        }
    }

    /// Check if this error is retryable
    ///
    /// Dispatch and translation failures never succeed on retry without a
    /// change to the input or the registered translator set.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Kube(_) | Error::Io(_))
    }
}

/// Result type alias for the translation library
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = Error::InvalidInput("persistent volume was nil".into());
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = Error::NoTranslatorFound {
            what: "pv-1".into(),
        };
        assert_eq!(err.kind(), ErrorKind::NoTranslatorFound);

        let err = Error::translation("pd.csi.storage.gke.io", "bad handle");
        assert_eq!(err.kind(), ErrorKind::Translation);

        let err = Error::DuplicateTranslator {
            driver: "ebs.csi.aws.com".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Registration);

        let err = Error::DuplicateInTreePlugin {
            name: "kubernetes.io/aws-ebs".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Registration);
    }

    #[test]
    fn test_error_retryable() {
        let dispatch = Error::NoTranslatorFound {
            what: "unknown.csi.driver".into(),
        };
        assert!(!dispatch.is_retryable());

        let translation = Error::translation("cinder.csi.openstack.org", "no source");
        assert!(!translation.is_retryable());

        let io = Error::Io(std::io::Error::new(std::io::ErrorKind::Interrupted, "eintr"));
        assert!(io.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = Error::translation("ebs.csi.aws.com", "volume ID is empty");
        assert_eq!(
            err.to_string(),
            "Translation failed for driver ebs.csi.aws.com: volume ID is empty"
        );
    }
}
