//! Translation Metrics
//!
//! Prometheus counters for dispatch outcomes, kept on a dedicated registry
//! so embedding applications decide where (and whether) to expose them.

use crate::error::{Error, ErrorKind, Result};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Translation direction label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    ToCsi,
    ToInTree,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::ToCsi => "to_csi",
            Direction::ToInTree => "to_in_tree",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome label for a single dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Success,
    InvalidInput,
    NoTranslator,
    Error,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::InvalidInput => "invalid_input",
            Outcome::NoTranslator => "no_translator",
            Outcome::Error => "error",
        }
    }

    pub fn from_error(err: &Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidInput => Outcome::InvalidInput,
            ErrorKind::NoTranslatorFound => Outcome::NoTranslator,
            _ => Outcome::Error,
        }
    }

    pub fn of<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Outcome::Success,
            Err(e) => Self::from_error(e),
        }
    }
}

/// Dispatch counters
#[derive(Clone)]
pub struct TranslationMetrics {
    registry: Registry,
    requests: IntCounterVec,
}

impl TranslationMetrics {
    /// Create counters on a fresh registry
    pub fn new() -> Result<Self> {
        Self::with_registry(Registry::new())
    }

    /// Create counters on an existing registry
    pub fn with_registry(registry: Registry) -> Result<Self> {
        let requests = IntCounterVec::new(
            Opts::new(
                "csi_translation_requests_total",
                "Translation requests by direction, driver and outcome",
            ),
            &["direction", "driver", "outcome"],
        )?;
        registry.register(Box::new(requests.clone()))?;

        Ok(Self { registry, requests })
    }

    /// Record one dispatch; `driver` is empty when no translator was reached
    pub fn record(&self, direction: Direction, driver: &str, outcome: Outcome) {
        self.requests
            .with_label_values(&[direction.as_str(), driver, outcome.as_str()])
            .inc();
    }

    /// Current count for a label combination
    pub fn count(&self, direction: Direction, driver: &str, outcome: Outcome) -> u64 {
        self.requests
            .with_label_values(&[direction.as_str(), driver, outcome.as_str()])
            .get()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render all metrics in the Prometheus text format
    pub fn gather_text(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| Error::Configuration(format!("metrics output is not UTF-8: {}", e)))
    }
}

impl std::fmt::Debug for TranslationMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationMetrics").finish_non_exhaustive()
    }
}
