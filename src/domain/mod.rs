//! Domain layer - Translator port definitions
//!
//! This module defines the core trait (port) that in-tree plugin adapters
//! implement, following hexagonal architecture principles.

pub mod ports;

pub use ports::*;
