//! Batch generation

pub mod config;
pub mod generator;

pub use config::{ErrorPolicy, GeneratorConfig};
pub use generator::{BatchSummary, GeneratedScene, Generator, RenderedScene};
