//! Data models shared across the pipeline.

pub mod config;

pub use config::{ClassifierConfig, DoclassConfig, ExtractionConfig, JobsConfig, TrainingConfig};
