//! Core library for document classification.
//!
//! This crate provides:
//! - Synthetic training documents (invoices, bank statements, driver's
//!   licenses) with optional scanning noise, grouped by industry
//! - A text classifier with load / save / preprocessing / train / predict
//! - Text extraction from PDF, image, DOCX, XLSX, CSV and plain text files
//! - A classification service and an asynchronous job queue

pub mod classifier;
pub mod error;
pub mod extract;
pub mod jobs;
pub mod models;
pub mod service;
pub mod synth;

pub use classifier::{
    ClassifierSpec, DocumentClassifier, LabelEncoder, LoadOutcome, TextClassifier, TrainParams,
    TrainingReport,
};
pub use error::{DoclassError, Result};
pub use extract::{is_supported_extension, OcrEngine, TextExtractor};
pub use jobs::{JobId, JobQueue, JobStatus};
pub use models::DoclassConfig;
pub use service::ClassificationService;
pub use synth::{Corpus, IndustryRegistry, SyntheticDataFactory};

/// Re-export inference types.
pub use doclass_inference::{InferenceBackend, LinearBackend};
