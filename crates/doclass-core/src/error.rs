//! Error types for the doclass-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the doclass library.
#[derive(Error, Debug)]
pub enum DoclassError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Artifact loading error.
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// Label encoding error.
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Text extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Prediction precondition not met.
    #[error("prediction error: {0}")]
    Prediction(#[from] PredictionError),

    /// Training error.
    #[error("training error: {0}")]
    Training(#[from] TrainingError),

    /// Inference error from the model layer.
    #[error("inference error: {0}")]
    Inference(#[from] doclass_inference::InferenceError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while wiring up factories and classifiers.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The industry has never been registered.
    #[error("industry not registered: {0}")]
    UnknownIndustry(String),

    /// The industry is registered with no document types.
    #[error("no document generators defined for industry: {0}")]
    EmptyGeneratorSet(String),

    /// The base model identifier does not name a known preset.
    #[error("unknown base model: {0}")]
    UnknownBaseModel(String),

    /// A numeric parameter is out of its valid range.
    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Errors related to loading a persisted artifact.
#[derive(Error, Debug)]
pub enum LoadError {
    /// A required bundle member is absent.
    #[error("{member} file not found at: {}", path.display())]
    MissingMember { member: &'static str, path: PathBuf },

    /// A bundle member could not be parsed.
    #[error("corrupt {member}: {reason}")]
    Corrupt { member: &'static str, reason: String },

    /// Bundle members disagree with each other.
    #[error("inconsistent artifact: {0}")]
    Inconsistent(String),
}

/// Errors related to label encoding.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EncodingError {
    /// Decode or transform attempted before `fit`.
    #[error("label encoder has not been fitted")]
    NotFitted,

    /// Class id outside `[0, num_classes)`.
    #[error("class id {id} out of range for {num_classes} classes")]
    UnknownClassId { id: usize, num_classes: usize },

    /// Label that was not seen during `fit`.
    #[error("label not seen during fit: {0}")]
    UnknownLabel(String),
}

/// Errors related to turning uploaded bytes into text.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The file extension has no extractor.
    #[error("Unsupported file type. Extension: {0}")]
    UnsupportedExtension(String),

    /// The file could not be parsed.
    #[error("failed to parse {format}: {reason}")]
    Parse { format: &'static str, reason: String },

    /// OCR was needed but no engine is configured.
    #[error("OCR engine not available")]
    OcrUnavailable,

    /// OCR engine failed.
    #[error("OCR failed: {0}")]
    Ocr(String),

    /// Extraction succeeded but produced no text.
    #[error("no text could be extracted")]
    EmptyText,
}

/// Errors raised when a classifier is asked to predict before it is ready.
#[derive(Error, Debug)]
pub enum PredictionError {
    /// No model weights are loaded.
    #[error("classifier model not loaded")]
    ModelNotLoaded,

    /// No label encoder is loaded.
    #[error("Label encoder not loaded.")]
    LabelEncoderNotLoaded,

    /// The model produced no scores.
    #[error("model produced no scores")]
    NoScores,
}

/// Errors raised by the training loop.
#[derive(Error, Debug)]
pub enum TrainingError {
    /// Not enough samples to build both splits.
    #[error("need at least {required} samples, got {actual}")]
    TooFewSamples { required: usize, actual: usize },

    /// Texts and labels differ in length.
    #[error("{texts} texts but {labels} labels")]
    Misaligned { texts: usize, labels: usize },
}

/// Result type for the doclass library.
pub type Result<T> = std::result::Result<T, DoclassError>;
