//! Error types for the inference layer.

use thiserror::Error;

/// Errors that can occur while running or training a model.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// Failed to load the model file.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Failed to serialize the model.
    #[error("failed to save model: {0}")]
    ModelSave(String),

    /// Invalid input tensor shape.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A batch referenced a class the model has no output for.
    #[error("class id {id} out of range for {num_classes} classes")]
    ClassOutOfRange { id: usize, num_classes: usize },

    /// I/O error when reading or writing model files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
