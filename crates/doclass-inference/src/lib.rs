//! Model layer for doclass.
//!
//! This crate provides the numeric side of document classification:
//! - dense tensor types built on `ndarray`
//! - the `InferenceBackend` trait (features in, logits out)
//! - the `TrainableBackend` extension used by the training loop
//! - `LinearBackend`, a softmax linear classifier persisted as JSON

mod backend;
mod error;
mod tensor;

pub use backend::linear::LinearBackend;
pub use backend::{argmax, softmax, InferenceBackend, TrainableBackend};
pub use error::InferenceError;
pub use tensor::{InputTensor, OutputTensor};

/// Result type for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;
