//! Encoded training data: feature rows with their class ids.

use ndarray::{s, Array2};

use doclass_inference::InputTensor;

use crate::error::TrainingError;

/// Feature matrix and class ids, one row per document.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedDataset {
    features: Array2<f32>,
    labels: Vec<usize>,
}

impl EncodedDataset {
    pub fn new(features: Array2<f32>, labels: Vec<usize>) -> Result<Self, TrainingError> {
        if features.nrows() != labels.len() {
            return Err(TrainingError::Misaligned {
                texts: features.nrows(),
                labels: labels.len(),
            });
        }
        Ok(Self { features, labels })
    }

    pub fn features(&self) -> &Array2<f32> {
        &self.features
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Split into `[0, index)` and `[index, len)` without reordering.
    pub fn split_at(&self, index: usize) -> (Self, Self) {
        let index = index.min(self.len());
        let head = Self {
            features: self.features.slice(s![..index, ..]).to_owned(),
            labels: self.labels[..index].to_vec(),
        };
        let tail = Self {
            features: self.features.slice(s![index.., ..]).to_owned(),
            labels: self.labels[index..].to_vec(),
        };
        (head, tail)
    }

    /// Consecutive batches of at most `batch_size` rows, in order.
    pub fn batches(&self, batch_size: usize) -> impl Iterator<Item = (InputTensor, &[usize])> + '_ {
        let batch_size = batch_size.max(1);
        (0..self.len()).step_by(batch_size).map(move |start| {
            let end = (start + batch_size).min(self.len());
            let rows = self.features.slice(s![start..end, ..]).to_owned();
            (InputTensor::Float32(rows), &self.labels[start..end])
        })
    }

    /// The whole dataset as one input tensor.
    pub fn as_input(&self) -> InputTensor {
        InputTensor::Float32(self.features.clone())
    }
}
