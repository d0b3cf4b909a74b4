//! Tensor types for inference input/output.

use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::{InferenceError, Result};

/// Input tensor for inference: one feature row per document.
#[derive(Debug, Clone)]
pub enum InputTensor {
    Float32(Array2<f32>),
}

impl InputTensor {
    /// Get the shape of the tensor as `[batch, features]`.
    pub fn shape(&self) -> &[usize] {
        match self {
            InputTensor::Float32(arr) => arr.shape(),
        }
    }

    /// Create a Float32 tensor from row-major data.
    pub fn from_f32(data: Vec<f32>, rows: usize, cols: usize) -> Result<Self> {
        let arr = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| InferenceError::InvalidInput(e.to_string()))?;
        Ok(InputTensor::Float32(arr))
    }

    /// Wrap a single feature vector as a batch of one.
    pub fn from_row(row: Array1<f32>) -> Self {
        InputTensor::Float32(row.insert_axis(Axis(0)))
    }

    /// Borrow the inner matrix.
    pub fn as_f32(&self) -> &Array2<f32> {
        match self {
            InputTensor::Float32(arr) => arr,
        }
    }
}

/// Output tensor from inference: one logit row per document.
#[derive(Debug, Clone)]
pub enum OutputTensor {
    Float32(Array2<f32>),
}

impl OutputTensor {
    /// Get the shape of the tensor as `[batch, classes]`.
    pub fn shape(&self) -> &[usize] {
        match self {
            OutputTensor::Float32(arr) => arr.shape(),
        }
    }

    /// Borrow the inner matrix.
    pub fn as_f32(&self) -> &Array2<f32> {
        match self {
            OutputTensor::Float32(arr) => arr,
        }
    }

    /// Logits for one row of the batch.
    pub fn row(&self, index: usize) -> Option<ArrayView1<'_, f32>> {
        let arr = self.as_f32();
        (index < arr.nrows()).then(|| arr.row(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_from_f32_shape_mismatch() {
        assert!(InputTensor::from_f32(vec![1.0, 2.0, 3.0], 2, 2).is_err());
        let tensor = InputTensor::from_f32(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
        assert_eq!(tensor.shape(), &[2, 2]);
    }

    #[test]
    fn test_from_row_adds_batch_axis() {
        let tensor = InputTensor::from_row(array![0.5, 0.25, 0.0]);
        assert_eq!(tensor.shape(), &[1, 3]);
    }

    #[test]
    fn test_output_row_bounds() {
        let output = OutputTensor::Float32(array![[1.0, 2.0]]);
        assert!(output.row(0).is_some());
        assert!(output.row(1).is_none());
    }
}
