//! Softmax linear classifier over dense feature vectors.

use std::path::Path;

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{softmax, InferenceBackend, TrainableBackend};
use crate::error::InferenceError;
use crate::tensor::{InputTensor, OutputTensor};
use crate::Result;

/// Smallest probability fed into the log when computing the loss.
const MIN_PROB: f32 = 1e-12;

/// Linear model `logits = x · Wᵀ + b`, trained with softmax cross-entropy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearBackend {
    /// `[classes, features]`
    weights: Array2<f32>,
    /// `[classes]`
    bias: Array1<f32>,
}

impl LinearBackend {
    /// Create an untrained model with all weights at zero.
    pub fn zeros(num_features: usize, num_classes: usize) -> Self {
        Self {
            weights: Array2::zeros((num_classes, num_features)),
            bias: Array1::zeros(num_classes),
        }
    }

    /// Build a model from existing weights, checking the shapes agree.
    pub fn from_parts(weights: Array2<f32>, bias: Array1<f32>) -> Result<Self> {
        if weights.nrows() != bias.len() {
            return Err(InferenceError::InvalidInput(format!(
                "weights have {} rows but bias has {} entries",
                weights.nrows(),
                bias.len()
            )));
        }
        Ok(Self { weights, bias })
    }

    /// Load a model from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading linear model from: {}", path.display());

        let content = std::fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&content)
            .map_err(|e| InferenceError::ModelLoad(e.to_string()))?;

        // Deserialized arrays bypass `from_parts`, so re-check here.
        Self::from_parts(model.weights, model.bias)
    }

    /// Write the model to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            serde_json::to_string(self).map_err(|e| InferenceError::ModelSave(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Borrow the weight matrix.
    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    /// Borrow the bias vector.
    pub fn bias(&self) -> &Array1<f32> {
        &self.bias
    }

    fn logits(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        if x.ncols() != self.num_features() {
            return Err(InferenceError::InvalidInput(format!(
                "expected {} features, got {}",
                self.num_features(),
                x.ncols()
            )));
        }
        Ok(x.dot(&self.weights.t()) + &self.bias)
    }

    fn check_targets(&self, x: &Array2<f32>, targets: &[usize]) -> Result<()> {
        if targets.len() != x.nrows() {
            return Err(InferenceError::InvalidInput(format!(
                "{} rows but {} targets",
                x.nrows(),
                targets.len()
            )));
        }
        if let Some(&id) = targets.iter().find(|&&t| t >= self.num_classes()) {
            return Err(InferenceError::ClassOutOfRange {
                id,
                num_classes: self.num_classes(),
            });
        }
        Ok(())
    }

    /// Row-wise softmax probabilities and the mean loss of a batch.
    fn probabilities(&self, x: &Array2<f32>, targets: &[usize]) -> Result<(Array2<f32>, f32)> {
        self.check_targets(x, targets)?;
        let mut probs = self.logits(x)?;
        let mut loss = 0.0f32;

        for (mut row, &target) in probs.axis_iter_mut(Axis(0)).zip(targets) {
            let p = softmax(row.view());
            loss -= p[target].max(MIN_PROB).ln();
            row.assign(&p);
        }

        let n = targets.len().max(1) as f32;
        Ok((probs, loss / n))
    }
}

impl InferenceBackend for LinearBackend {
    fn run(&self, input: &InputTensor) -> Result<OutputTensor> {
        let logits = self.logits(input.as_f32())?;
        Ok(OutputTensor::Float32(logits))
    }

    fn num_features(&self) -> usize {
        self.weights.ncols()
    }

    fn num_classes(&self) -> usize {
        self.weights.nrows()
    }
}

impl TrainableBackend for LinearBackend {
    fn fit_batch(
        &mut self,
        input: &InputTensor,
        targets: &[usize],
        learning_rate: f32,
        weight_decay: f32,
    ) -> Result<f32> {
        let x = input.as_f32();
        if targets.is_empty() {
            return Ok(0.0);
        }

        let (mut grad, loss) = self.probabilities(x, targets)?;
        for (i, &target) in targets.iter().enumerate() {
            grad[[i, target]] -= 1.0;
        }
        grad /= targets.len() as f32;

        // dL/dW = gradᵀ · x + λW
        let mut dw = grad.t().dot(x);
        dw.scaled_add(weight_decay, &self.weights);
        let db = grad.sum_axis(Axis(0));

        self.weights.scaled_add(-learning_rate, &dw);
        self.bias.scaled_add(-learning_rate, &db);

        Ok(loss)
    }

    fn loss(&self, input: &InputTensor, targets: &[usize]) -> Result<f32> {
        if targets.is_empty() {
            return Ok(0.0);
        }
        let (_, loss) = self.probabilities(input.as_f32(), targets)?;
        Ok(loss)
    }
}
