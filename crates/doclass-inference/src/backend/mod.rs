//! Inference backend implementations.

pub mod linear;

use ndarray::{Array1, ArrayView1};

use crate::{InputTensor, OutputTensor, Result};

/// Trait for classification backends.
///
/// A backend maps a batch of dense feature rows to a batch of raw class
/// scores (logits). Backends are read-only during inference so a loaded
/// model can be shared between concurrent callers.
pub trait InferenceBackend: Send + Sync {
    /// Run inference on a `[batch, features]` input.
    ///
    /// # Returns
    /// A `[batch, classes]` tensor of logits.
    fn run(&self, input: &InputTensor) -> Result<OutputTensor>;

    /// Width of the feature vectors the model expects.
    fn num_features(&self) -> usize;

    /// Number of output classes.
    fn num_classes(&self) -> usize;
}

/// Backends whose weights can be updated in place.
pub trait TrainableBackend: InferenceBackend {
    /// Apply one gradient step on a batch and return its mean loss.
    fn fit_batch(
        &mut self,
        input: &InputTensor,
        targets: &[usize],
        learning_rate: f32,
        weight_decay: f32,
    ) -> Result<f32>;

    /// Mean cross-entropy loss of a batch without updating weights.
    fn loss(&self, input: &InputTensor, targets: &[usize]) -> Result<f32>;
}

/// Index of the highest score; ties resolve to the lowest index.
///
/// Returns `None` for an empty row.
pub fn argmax(scores: ArrayView1<'_, f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}

/// Numerically stable softmax of one logit row.
pub fn softmax(logits: ArrayView1<'_, f32>) -> Array1<f32> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exp = logits.mapv(|v| (v - max).exp());
    let sum = exp.sum();
    if sum > 0.0 { exp / sum } else { exp }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_argmax_picks_highest() {
        let scores = array![0.1f32, 0.7, 0.2];
        assert_eq!(argmax(scores.view()), Some(1));
    }

    #[test]
    fn test_argmax_ties_resolve_to_lowest_id() {
        let scores = array![0.5f32, 0.9, 0.9, 0.1];
        assert_eq!(argmax(scores.view()), Some(1));

        let flat = array![0.0f32, 0.0, 0.0];
        assert_eq!(argmax(flat.view()), Some(0));
    }

    #[test]
    fn test_argmax_empty() {
        let scores = Array1::<f32>::zeros(0);
        assert_eq!(argmax(scores.view()), None);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(array![1.0f32, 2.0, 3.0].view());
        assert!((probs.sum() - 1.0).abs() < 1e-6);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }
}
