//! Supervised training loop for trainable backends.

use std::path::PathBuf;

use doclass_inference::{argmax, TrainableBackend};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::dataset::EncodedDataset;
use crate::error::{ConfigError, Result};

/// Optimiser settings for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingOptions {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f32,
    pub weight_decay: f32,
}

impl TrainingOptions {
    fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.epochs == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "epochs",
                reason: "must be positive".to_string(),
            });
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "batch_size",
                reason: "must be positive".to_string(),
            });
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "learning_rate",
                reason: format!("must be a positive number, got {}", self.learning_rate),
            });
        }
        if !(self.weight_decay.is_finite() && self.weight_decay >= 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "weight_decay",
                reason: format!("must be non-negative, got {}", self.weight_decay),
            });
        }
        Ok(())
    }
}

/// Metrics recorded at the end of one epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Mean batch loss over the training split.
    pub train_loss: f32,
    /// Loss on the evaluation split; `None` when it is empty.
    pub eval_loss: Option<f32>,
    /// Fraction of evaluation samples predicted correctly.
    pub eval_accuracy: Option<f32>,
}

/// Outcome of a completed training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub epochs: Vec<EpochMetrics>,
    /// Epoch whose weights were kept.
    pub best_epoch: usize,
    /// Label classes, indexed by class id.
    pub classes: Vec<String>,
    pub train_samples: usize,
    pub eval_samples: usize,
    /// Where the artifact was written.
    pub artifact_dir: PathBuf,
}

impl TrainingReport {
    /// Metrics of the kept epoch.
    pub fn best(&self) -> Option<&EpochMetrics> {
        self.epochs.iter().find(|m| m.epoch == self.best_epoch)
    }
}

/// Result of [`fit`]: per-epoch history and the epoch that was kept.
#[derive(Debug, Clone)]
pub struct FitSummary {
    pub epochs: Vec<EpochMetrics>,
    pub best_epoch: usize,
}

/// Train `model` on `train` for `options.epochs` passes.
///
/// After each epoch the model is scored on `eval`. The weights of the epoch
/// with the highest eval accuracy (lower eval loss breaks ties) are
/// restored into `model` at the end. With an empty eval split the last
/// epoch is kept.
pub fn fit<B>(
    model: &mut B,
    train: &EncodedDataset,
    eval: &EncodedDataset,
    options: &TrainingOptions,
) -> Result<FitSummary>
where
    B: TrainableBackend + Clone,
{
    options.validate()?;

    let mut history = Vec::with_capacity(options.epochs);
    let mut best: Option<(EpochMetrics, B)> = None;

    for epoch in 1..=options.epochs {
        let mut total_loss = 0.0f32;
        let mut batches = 0usize;
        for (input, targets) in train.batches(options.batch_size) {
            total_loss += model.fit_batch(
                &input,
                targets,
                options.learning_rate,
                options.weight_decay,
            )?;
            batches += 1;
        }
        let train_loss = if batches > 0 {
            total_loss / batches as f32
        } else {
            0.0
        };

        let (eval_loss, eval_accuracy) = if eval.is_empty() {
            (None, None)
        } else {
            let (loss, accuracy) = evaluate(model, eval)?;
            (Some(loss), Some(accuracy))
        };

        let metrics = EpochMetrics {
            epoch,
            train_loss,
            eval_loss,
            eval_accuracy,
        };
        info!(
            "Epoch {}/{}: train_loss={:.4} eval_loss={} eval_accuracy={}",
            epoch,
            options.epochs,
            train_loss,
            fmt_metric(eval_loss),
            fmt_metric(eval_accuracy)
        );

        let improved = match &best {
            None => true,
            Some((kept, _)) => is_better(&metrics, kept),
        };
        if improved {
            debug!("Keeping weights from epoch {}", epoch);
            best = Some((metrics.clone(), model.clone()));
        }
        history.push(metrics);
    }

    let best_epoch = match best {
        Some((metrics, weights)) => {
            *model = weights;
            metrics.epoch
        }
        None => options.epochs,
    };

    Ok(FitSummary {
        epochs: history,
        best_epoch,
    })
}

/// Mean loss and accuracy of `model` on `data`.
pub fn evaluate<B: TrainableBackend>(model: &B, data: &EncodedDataset) -> Result<(f32, f32)> {
    let input = data.as_input();
    let loss = model.loss(&input, data.labels())?;

    let logits = model.run(&input)?;
    let correct = logits
        .as_f32()
        .rows()
        .into_iter()
        .zip(data.labels())
        .filter(|(row, label)| argmax(row.view()) == Some(**label))
        .count();

    Ok((loss, correct as f32 / data.len().max(1) as f32))
}

fn is_better(candidate: &EpochMetrics, kept: &EpochMetrics) -> bool {
    match (candidate.eval_accuracy, kept.eval_accuracy) {
        (Some(a), Some(b)) if a != b => a > b,
        (Some(_), Some(_)) => candidate.eval_loss < kept.eval_loss,
        // No eval split: the latest epoch wins.
        _ => true,
    }
}

fn fmt_metric(value: Option<f32>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use doclass_inference::{InferenceBackend, LinearBackend};
    use ndarray::array;

    fn toy() -> EncodedDataset {
        let features = array![
            [1.0f32, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.9, 0.1, 0.0],
            [0.1, 0.9, 0.0],
            [0.0, 0.1, 0.9],
        ];
        EncodedDataset::new(features, vec![0, 1, 2, 0, 1, 2]).unwrap()
    }

    fn options(epochs: usize) -> TrainingOptions {
        TrainingOptions {
            epochs,
            batch_size: 2,
            learning_rate: 0.5,
            weight_decay: 0.0,
        }
    }

    #[test]
    fn test_fit_learns_separable_data() {
        let data = toy();
        let mut model = LinearBackend::zeros(3, 3);

        let summary = fit(&mut model, &data, &data, &options(30)).unwrap();
        assert_eq!(summary.epochs.len(), 30);

        let (_, accuracy) = evaluate(&model, &data).unwrap();
        assert_eq!(accuracy, 1.0);
        assert_eq!(model.num_classes(), 3);
    }

    #[test]
    fn test_best_epoch_metrics_are_kept() {
        let data = toy();
        let mut model = LinearBackend::zeros(3, 3);

        let summary = fit(&mut model, &data, &data, &options(5)).unwrap();
        let kept = summary
            .epochs
            .iter()
            .find(|m| m.epoch == summary.best_epoch)
            .unwrap();

        let (loss, accuracy) = evaluate(&model, &data).unwrap();
        assert!((kept.eval_loss.unwrap() - loss).abs() < 1e-5);
        assert_eq!(kept.eval_accuracy.unwrap(), accuracy);
    }

    #[test]
    fn test_empty_eval_keeps_last_epoch() {
        let data = toy();
        let (empty, _) = data.split_at(0);
        let mut model = LinearBackend::zeros(3, 3);

        let summary = fit(&mut model, &data, &empty, &options(3)).unwrap();
        assert_eq!(summary.best_epoch, 3);
        assert!(summary.epochs.iter().all(|m| m.eval_loss.is_none()));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let data = toy();
        let mut model = LinearBackend::zeros(3, 3);
        let bad = TrainingOptions {
            batch_size: 0,
            ..options(1)
        };
        assert!(fit(&mut model, &data, &data, &bad).is_err());
    }
}
