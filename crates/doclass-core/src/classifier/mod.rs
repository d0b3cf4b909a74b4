//! Document classifier: encoding, training, persistence and prediction.
//!
//! A classifier owns exactly one artifact (model, preprocessor, label
//! encoder). Its lifecycle is load (fine-tuned bundle or base preset),
//! optionally train, optionally save, then predict.

mod artifact;
mod dataset;
mod label_encoder;
mod preprocessor;
mod text;
mod trainer;

use std::path::{Path, PathBuf};

pub use artifact::{Artifact, LABEL_ENCODER_FILE, MODEL_FILE, PREPROCESSOR_FILE};
pub use dataset::EncodedDataset;
pub use label_encoder::LabelEncoder;
pub use preprocessor::{PreprocessorConfig, TextPreprocessor};
pub use text::TextClassifier;
pub use trainer::{EpochMetrics, TrainingOptions, TrainingReport};

use crate::error::{ConfigError, Result};
use crate::models::{ClassifierConfig, TrainingConfig};

/// Default base preset.
pub const DEFAULT_BASE_MODEL: &str = "hashed-linear-base";

/// Built-in base models and the preprocessor each one uses.
const BASE_MODELS: &[(&str, usize)] = &[("hashed-linear-base", 4096), ("hashed-linear-large", 16384)];

/// Preprocessor settings for a named base model.
pub fn resolve_base_model(name: &str) -> std::result::Result<PreprocessorConfig, ConfigError> {
    BASE_MODELS
        .iter()
        .find(|(preset, _)| *preset == name)
        .map(|&(_, num_features)| PreprocessorConfig {
            num_features,
            ..PreprocessorConfig::default()
        })
        .ok_or_else(|| ConfigError::UnknownBaseModel(name.to_string()))
}

/// Names of the built-in base models.
pub fn base_models() -> impl Iterator<Item = &'static str> {
    BASE_MODELS.iter().map(|(name, _)| *name)
}

/// What a classifier is: base model, output width and training industry.
///
/// Variants such as the finance classifier are values of this type rather
/// than separate implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierSpec {
    pub base_model: String,
    pub num_labels: usize,
    pub industry: String,
}

impl Default for ClassifierSpec {
    fn default() -> Self {
        Self {
            base_model: DEFAULT_BASE_MODEL.to_string(),
            num_labels: 3,
            industry: "finance".to_string(),
        }
    }
}

impl ClassifierSpec {
    /// Finance documents: invoices, bank statements, driver's licenses.
    pub fn finance() -> Self {
        Self::default()
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = industry.into();
        self
    }
}

impl From<&ClassifierConfig> for ClassifierSpec {
    fn from(config: &ClassifierConfig) -> Self {
        Self {
            base_model: config.base_model.clone(),
            num_labels: config.num_labels,
            industry: config.industry.clone(),
        }
    }
}

/// How a `load` call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A trained bundle was loaded; prediction is available.
    FineTuned { path: PathBuf, classes: Vec<String> },
    /// A base preset was initialised; prediction needs training first.
    Base { model: String },
    /// Loading failed; the classifier is unusable until retrained.
    Failed { source: String, reason: String },
}

impl LoadOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl std::fmt::Display for LoadOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FineTuned { path, classes } => write!(
                f,
                "fine-tuned model from {} ({})",
                path.display(),
                classes.join(", ")
            ),
            Self::Base { model } => write!(f, "base model {model}"),
            Self::Failed { source, reason } => {
                write!(f, "Unable to load model from {source}: {reason}")
            }
        }
    }
}

/// Parameters of one training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainParams {
    pub num_samples: usize,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f32,
    pub weight_decay: f32,
    pub add_noise: bool,
    pub seed: Option<u64>,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self::from(&TrainingConfig::default())
    }
}

impl From<&TrainingConfig> for TrainParams {
    fn from(config: &TrainingConfig) -> Self {
        Self {
            num_samples: config.num_samples,
            epochs: config.epochs,
            batch_size: config.batch_size,
            learning_rate: config.learning_rate,
            weight_decay: config.weight_decay,
            add_noise: config.add_noise,
            seed: config.seed,
        }
    }
}

impl TrainParams {
    pub(crate) fn options(&self) -> TrainingOptions {
        TrainingOptions {
            epochs: self.epochs,
            batch_size: self.batch_size,
            learning_rate: self.learning_rate,
            weight_decay: self.weight_decay,
        }
    }
}

/// Operations every document classifier provides.
pub trait DocumentClassifier: Send + Sync {
    /// Load a fine-tuned bundle from `path_or_name`, or initialise the
    /// named base model when no such path exists. Failures are reported in
    /// the outcome, never returned as errors.
    fn load(&mut self, path_or_name: &str) -> LoadOutcome;

    /// Persist the current artifact to `path`.
    fn save(&self, path: &Path) -> Result<()>;

    /// Encode texts and fit a fresh label encoder over `labels`.
    fn preprocessing(
        &self,
        texts: &[String],
        labels: &[String],
    ) -> Result<(EncodedDataset, LabelEncoder)>;

    /// Train on a freshly generated synthetic corpus and persist the result.
    fn train(&mut self, params: &TrainParams) -> Result<TrainingReport>;

    /// Predict the label of `text`.
    fn predict(&self, text: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_base_models() {
        assert_eq!(resolve_base_model("hashed-linear-base").unwrap().num_features, 4096);
        assert_eq!(resolve_base_model("hashed-linear-large").unwrap().num_features, 16384);
        assert!(matches!(
            resolve_base_model("distilbert-base-uncased"),
            Err(ConfigError::UnknownBaseModel(_))
        ));
    }

    #[test]
    fn test_default_spec_matches_config() {
        let spec = ClassifierSpec::from(&ClassifierConfig::default());
        assert_eq!(spec, ClassifierSpec::finance());
        assert!(resolve_base_model(&spec.base_model).is_ok());
    }

    #[test]
    fn test_default_train_params() {
        let params = TrainParams::default();
        assert_eq!(params.num_samples, 1000);
        assert_eq!(params.epochs, 2);
        assert_eq!(params.batch_size, 8);
    }
}
