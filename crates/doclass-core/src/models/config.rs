//! Configuration structures for training and serving.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for doclass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DoclassConfig {
    /// Classifier configuration.
    pub classifier: ClassifierConfig,

    /// Training configuration.
    pub training: TrainingConfig,

    /// Text extraction configuration.
    pub extraction: ExtractionConfig,

    /// Job queue configuration.
    pub jobs: JobsConfig,
}

/// Which model to serve and where it lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Directory holding the trained artifact.
    pub model_dir: PathBuf,

    /// Base model preset used when no trained artifact exists.
    pub base_model: String,

    /// Industry whose document types the classifier is trained on.
    pub industry: String,

    /// Number of output classes for a freshly initialized base model.
    pub num_labels: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("model"),
            base_model: "hashed-linear-base".to_string(),
            industry: "finance".to_string(),
            num_labels: 3,
        }
    }
}

/// Training loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of synthetic documents to generate.
    pub num_samples: usize,

    /// Passes over the training split.
    pub epochs: usize,

    /// Documents per gradient step.
    pub batch_size: usize,

    /// SGD step size.
    pub learning_rate: f32,

    /// L2 penalty applied to the weights.
    pub weight_decay: f32,

    /// Apply scanning/typing noise to generated documents.
    pub add_noise: bool,

    /// Seed for reproducible corpora (random when unset).
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            num_samples: 1000,
            epochs: 2,
            batch_size: 8,
            learning_rate: 0.5,
            weight_decay: 1e-4,
            add_noise: true,
            seed: None,
        }
    }
}

/// Text extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Below this many non-whitespace characters a PDF is treated as scanned.
    pub min_pdf_text_chars: usize,

    /// Directory with OCR models (used with the `ocr` feature).
    pub ocr_model_dir: Option<PathBuf>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_pdf_text_chars: 20,
            ocr_model_dir: None,
        }
    }
}

/// Job queue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    /// Maximum number of jobs classified at once.
    pub workers: usize,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

impl DoclassConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
