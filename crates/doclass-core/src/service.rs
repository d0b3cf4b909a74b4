//! File classification: extract text, then predict its label.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::classifier::{DocumentClassifier, TextClassifier};
use crate::error::{ExtractionError, Result};
use crate::extract::{extension_of, TextExtractor};
use crate::models::DoclassConfig;
use crate::synth::IndustryRegistry;

/// Prefix of every failed classification result.
pub const ERROR_PREFIX: &str = "Error: ";

/// Classifies uploaded files with a shared, read-only classifier.
#[derive(Clone)]
pub struct ClassificationService {
    classifier: Arc<dyn DocumentClassifier>,
    extractor: TextExtractor,
}

impl ClassificationService {
    pub fn new(classifier: Arc<dyn DocumentClassifier>, extractor: TextExtractor) -> Self {
        Self {
            classifier,
            extractor,
        }
    }

    /// Service over the artifact in `config.classifier.model_dir`.
    ///
    /// A missing or broken artifact does not fail construction; every
    /// classification then reports the classifier as not ready.
    pub fn from_config(config: &DoclassConfig, registry: Arc<IndustryRegistry>) -> Result<Self> {
        let classifier = TextClassifier::from_config(&config.classifier, registry);
        if classifier.outcome().is_failed() {
            warn!("Serving without a usable model: {}", classifier.outcome());
        }
        let extractor = TextExtractor::from_config(&config.extraction)?;
        Ok(Self::new(Arc::new(classifier), extractor))
    }

    /// Label of the file, or the error that prevented classification.
    pub fn try_classify(&self, bytes: &[u8], filename: &str) -> Result<String> {
        let ext = extension_of(filename);
        let text = self.extractor.extract_text(bytes, &ext)?;
        if text.trim().is_empty() {
            return Err(ExtractionError::EmptyText.into());
        }
        debug!("Extracted {} characters from {}", text.len(), filename);

        self.classifier.predict(&text)
    }

    /// Label of the file, or an error message starting with [`ERROR_PREFIX`].
    ///
    /// Never fails: the job layer stores whatever string comes back.
    pub fn classify(&self, bytes: &[u8], filename: &str) -> String {
        match self.try_classify(bytes, filename) {
            Ok(label) => label,
            Err(e) => {
                warn!("Failed to classify {}: {}", filename, e);
                format!("{ERROR_PREFIX}{e}")
            }
        }
    }
}
