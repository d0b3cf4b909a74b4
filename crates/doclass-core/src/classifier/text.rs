//! Text classifier over hashed word features.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use doclass_inference::{argmax, InferenceBackend, InputTensor, LinearBackend};
use tracing::{debug, error, info, warn};

use super::artifact::{save_bundle, Artifact};
use super::dataset::EncodedDataset;
use super::label_encoder::LabelEncoder;
use super::preprocessor::TextPreprocessor;
use super::trainer::{self, TrainingReport};
use super::{resolve_base_model, ClassifierSpec, DocumentClassifier, LoadOutcome, TrainParams};
use crate::error::{PredictionError, Result, TrainingError};
use crate::models::ClassifierConfig;
use crate::synth::{IndustryRegistry, SyntheticDataFactory};

/// Share of the corpus used for training; the rest is the eval split.
const TRAIN_FRACTION_PERCENT: usize = 80;

/// Softmax linear classifier trained on synthetic documents.
///
/// Loading never fails loudly: a broken artifact leaves the classifier
/// without a model and the reason in [`TextClassifier::outcome`].
#[derive(Debug)]
pub struct TextClassifier {
    spec: ClassifierSpec,
    registry: Arc<IndustryRegistry>,
    output_dir: PathBuf,
    model: Option<LinearBackend>,
    preprocessor: Option<TextPreprocessor>,
    label_encoder: Option<LabelEncoder>,
    outcome: LoadOutcome,
}

impl TextClassifier {
    /// Create a classifier, loading `load_from_path` when it exists and the
    /// configured base model otherwise.
    ///
    /// A path that does not exist yet still becomes the output directory.
    pub fn new(
        spec: ClassifierSpec,
        registry: Arc<IndustryRegistry>,
        load_from_path: Option<&Path>,
    ) -> Self {
        let output_dir = load_from_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("model"));
        let source = match load_from_path {
            Some(path) if path.exists() => path.to_string_lossy().into_owned(),
            Some(path) => {
                debug!(
                    "No artifact at {}, starting from {}",
                    path.display(),
                    spec.base_model
                );
                spec.base_model.clone()
            }
            None => spec.base_model.clone(),
        };

        let mut classifier = Self {
            outcome: LoadOutcome::Base {
                model: spec.base_model.clone(),
            },
            spec,
            registry,
            output_dir,
            model: None,
            preprocessor: None,
            label_encoder: None,
        };
        classifier.load(&source);
        classifier
    }

    /// Create a classifier serving the artifact in `config.model_dir`.
    pub fn from_config(config: &ClassifierConfig, registry: Arc<IndustryRegistry>) -> Self {
        Self::new(ClassifierSpec::from(config), registry, Some(&config.model_dir))
    }

    /// Directory `train` writes the artifact to.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn spec(&self) -> &ClassifierSpec {
        &self.spec
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Result of the most recent load.
    pub fn outcome(&self) -> &LoadOutcome {
        &self.outcome
    }

    /// Whether `predict` can succeed.
    pub fn is_ready(&self) -> bool {
        self.model.is_some() && self.preprocessor.is_some() && self.label_encoder.is_some()
    }

    /// Known labels, empty before training or loading a fine-tuned bundle.
    pub fn classes(&self) -> &[String] {
        self.label_encoder
            .as_ref()
            .map(LabelEncoder::classes)
            .unwrap_or_default()
    }

    /// Class probabilities for `text`, indexed by class id.
    pub fn scores(&self, text: &str) -> Result<Vec<f32>> {
        let (model, preprocessor) = self.loaded()?;
        let input = InputTensor::from_row(preprocessor.encode(text));
        let logits = model.run(&input)?;
        let row = logits.row(0).ok_or(PredictionError::NoScores)?;
        Ok(doclass_inference::softmax(row).to_vec())
    }

    fn loaded(&self) -> Result<(&LinearBackend, &TextPreprocessor)> {
        match (&self.model, &self.preprocessor) {
            (Some(model), Some(preprocessor)) => Ok((model, preprocessor)),
            _ => Err(PredictionError::ModelNotLoaded.into()),
        }
    }

    fn clear(&mut self) {
        self.model = None;
        self.preprocessor = None;
        self.label_encoder = None;
    }

    fn init_base(&mut self, name: &str) -> Result<()> {
        let preprocessor = TextPreprocessor::new(resolve_base_model(name)?)?;
        self.model = Some(LinearBackend::zeros(
            preprocessor.num_features(),
            self.spec.num_labels,
        ));
        self.preprocessor = Some(preprocessor);
        self.label_encoder = None;
        Ok(())
    }
}

impl DocumentClassifier for TextClassifier {
    fn load(&mut self, path_or_name: &str) -> LoadOutcome {
        let path = Path::new(path_or_name);
        self.clear();

        let outcome = if path.exists() {
            match Artifact::load(path) {
                Ok(artifact) => {
                    let classes = artifact.label_encoder.classes().to_vec();
                    self.model = Some(artifact.model);
                    self.preprocessor = Some(artifact.preprocessor);
                    self.label_encoder = Some(artifact.label_encoder);
                    LoadOutcome::FineTuned {
                        path: path.to_path_buf(),
                        classes,
                    }
                }
                Err(e) => LoadOutcome::Failed {
                    source: path_or_name.to_string(),
                    reason: e.to_string(),
                },
            }
        } else {
            match self.init_base(path_or_name) {
                Ok(()) => LoadOutcome::Base {
                    model: path_or_name.to_string(),
                },
                Err(e) => {
                    self.clear();
                    LoadOutcome::Failed {
                        source: path_or_name.to_string(),
                        reason: e.to_string(),
                    }
                }
            }
        };

        match &outcome {
            LoadOutcome::Failed { .. } => error!("Error: {}", outcome),
            _ => info!("Loaded {}", outcome),
        }
        self.outcome = outcome.clone();
        outcome
    }

    fn save(&self, path: &Path) -> Result<()> {
        let (model, preprocessor) = self.loaded()?;
        save_bundle(path, model, preprocessor, self.label_encoder.as_ref())
    }

    fn preprocessing(
        &self,
        texts: &[String],
        labels: &[String],
    ) -> Result<(EncodedDataset, LabelEncoder)> {
        let (_, preprocessor) = self.loaded()?;
        if texts.len() != labels.len() {
            return Err(TrainingError::Misaligned {
                texts: texts.len(),
                labels: labels.len(),
            }
            .into());
        }

        let mut label_encoder = LabelEncoder::new();
        let ids = label_encoder.fit(labels);
        let features = preprocessor.encode_batch(texts);
        debug!(
            "Encoded {} documents into {} features",
            texts.len(),
            preprocessor.num_features()
        );

        Ok((EncodedDataset::new(features, ids)?, label_encoder))
    }

    fn train(&mut self, params: &TrainParams) -> Result<TrainingReport> {
        if self.model.is_none() || self.preprocessor.is_none() {
            warn!(
                "No usable model loaded, initialising base model {}",
                self.spec.base_model
            );
            let base = self.spec.base_model.clone();
            self.init_base(&base)?;
        }

        let mut factory = SyntheticDataFactory::new(
            &self.registry,
            params.num_samples,
            params.add_noise,
            &self.spec.industry,
        )?;
        if let Some(seed) = params.seed {
            factory = factory.with_seed(seed);
        }
        let corpus = factory.generate()?;
        if corpus.len() < 2 {
            return Err(TrainingError::TooFewSamples {
                required: 2,
                actual: corpus.len(),
            }
            .into());
        }

        // One encoder over the whole corpus so both splits share label ids.
        let (dataset, label_encoder) = self.preprocessing(corpus.texts(), corpus.labels())?;
        let (train_split, eval_split) =
            dataset.split_at(dataset.len() * TRAIN_FRACTION_PERCENT / 100);

        // Work on copies so a failed run leaves the loaded state untouched.
        let (mut model, preprocessor) = match (self.model.clone(), self.preprocessor.clone()) {
            (Some(model), Some(preprocessor)) => (model, preprocessor),
            _ => return Err(PredictionError::ModelNotLoaded.into()),
        };
        if model.num_classes() != label_encoder.num_classes()
            || model.num_features() != preprocessor.num_features()
        {
            warn!(
                "Resizing output layer from {} to {} classes",
                model.num_classes(),
                label_encoder.num_classes()
            );
            model = LinearBackend::zeros(preprocessor.num_features(), label_encoder.num_classes());
        }

        info!(
            "Training on {} samples, evaluating on {} ({} epochs, batch size {})",
            train_split.len(),
            eval_split.len(),
            params.epochs,
            params.batch_size
        );
        let summary = trainer::fit(&mut model, &train_split, &eval_split, &params.options())?;

        let output_dir = self.output_dir.clone();
        save_bundle(&output_dir, &model, &preprocessor, Some(&label_encoder))?;

        let classes = label_encoder.classes().to_vec();
        self.model = Some(model);
        self.preprocessor = Some(preprocessor);
        self.label_encoder = Some(label_encoder);
        self.outcome = LoadOutcome::FineTuned {
            path: output_dir.clone(),
            classes: classes.clone(),
        };

        Ok(TrainingReport {
            epochs: summary.epochs,
            best_epoch: summary.best_epoch,
            classes,
            train_samples: train_split.len(),
            eval_samples: eval_split.len(),
            artifact_dir: output_dir,
        })
    }

    fn predict(&self, text: &str) -> Result<String> {
        let (model, preprocessor) = self.loaded()?;
        let input = InputTensor::from_row(preprocessor.encode(text));
        let logits = model.run(&input)?;

        let label_encoder = self
            .label_encoder
            .as_ref()
            .ok_or(PredictionError::LabelEncoderNotLoaded)?;

        let row = logits.row(0).ok_or(PredictionError::NoScores)?;
        let class_id = argmax(row).ok_or(PredictionError::NoScores)?;
        Ok(label_encoder.decode(class_id)?.to_string())
    }
}
