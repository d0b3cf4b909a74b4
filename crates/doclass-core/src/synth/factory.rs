//! Synthetic labelled corpus generation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::noise::{apply_noise, NoisePolicy};
use super::registry::{Generator, IndustryRegistry};
use crate::error::{ConfigError, TrainingError};

/// Parallel texts and labels, index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    texts: Vec<String>,
    labels: Vec<String>,
}

impl Corpus {
    /// Build a corpus, rejecting misaligned sequences.
    pub fn new(texts: Vec<String>, labels: Vec<String>) -> Result<Self, TrainingError> {
        if texts.len() != labels.len() {
            return Err(TrainingError::Misaligned {
                texts: texts.len(),
                labels: labels.len(),
            });
        }
        Ok(Self { texts, labels })
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            texts: Vec::with_capacity(capacity),
            labels: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, text: String, label: String) {
        self.texts.push(text);
        self.labels.push(label);
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Iterate over `(text, label)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.texts
            .iter()
            .zip(&self.labels)
            .map(|(t, l)| (t.as_str(), l.as_str()))
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        (self.texts, self.labels)
    }
}

/// Produces synthetic documents for one industry.
pub struct SyntheticDataFactory {
    num_samples: usize,
    add_noise: bool,
    industry: String,
    document_types: Vec<(String, Generator)>,
    noise_policy: NoisePolicy,
    rng: StdRng,
}

impl SyntheticDataFactory {
    /// Create a factory for `industry`.
    ///
    /// Fails if the industry is not in `registry`.
    pub fn new(
        registry: &IndustryRegistry,
        num_samples: usize,
        add_noise: bool,
        industry: &str,
    ) -> Result<Self, ConfigError> {
        let document_types = registry
            .document_types(industry)?
            .iter()
            .map(|(label, generator)| (label.clone(), generator.clone()))
            .collect();

        Ok(Self {
            num_samples,
            add_noise,
            industry: industry.to_string(),
            document_types,
            noise_policy: NoisePolicy::default(),
            rng: StdRng::from_os_rng(),
        })
    }

    /// Use a fixed seed so the corpus is reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Replace the default noise policy.
    pub fn with_noise_policy(mut self, policy: NoisePolicy) -> Self {
        self.noise_policy = policy;
        self
    }

    pub fn industry(&self) -> &str {
        &self.industry
    }

    /// Labels this factory can emit.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.document_types.iter().map(|(label, _)| label.as_str())
    }

    /// Generate `num_samples` documents with uniformly chosen types.
    pub fn generate(&mut self) -> Result<Corpus, ConfigError> {
        if self.document_types.is_empty() {
            return Err(ConfigError::EmptyGeneratorSet(self.industry.clone()));
        }

        let mut corpus = Corpus::with_capacity(self.num_samples);
        for _ in 0..self.num_samples {
            let index = self.rng.random_range(0..self.document_types.len());
            let (label, generator) = &self.document_types[index];
            let mut text = generator(&mut self.rng);

            if self.add_noise {
                text = apply_noise(&text, &self.noise_policy, &mut self.rng);
            }

            corpus.push(text, label.clone());
        }

        debug!("Generated corpus: {:?}", label_counts(&corpus));
        info!(
            "Generated {} synthetic documents for industry {}",
            corpus.len(),
            self.industry
        );
        Ok(corpus)
    }
}

fn label_counts(corpus: &Corpus) -> std::collections::BTreeMap<&str, usize> {
    let mut counts = std::collections::BTreeMap::new();
    for label in corpus.labels() {
        *counts.entry(label.as_str()).or_insert(0) += 1;
    }
    counts
}
