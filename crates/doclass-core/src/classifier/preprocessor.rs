//! Text to feature-vector encoding.

use std::path::Path;

use lazy_static::lazy_static;
use ndarray::{Array1, Array2};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, LoadError};

lazy_static! {
    static ref TOKEN: Regex = Regex::new(r"[\p{L}\p{N}]+").unwrap();
}

/// Tokenizer and feature hashing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessorConfig {
    /// Number of hashed feature buckets.
    pub num_features: usize,
    /// Lowercase text before tokenizing.
    pub lowercase: bool,
    /// Replace every digit with `0` so numbers collapse to their shape.
    pub fold_digits: bool,
    /// Longest word n-gram hashed (1 = unigrams only).
    pub ngram_max: usize,
    /// Tokens kept per document; the rest is truncated.
    pub max_tokens: usize,
}

impl Default for PreprocessorConfig {
    fn default() -> Self {
        Self {
            num_features: 4096,
            lowercase: true,
            fold_digits: true,
            ngram_max: 2,
            max_tokens: 512,
        }
    }
}

/// Turns raw text into fixed-width, L2-normalised feature vectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPreprocessor {
    config: PreprocessorConfig,
}

impl TextPreprocessor {
    pub fn new(config: PreprocessorConfig) -> Result<Self, ConfigError> {
        if config.num_features == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "num_features",
                reason: "must be positive".to_string(),
            });
        }
        if !(1..=3).contains(&config.ngram_max) {
            return Err(ConfigError::InvalidParameter {
                name: "ngram_max",
                reason: format!("must be between 1 and 3, got {}", config.ngram_max),
            });
        }
        if config.max_tokens == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "max_tokens",
                reason: "must be positive".to_string(),
            });
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &PreprocessorConfig {
        &self.config
    }

    pub fn num_features(&self) -> usize {
        self.config.num_features
    }

    /// Split text into normalised tokens, truncated to `max_tokens`.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        TOKEN
            .find_iter(text)
            .take(self.config.max_tokens)
            .map(|m| {
                let mut token = if self.config.lowercase {
                    m.as_str().to_lowercase()
                } else {
                    m.as_str().to_string()
                };
                if self.config.fold_digits {
                    token = token
                        .chars()
                        .map(|c| if c.is_ascii_digit() { '0' } else { c })
                        .collect();
                }
                token
            })
            .collect()
    }

    /// Encode one document.
    pub fn encode(&self, text: &str) -> Array1<f32> {
        let mut features = Array1::zeros(self.config.num_features);
        let tokens = self.tokenize(text);

        for start in 0..tokens.len() {
            for n in 1..=self.config.ngram_max {
                let Some(gram) = tokens.get(start..start + n) else {
                    break;
                };
                features[self.bucket(&gram.join(" "))] += 1.0f32;
            }
        }

        features.mapv_inplace(|count: f32| count.ln_1p());
        let norm = features.dot(&features).sqrt();
        if norm > 0.0 {
            features /= norm;
        }
        features
    }

    /// Encode a batch of documents as rows of a matrix.
    pub fn encode_batch<S: AsRef<str>>(&self, texts: &[S]) -> Array2<f32> {
        let mut matrix = Array2::zeros((texts.len(), self.config.num_features));
        for (mut row, text) in matrix.rows_mut().into_iter().zip(texts) {
            row.assign(&self.encode(text.as_ref()));
        }
        matrix
    }

    fn bucket(&self, gram: &str) -> usize {
        crc32fast::hash(gram.as_bytes()) as usize % self.config.num_features
    }

    /// Read preprocessor settings written by [`TextPreprocessor::save`].
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::MissingMember {
                member: "preprocessor config",
                path: path.to_path_buf(),
            });
        }
        let corrupt = |reason: String| LoadError::Corrupt {
            member: "preprocessor config",
            reason,
        };

        let content = std::fs::read_to_string(path).map_err(|e| corrupt(e.to_string()))?;
        let config: PreprocessorConfig =
            serde_json::from_str(&content).map_err(|e| corrupt(e.to_string()))?;
        Self::new(config).map_err(|e| corrupt(e.to_string()))
    }

    /// Write the settings as JSON.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let content = serde_json::to_string_pretty(&self.config)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
