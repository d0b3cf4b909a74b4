//! Bidirectional mapping between string labels and class ids.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EncodingError, LoadError};

/// Maps the distinct labels seen in `fit` onto `0..num_classes`.
///
/// Classes are numbered in sorted label order, so fitting the same label
/// set always yields the same ids regardless of sample order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Create an unfitted encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn the label set and return the id of every input label.
    pub fn fit<S: AsRef<str>>(&mut self, labels: &[S]) -> Vec<usize> {
        let distinct: BTreeSet<&str> = labels.iter().map(|l| l.as_ref()).collect();
        self.classes = distinct.into_iter().map(str::to_string).collect();

        labels
            .iter()
            .filter_map(|label| self.classes.binary_search_by(|c| c.as_str().cmp(label.as_ref())).ok())
            .collect()
    }

    /// Ids of already-known labels.
    pub fn transform<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>, EncodingError> {
        self.ensure_fitted()?;
        labels
            .iter()
            .map(|label| {
                let label = label.as_ref();
                self.classes
                    .binary_search_by(|c| c.as_str().cmp(label))
                    .map_err(|_| EncodingError::UnknownLabel(label.to_string()))
            })
            .collect()
    }

    /// Labels for the given ids.
    pub fn inverse(&self, ids: &[usize]) -> Result<Vec<String>, EncodingError> {
        self.ensure_fitted()?;
        ids.iter()
            .map(|&id| {
                self.classes
                    .get(id)
                    .cloned()
                    .ok_or(EncodingError::UnknownClassId {
                        id,
                        num_classes: self.classes.len(),
                    })
            })
            .collect()
    }

    /// Label for a single id.
    pub fn decode(&self, id: usize) -> Result<&str, EncodingError> {
        self.ensure_fitted()?;
        self.classes
            .get(id)
            .map(String::as_str)
            .ok_or(EncodingError::UnknownClassId {
                id,
                num_classes: self.classes.len(),
            })
    }

    pub fn is_fitted(&self) -> bool {
        !self.classes.is_empty()
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Known labels, indexed by class id.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Read an encoder written by [`LabelEncoder::save`].
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::MissingMember {
                member: "label encoder",
                path: path.to_path_buf(),
            });
        }
        let corrupt = |reason: String| LoadError::Corrupt {
            member: "label encoder",
            reason,
        };

        let content = std::fs::read_to_string(path).map_err(|e| corrupt(e.to_string()))?;
        let encoder: Self = serde_json::from_str(&content).map_err(|e| corrupt(e.to_string()))?;

        let sorted = encoder.classes.windows(2).all(|w| w[0] < w[1]);
        if !encoder.is_fitted() || !sorted {
            return Err(corrupt("classes must be non-empty, sorted and distinct".to_string()));
        }
        Ok(encoder)
    }

    /// Write the encoder as JSON.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    fn ensure_fitted(&self) -> Result<(), EncodingError> {
        if self.is_fitted() {
            Ok(())
        } else {
            Err(EncodingError::NotFitted)
        }
    }
}
