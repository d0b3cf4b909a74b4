//! Industry registry: which document types belong to which industry.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use rand::RngCore;
use tracing::debug;

use super::generators;
use crate::error::ConfigError;

/// A document generator. Each call renders one new document.
pub type Generator = Arc<dyn Fn(&mut dyn RngCore) -> String + Send + Sync>;

/// Document types of one industry, keyed by label.
///
/// Ordered so that seeded generation is reproducible.
pub type DocumentTypes = BTreeMap<String, Generator>;

/// Wrap a function or closure as a [`Generator`].
pub fn generator<F>(f: F) -> Generator
where
    F: Fn(&mut dyn RngCore) -> String + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Mapping from industry name to its document types.
///
/// Built at startup and shared read-only afterwards.
#[derive(Clone, Default)]
pub struct IndustryRegistry {
    industries: HashMap<String, DocumentTypes>,
}

impl IndustryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `finance` and `government` industries.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(
            "finance",
            [
                ("invoice", generator(generators::invoice_text)),
                ("bank_statement", generator(generators::bank_statement_text)),
                ("drivers_license", generator(generators::license_text)),
            ],
        );
        registry.register(
            "government",
            [("drivers_license", generator(generators::license_text))],
        );
        registry
    }

    /// Add or replace the document types of `industry`.
    ///
    /// Registering the same industry again overwrites the previous set.
    pub fn register<I, K>(&mut self, industry: impl Into<String>, document_types: I)
    where
        I: IntoIterator<Item = (K, Generator)>,
        K: Into<String>,
    {
        let industry = industry.into();
        let types: DocumentTypes = document_types
            .into_iter()
            .map(|(label, generator)| (label.into(), generator))
            .collect();

        debug!("Registered industry {} with {} document types", industry, types.len());
        self.industries.insert(industry, types);
    }

    /// Look up the document types of `industry`.
    pub fn document_types(&self, industry: &str) -> Result<&DocumentTypes, ConfigError> {
        self.industries
            .get(industry)
            .ok_or_else(|| ConfigError::UnknownIndustry(industry.to_string()))
    }

    /// Labels registered for `industry`, in generation order.
    pub fn labels(&self, industry: &str) -> Result<Vec<String>, ConfigError> {
        Ok(self.document_types(industry)?.keys().cloned().collect())
    }

    /// Whether `industry` has been registered.
    pub fn contains(&self, industry: &str) -> bool {
        self.industries.contains_key(industry)
    }

    /// Registered industry names, sorted.
    pub fn industries(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.industries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for IndustryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for name in self.industries() {
            if let Ok(types) = self.document_types(name) {
                map.entry(&name, &types.keys().collect::<Vec<_>>());
            }
        }
        map.finish()
    }
}
