//! Synthetic training data: generators, noise, registry and factory.

mod factory;
pub mod fake;
pub mod generators;
pub mod noise;
mod registry;

pub use factory::{Corpus, SyntheticDataFactory};
pub use noise::{apply_noise, NoisePolicy};
pub use registry::{generator, DocumentTypes, Generator, IndustryRegistry};
