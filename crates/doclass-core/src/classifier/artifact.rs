//! Trained artifact bundle: model weights, preprocessor settings, label encoder.
//!
//! Layout of an artifact directory:
//!
//! ```text
//! model/
//!   model.json           <- LinearBackend weights and bias
//!   preprocessor.json    <- PreprocessorConfig
//!   label_encoder.json   <- fitted LabelEncoder
//! ```
//!
//! A directory missing any of the three files is not a valid artifact.

use std::fs;
use std::path::{Path, PathBuf};

use doclass_inference::{InferenceBackend, LinearBackend};
use tracing::{debug, info, warn};

use super::label_encoder::LabelEncoder;
use super::preprocessor::TextPreprocessor;
use crate::error::{LoadError, Result};

pub const MODEL_FILE: &str = "model.json";
pub const PREPROCESSOR_FILE: &str = "preprocessor.json";
pub const LABEL_ENCODER_FILE: &str = "label_encoder.json";

/// The three members of a fine-tuned classifier.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub model: LinearBackend,
    pub preprocessor: TextPreprocessor,
    pub label_encoder: LabelEncoder,
}

impl Artifact {
    /// Load a complete bundle from `dir`.
    pub fn load(dir: &Path) -> std::result::Result<Self, LoadError> {
        debug!("Loading artifact from {}", dir.display());

        // Check presence first so the error names the missing member.
        for (member, file) in [
            ("model", MODEL_FILE),
            ("preprocessor config", PREPROCESSOR_FILE),
            ("label encoder", LABEL_ENCODER_FILE),
        ] {
            let path = dir.join(file);
            if !path.is_file() {
                return Err(LoadError::MissingMember { member, path });
            }
        }

        let model =
            LinearBackend::from_file(dir.join(MODEL_FILE)).map_err(|e| LoadError::Corrupt {
                member: "model",
                reason: e.to_string(),
            })?;
        let preprocessor = TextPreprocessor::from_file(&dir.join(PREPROCESSOR_FILE))?;
        let label_encoder = LabelEncoder::from_file(&dir.join(LABEL_ENCODER_FILE))?;

        if model.num_features() != preprocessor.num_features() {
            return Err(LoadError::Inconsistent(format!(
                "model expects {} features but preprocessor produces {}",
                model.num_features(),
                preprocessor.num_features()
            )));
        }
        if model.num_classes() != label_encoder.num_classes() {
            return Err(LoadError::Inconsistent(format!(
                "model has {} outputs but label encoder has {} classes",
                model.num_classes(),
                label_encoder.num_classes()
            )));
        }

        info!(
            "Loaded artifact from {} ({} classes)",
            dir.display(),
            label_encoder.num_classes()
        );
        Ok(Self {
            model,
            preprocessor,
            label_encoder,
        })
    }
}

/// Write a bundle to `dir`, replacing any previous one.
///
/// Members are written into a staging directory next to `dir` which is
/// then renamed into place, so a crash mid-write never leaves a partial
/// bundle at `dir`. The label encoder is written only when present.
pub fn save_bundle(
    dir: &Path,
    model: &LinearBackend,
    preprocessor: &TextPreprocessor,
    label_encoder: Option<&LabelEncoder>,
) -> Result<()> {
    let parent = dir
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let staging = tempfile::Builder::new()
        .prefix(".doclass-staging-")
        .tempdir_in(parent)?;

    model.save(staging.path().join(MODEL_FILE))?;
    preprocessor.save(&staging.path().join(PREPROCESSOR_FILE))?;
    if let Some(encoder) = label_encoder {
        encoder.save(&staging.path().join(LABEL_ENCODER_FILE))?;
    }

    let backup = if dir.exists() {
        let backup = backup_path(parent, dir);
        fs::rename(dir, &backup)?;
        Some(backup)
    } else {
        None
    };

    if let Err(e) = fs::rename(staging.path(), dir) {
        if let Some(backup) = &backup {
            if let Err(restore) = fs::rename(backup, dir) {
                warn!("Failed to restore previous artifact from {}: {}", backup.display(), restore);
            }
        }
        return Err(e.into());
    }

    if let Some(backup) = backup {
        if let Err(e) = fs::remove_dir_all(&backup) {
            warn!("Failed to remove old artifact at {}: {}", backup.display(), e);
        }
    }

    info!("Saved artifact to {}", dir.display());
    Ok(())
}

fn backup_path(parent: &Path, dir: &Path) -> PathBuf {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    parent.join(format!(".{}.old-{}", name, uuid::Uuid::new_v4().simple()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::preprocessor::PreprocessorConfig;
    use crate::error::DoclassError;

    fn members(num_classes: usize) -> (LinearBackend, TextPreprocessor, LabelEncoder) {
        let preprocessor = TextPreprocessor::new(PreprocessorConfig {
            num_features: 16,
            ..Default::default()
        })
        .unwrap();
        let model = LinearBackend::zeros(16, num_classes);
        let mut encoder = LabelEncoder::new();
        let labels: Vec<String> = (0..num_classes).map(|i| format!("class_{i}")).collect();
        encoder.fit(&labels);
        (model, preprocessor, encoder)
    }

    #[test]
    fn test_save_then_load() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("model");
        let (model, preprocessor, encoder) = members(3);

        save_bundle(&dir, &model, &preprocessor, Some(&encoder)).unwrap();
        let artifact = Artifact::load(&dir).unwrap();

        assert_eq!(artifact.label_encoder, encoder);
        assert_eq!(artifact.preprocessor, preprocessor);
        assert_eq!(artifact.model.weights(), model.weights());
    }

    #[test]
    fn test_save_replaces_existing_bundle() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("model");

        let (model, preprocessor, encoder) = members(3);
        save_bundle(&dir, &model, &preprocessor, Some(&encoder)).unwrap();
        let (model, preprocessor, encoder) = members(2);
        save_bundle(&dir, &model, &preprocessor, Some(&encoder)).unwrap();

        assert_eq!(Artifact::load(&dir).unwrap().label_encoder.num_classes(), 2);

        // Only the bundle itself remains, no staging or backup directories.
        let entries: Vec<_> = fs::read_dir(root.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_bundle_without_encoder_is_partial() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("model");
        let (model, preprocessor, _) = members(3);

        save_bundle(&dir, &model, &preprocessor, None).unwrap();
        match Artifact::load(&dir) {
            Err(LoadError::MissingMember { member, .. }) => assert_eq!(member, "label encoder"),
            other => panic!("expected missing label encoder, got {other:?}"),
        }
    }

    #[test]
    fn test_inconsistent_members_rejected() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("model");
        let (model, preprocessor, _) = members(3);
        let (_, _, encoder) = members(2);

        save_bundle(&dir, &model, &preprocessor, Some(&encoder)).unwrap();
        assert!(matches!(Artifact::load(&dir), Err(LoadError::Inconsistent(_))));
    }

    #[test]
    fn test_corrupt_model_rejected() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("model");
        let (model, preprocessor, encoder) = members(2);
        save_bundle(&dir, &model, &preprocessor, Some(&encoder)).unwrap();

        fs::write(dir.join(MODEL_FILE), "not json").unwrap();
        assert!(matches!(
            Artifact::load(&dir),
            Err(LoadError::Corrupt { member: "model", .. })
        ));
    }

    #[test]
    fn test_save_error_type() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let (model, preprocessor, encoder) = members(2);
        let result = save_bundle(&blocker.join("model"), &model, &preprocessor, Some(&encoder));
        assert!(matches!(result, Err(DoclassError::Io(_))));
    }
}
