//! Artifact persistence for trained models
//!
//! One artifact per model type, keyed by the type's tag. Saves are committed
//! by writing to a temporary sibling and renaming, so a concurrent load never
//! observes a partial artifact, and a failed training never disturbs the
//! previously committed one.

use crate::error::{PowercastError, Result};
use crate::models::{ModelType, TrainedModel};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn artifact_path(&self, model_type: ModelType) -> PathBuf {
        self.dir.join(format!("{}.json", model_type.as_str()))
    }

    /// Persist a trained model, overwriting any prior artifact for its type.
    pub fn save(&self, model: &TrainedModel) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.artifact_path(model.model_type);
        let tmp = path.with_extension("json.tmp");

        let payload = serde_json::to_vec(model)?;
        fs::write(&tmp, payload)?;
        fs::rename(&tmp, &path)?;

        debug!(model = %model.model_type, path = %path.display(), "saved model artifact");
        Ok(())
    }

    /// Load the artifact for a model type.
    ///
    /// Missing artifacts are a recoverable, user-visible condition: the
    /// model has not been trained yet.
    pub fn load(&self, model_type: ModelType) -> Result<TrainedModel> {
        let path = self.artifact_path(model_type);
        let payload = match fs::read(&path) {
            Ok(payload) => payload,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PowercastError::ModelNotFound(format!(
                    "no artifact for model type '{}'",
                    model_type
                )));
            }
            Err(e) => return Err(e.into()),
        };
        let model: TrainedModel = serde_json::from_slice(&payload)?;
        Ok(model)
    }

    pub fn exists(&self, model_type: ModelType) -> bool {
        self.artifact_path(model_type).exists()
    }
}
