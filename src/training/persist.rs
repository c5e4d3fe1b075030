//! Model artifact persistence (JSON on disk)

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classifier::{ModelError, RandomForest};
use crate::data::{Scaler, CLASS_NAMES, FEATURE_NAMES, N_CLASSES, N_FEATURES};

/// Artifact layout version written by [`save_model`]
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Model kind label, also reported by the HTTP API
pub const MODEL_TYPE: &str = "RandomForestClassifier";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt model artifact {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("incompatible model artifact {path}: {reason}")]
    Incompatible { path: PathBuf, reason: String },
}

/// A fitted forest plus the preprocessing its inputs need
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    pub forest: RandomForest,
    /// Present when the forest was fitted on standardized features
    pub scaler: Option<Scaler>,
}

impl TrainedModel {
    pub fn new(forest: RandomForest, scaler: Option<Scaler>) -> Self {
        Self { forest, scaler }
    }

    pub fn is_normalized(&self) -> bool {
        self.scaler.is_some()
    }

    /// Class probabilities for raw measurements; the scaler is applied first.
    pub fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        match &self.scaler {
            None => self.forest.predict_proba(row),
            Some(scaler) => {
                let raw: &[f64; N_FEATURES] = row.try_into().map_err(|_| ModelError::FeatureCount {
                    expected: N_FEATURES,
                    actual: row.len(),
                })?;
                self.forest.predict_proba(&scaler.transform(raw))
            }
        }
    }
}

impl From<RandomForest> for TrainedModel {
    fn from(forest: RandomForest) -> Self {
        Self::new(forest, None)
    }
}

/// On-disk envelope around the fitted forest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub model_type: String,
    pub feature_names: Vec<String>,
    pub class_names: Vec<String>,
    pub trained_at: DateTime<Utc>,
    /// Forest inputs are z-scores; `scaler` maps raw measurements onto them
    #[serde(default)]
    pub normalized: bool,
    #[serde(default)]
    pub scaler: Option<Scaler>,
    pub forest: RandomForest,
}

impl ModelArtifact {
    pub fn new(model: TrainedModel) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            model_type: MODEL_TYPE.to_string(),
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            class_names: CLASS_NAMES.iter().map(|s| s.to_string()).collect(),
            trained_at: Utc::now(),
            normalized: model.is_normalized(),
            scaler: model.scaler,
            forest: model.forest,
        }
    }

    /// Check that the artifact matches what this build serves
    pub fn validate(&self) -> Result<(), String> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(format!(
                "format version {} (expected {})",
                self.format_version, ARTIFACT_FORMAT_VERSION
            ));
        }
        if self.model_type != MODEL_TYPE {
            return Err(format!("model type {:?}", self.model_type));
        }
        if self.forest.n_features != N_FEATURES || self.feature_names.len() != N_FEATURES {
            return Err(format!("model has {} features, expected {N_FEATURES}", self.forest.n_features));
        }
        if self.forest.n_classes != N_CLASSES || self.class_names.len() != N_CLASSES {
            return Err(format!("model has {} classes, expected {N_CLASSES}", self.forest.n_classes));
        }
        if self.class_names.iter().zip(CLASS_NAMES).any(|(a, b)| a != b) {
            return Err(format!("class names {:?}", self.class_names));
        }
        match (&self.scaler, self.normalized) {
            (None, false) => {}
            (Some(scaler), true) => {
                let finite = scaler.mean.iter().all(|m| m.is_finite());
                let positive = scaler.std.iter().all(|s| s.is_finite() && *s > 0.0);
                if !finite || !positive {
                    return Err("scaler statistics are invalid".to_string());
                }
            }
            (None, true) => return Err("normalized model without a scaler".to_string()),
            (Some(_), false) => return Err("scaler present on a raw-feature model".to_string()),
        }
        self.forest.validate()
    }
}

/// Write `model` to `path`, creating parent directories.
///
/// The artifact is written to a sibling temp file and renamed into place, so
/// a concurrent reader sees either the old file or the complete new one.
/// A failed write removes the temp file.
pub fn save_model(model: &TrainedModel, path: &Path) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    }

    let artifact = ModelArtifact::new(model.clone());
    let tmp = tmp_path(path);
    if let Err(e) = write_and_rename(&artifact, &tmp, path) {
        if tmp.exists() {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                tracing::warn!("Could not remove {}: {}", tmp.display(), cleanup);
            }
        }
        return Err(e);
    }

    tracing::info!("Model saved to {}", path.display());
    Ok(())
}

fn write_and_rename(artifact: &ModelArtifact, tmp: &Path, path: &Path) -> Result<(), PersistenceError> {
    let io_err = |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = fs::File::create(tmp).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, artifact).map_err(|source| PersistenceError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_err)?;
    drop(writer);

    fs::rename(tmp, path).map_err(io_err)
}

/// Read and validate a model artifact
pub fn load_model(path: &Path) -> Result<TrainedModel, PersistenceError> {
    let bytes = fs::read(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let artifact: ModelArtifact =
        serde_json::from_slice(&bytes).map_err(|source| PersistenceError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;
    artifact
        .validate()
        .map_err(|reason| PersistenceError::Incompatible {
            path: path.to_path_buf(),
            reason,
        })?;

    tracing::debug!(
        trained_at = %artifact.trained_at,
        trees = artifact.forest.trees.len(),
        normalized = artifact.normalized,
        "Model artifact loaded from {}",
        path.display()
    );
    Ok(TrainedModel::new(artifact.forest, artifact.scaler))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "model".into());
    name.push(".tmp");
    path.with_file_name(name)
}
