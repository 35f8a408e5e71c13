//! Startup loading of the model and encoder artifacts.
//!
//! Both files must load before the server binds; any failure here is fatal.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::classifier::Model;
use crate::encoder::{CategoricalEncoder, EncoderArtifact, LabelEncoder};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to deserialize artifact {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid artifact {}: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },
}

pub struct Artifacts {
    pub model: Model,
    pub encoder: LabelEncoder,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let raw = fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&raw).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_model(path: &Path) -> Result<Model, ArtifactError> {
    let model: Model = read_json(path)?;
    model.check().map_err(|reason| ArtifactError::Invalid {
        path: path.to_path_buf(),
        reason,
    })?;
    Ok(model)
}

pub fn load_encoder(path: &Path) -> Result<LabelEncoder, ArtifactError> {
    let artifact: EncoderArtifact = read_json(path)?;
    LabelEncoder::try_from(artifact).map_err(|reason| ArtifactError::Invalid {
        path: path.to_path_buf(),
        reason,
    })
}

pub fn load(model_path: &Path, encoder_path: &Path) -> Result<Artifacts, ArtifactError> {
    let model = load_model(model_path)?;
    log::info!("Loaded {} model from {}", model.kind(), model_path.display());
    let encoder = load_encoder(encoder_path)?;
    log::info!(
        "Loaded encoder with {} categories from {}",
        encoder.vocabulary().len(),
        encoder_path.display()
    );
    Ok(Artifacts { model, encoder })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const MODEL: &str = r#"{"kind": "logistic_regression",
        "coefficients": [0.05, 0.8, 0.6, 0.0, 0.08, 2.3, 0.03],
        "intercept": -27.0}"#;
    const ENCODER: &str = r#"{"classes": ["No Info", "current", "never"]}"#;

    #[test]
    fn loads_both_artifacts() {
        let model = write(MODEL);
        let encoder = write(ENCODER);

        let artifacts = load(model.path(), encoder.path()).unwrap();
        assert_eq!(artifacts.model.kind(), "logistic_regression");
        assert_eq!(artifacts.encoder.vocabulary().len(), 3);
    }

    #[test]
    fn bundled_artifacts_load() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        let artifacts = load(&root.join("model.json"), &root.join("label_encoder.json")).unwrap();
        assert_eq!(artifacts.model.kind(), "decision_tree");
        assert_eq!(artifacts.encoder.encode("never"), Ok(4));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let encoder = write(ENCODER);
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("model.json");

        let err = load(&missing, encoder.path()).err().unwrap();
        assert!(matches!(err, ArtifactError::Io { .. }));
        assert!(err.to_string().contains("model.json"));
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let model = write(MODEL);
        let encoder = write("\u{80}not json");

        let err = load(model.path(), encoder.path()).err().unwrap();
        assert!(matches!(err, ArtifactError::Parse { .. }));
    }

    #[test]
    fn structurally_invalid_model_is_rejected() {
        let model = write(r#"{"kind": "logistic_regression", "coefficients": [1.0], "intercept": 0}"#);
        let err = load_model(model.path()).err().unwrap();
        assert!(matches!(err, ArtifactError::Invalid { .. }));
    }

    #[test]
    fn duplicate_encoder_classes_are_rejected() {
        let encoder = write(r#"{"classes": ["never", "never"]}"#);
        let err = load_encoder(encoder.path()).err().unwrap();
        match err {
            ArtifactError::Invalid { reason, .. } => assert!(reason.contains("duplicate")),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
