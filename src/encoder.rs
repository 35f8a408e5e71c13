use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;
use validator::Validate;

#[derive(Debug, Error, PartialEq)]
#[error("unknown category: {0:?}")]
pub struct UnknownCategory(pub String);

/// Maps a closed vocabulary of strings to integer codes.
pub trait CategoricalEncoder: Send + Sync {
    fn encode(&self, value: &str) -> Result<usize, UnknownCategory>;
    /// Fitted categories, in code order.
    fn vocabulary(&self) -> &[String];
}

/// On-disk form of a fitted label encoder.
#[derive(Deserialize, Debug, Validate)]
pub struct EncoderArtifact {
    #[validate(length(min = 1))]
    pub classes: Vec<String>,
}

/// Encodes a category as its position in the fitted class list.
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    classes: Vec<String>,
    codes: HashMap<String, usize>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Result<Self, String> {
        if classes.is_empty() {
            return Err("encoder has no classes".to_string());
        }
        let mut codes = HashMap::with_capacity(classes.len());
        for (code, class) in classes.iter().enumerate() {
            if codes.insert(class.clone(), code).is_some() {
                return Err(format!("duplicate class {class:?}"));
            }
        }
        Ok(Self { classes, codes })
    }
}

impl TryFrom<EncoderArtifact> for LabelEncoder {
    type Error = String;

    fn try_from(artifact: EncoderArtifact) -> Result<Self, Self::Error> {
        artifact.validate().map_err(|e| e.to_string())?;
        Self::new(artifact.classes)
    }
}

impl CategoricalEncoder for LabelEncoder {
    fn encode(&self, value: &str) -> Result<usize, UnknownCategory> {
        self.codes
            .get(value)
            .copied()
            .ok_or_else(|| UnknownCategory(value.to_string()))
    }

    fn vocabulary(&self) -> &[String] {
        &self.classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smoking_encoder() -> LabelEncoder {
        let classes = ["No Info", "current", "ever", "former", "never", "not current"];
        LabelEncoder::new(classes.iter().map(|c| c.to_string()).collect()).unwrap()
    }

    #[test]
    fn encodes_by_position() {
        let encoder = smoking_encoder();
        assert_eq!(encoder.encode("No Info"), Ok(0));
        assert_eq!(encoder.encode("never"), Ok(4));
        assert_eq!(encoder.encode("not current"), Ok(5));
    }

    #[test]
    fn rejects_unknown_and_differently_cased_values() {
        let encoder = smoking_encoder();
        assert_eq!(encoder.encode("xyz"), Err(UnknownCategory("xyz".to_string())));
        assert!(encoder.encode("Never").is_err());
        assert!(encoder.encode("").is_err());
    }

    #[test]
    fn vocabulary_keeps_fitted_order() {
        let encoder = smoking_encoder();
        assert_eq!(encoder.vocabulary().len(), 6);
        assert_eq!(encoder.vocabulary()[0], "No Info");
        assert_eq!(encoder.vocabulary()[5], "not current");
    }

    #[test]
    fn duplicate_classes_are_rejected() {
        let err = LabelEncoder::new(vec!["never".into(), "never".into()]).unwrap_err();
        assert!(err.contains("duplicate"));
    }

    #[test]
    fn empty_artifact_fails_validation() {
        let artifact: EncoderArtifact = serde_json::from_str(r#"{"classes": []}"#).unwrap();
        assert!(LabelEncoder::try_from(artifact).is_err());
    }
}
