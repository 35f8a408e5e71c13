use serde_json::{Map, Value};

use crate::classifier::Classifier;
use crate::encoder::CategoricalEncoder;
use crate::error::PredictError;
use crate::models::{Diagnosis, FeatureVector, FEATURE_COUNT, FEATURE_NAMES, SMOKING_HISTORY_INDEX};

/// Read-only request context holding the loaded model and encoder.
pub struct Predictor {
    classifier: Box<dyn Classifier>,
    encoder: Box<dyn CategoricalEncoder>,
}

impl Predictor {
    pub fn new(
        classifier: impl Classifier + 'static,
        encoder: impl CategoricalEncoder + 'static,
    ) -> Self {
        Self {
            classifier: Box::new(classifier),
            encoder: Box::new(encoder),
        }
    }

    /// Validates a feature record, encodes it and runs the classifier.
    pub fn predict(&self, record: &Map<String, Value>) -> Result<Diagnosis, PredictError> {
        let values = FEATURE_NAMES
            .iter()
            .map(|name| record.get(*name).ok_or(PredictError::MissingField(*name)))
            .collect::<Result<Vec<_>, _>>()?;

        let smoking_code = values[SMOKING_HISTORY_INDEX]
            .as_str()
            .and_then(|category| self.encoder.encode(category).ok())
            .ok_or_else(|| PredictError::InvalidCategory {
                allowed: self.encoder.vocabulary().to_vec(),
            })?;

        let mut features: FeatureVector = [0.0; FEATURE_COUNT];
        for (idx, (name, value)) in FEATURE_NAMES.iter().zip(&values).enumerate() {
            features[idx] = if idx == SMOKING_HISTORY_INDEX {
                smoking_code as f64
            } else {
                coerce(*name, value)?
            };
        }
        log::debug!("feature vector {features:?}");

        Ok(self.classifier.predict(&features)?)
    }
}

/// Converts a JSON value to a float the way a lenient `float()` cast would:
/// numbers, booleans and numeric strings are accepted.
fn coerce(field: &'static str, value: &Value) -> Result<f64, PredictError> {
    let reason = match value {
        // always representable without serde_json's arbitrary_precision
        Value::Number(n) => return Ok(n.as_f64().unwrap_or(f64::NAN)),
        Value::Bool(b) => return Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => match parse_float(s) {
            Some(x) => return Ok(x),
            None => format!("could not convert string to float: {s:?}"),
        },
        Value::Null => "expected a number, found null".to_string(),
        Value::Array(_) => "expected a number, found an array".to_string(),
        Value::Object(_) => "expected a number, found an object".to_string(),
    };
    Err(PredictError::Coercion { field, reason })
}

/// Parses a trimmed float literal, allowing single underscores between digits
/// (`"1_000"`).
fn parse_float(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if !raw.contains('_') {
        return raw.parse().ok();
    }
    let bytes = raw.as_bytes();
    let mut digits = String::with_capacity(raw.len());
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'_' {
            let between_digits = i > 0
                && bytes[i - 1].is_ascii_digit()
                && bytes.get(i + 1).is_some_and(u8::is_ascii_digit);
            if !between_digits {
                return None;
            }
        } else {
            digits.push(b as char);
        }
    }
    digits.parse().ok()
}
