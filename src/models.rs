use serde::Serialize;

/// Request keys in the order they are checked and laid out in the feature vector.
pub const FEATURE_NAMES: [&str; 7] = [
    "age",
    "hypertension",
    "heart_disease",
    "smoking_history",
    "bmi",
    "HbA1c_level",
    "blood_glucose_level",
];
pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();
/// Slot filled with the encoded `smoking_history` category.
pub const SMOKING_HISTORY_INDEX: usize = 3;

pub type FeatureVector = [f64; FEATURE_COUNT];

pub const HEALTH_MESSAGE: &str = "Diabetes Prediction API is running";

/// Class predicted by the model.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Diagnosis {
    NoDiabetes,
    Diabetes,
}

impl Diagnosis {
    pub fn code(self) -> u8 {
        match self {
            Diagnosis::NoDiabetes => 0,
            Diagnosis::Diabetes => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Diagnosis::NoDiabetes => "No Diabetes",
            Diagnosis::Diabetes => "Diabetes",
        }
    }
}

#[derive(Serialize, Debug)]
pub struct PredictionBody {
    pub prediction: u8,
    pub result: &'static str,
}

impl From<Diagnosis> for PredictionBody {
    fn from(diagnosis: Diagnosis) -> Self {
        Self {
            prediction: diagnosis.code(),
            result: diagnosis.label(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct HealthBody {
    pub message: &'static str,
}
