use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::classifier::InferenceError;
use crate::models::ErrorBody;

/// Everything that can go wrong while serving `/predict`.
///
/// Status codes are assigned here and nowhere else: malformed client input
/// (missing body, missing field, unknown category) is a 400, an oversized body
/// is a 413, while coercion and model failures are reported as a 500 carrying
/// the error text in `detail`.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Missing JSON body")]
    MissingBody,
    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },
    #[error("Missing field: {0}")]
    MissingField(&'static str),
    #[error("Invalid smoking_history value")]
    InvalidCategory { allowed: Vec<String> },
    #[error("{field}: {reason}")]
    Coercion { field: &'static str, reason: String },
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl ResponseError for PredictError {
    fn status_code(&self) -> StatusCode {
        match self {
            PredictError::MissingBody
            | PredictError::MissingField(_)
            | PredictError::InvalidCategory { .. } => StatusCode::BAD_REQUEST,
            PredictError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            PredictError::Coercion { .. } | PredictError::Inference(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            PredictError::InvalidCategory { allowed } => ErrorBody {
                error: self.to_string(),
                allowed: Some(allowed.clone()),
                detail: None,
            },
            PredictError::Coercion { .. } | PredictError::Inference(_) => ErrorBody {
                error: "Server error".to_string(),
                allowed: None,
                detail: Some(self.to_string()),
            },
            _ => ErrorBody {
                error: self.to_string(),
                allowed: None,
                detail: None,
            },
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_bad_requests() {
        assert_eq!(PredictError::MissingBody.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            PredictError::MissingField("bmi").status_code(),
            StatusCode::BAD_REQUEST
        );
        let invalid = PredictError::InvalidCategory {
            allowed: vec!["never".to_string()],
        };
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn coercion_and_inference_errors_are_server_errors() {
        let coercion = PredictError::Coercion {
            field: "bmi",
            reason: "could not convert string to float: \"abc\"".to_string(),
        };
        assert_eq!(coercion.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            coercion.to_string(),
            "bmi: could not convert string to float: \"abc\""
        );

        let inference = PredictError::from(InferenceError::NonFinite("age"));
        assert_eq!(inference.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(inference.to_string().contains("age"));
    }

    #[test]
    fn oversized_body_is_payload_too_large() {
        let err = PredictError::PayloadTooLarge { limit: 1024 };
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.to_string(), "Request body exceeds 1024 bytes");
    }

    #[test]
    fn messages_match_wire_format() {
        assert_eq!(PredictError::MissingBody.to_string(), "Missing JSON body");
        assert_eq!(
            PredictError::MissingField("HbA1c_level").to_string(),
            "Missing field: HbA1c_level"
        );
    }
}
