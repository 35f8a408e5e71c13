use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use futures::StreamExt;
use serde_json::{Map, Value};
use std::time::Instant;

use crate::error::PredictError;
use crate::models::{HealthBody, PredictionBody, HEALTH_MESSAGE};
use crate::predictor::Predictor;

pub const DEFAULT_BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Upper bound on a `/predict` body, registered with `App::app_data`.
#[derive(Clone, Copy, Debug)]
pub struct BodyLimit(pub usize);

impl Default for BodyLimit {
    fn default() -> Self {
        Self(DEFAULT_BODY_LIMIT)
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(health)))
        .service(web::resource("/predict").route(web::post().to(predict)));
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthBody {
        message: HEALTH_MESSAGE,
    })
}

pub async fn predict(
    req: HttpRequest,
    payload: web::Payload,
    predictor: web::Data<Predictor>,
) -> Result<HttpResponse, PredictError> {
    let now = Instant::now();
    let limit = req.app_data::<BodyLimit>().copied().unwrap_or_default();
    let outcome = match read_body(payload, limit).await {
        Ok(body) => parse_record(&body).and_then(|record| predictor.predict(&record)),
        Err(err) => Err(err),
    };
    let elapsed = now.elapsed();

    match outcome {
        Ok(diagnosis) => {
            log::info!("Predicted {:?} in {elapsed:?}", diagnosis.label());
            Ok(HttpResponse::Ok().json(PredictionBody::from(diagnosis)))
        }
        Err(err) => {
            if err.status_code().is_server_error() {
                log::error!("Prediction failed after {elapsed:?}: {err}");
            } else {
                log::warn!("Rejected prediction request: {err}");
            }
            Err(err)
        }
    }
}

async fn read_body(
    mut payload: web::Payload,
    limit: BodyLimit,
) -> Result<web::BytesMut, PredictError> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        // a broken upload leaves no usable body
        let chunk = chunk.map_err(|_| PredictError::MissingBody)?;
        if body.len() + chunk.len() > limit.0 {
            return Err(PredictError::PayloadTooLarge { limit: limit.0 });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Accepts only a non-empty JSON object; anything else counts as a missing body.
fn parse_record(body: &[u8]) -> Result<Map<String, Value>, PredictError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(record)) if !record.is_empty() => Ok(record),
        _ => Err(PredictError::MissingBody),
    }
}
