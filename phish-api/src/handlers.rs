//! JSON request handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use phish_rs::Predictor;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

/// Shared application state
pub struct AppState {
    pub predictor: Predictor,
}

/// Prediction request body
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    /// Raw email text; missing, null or non-string values become empty text
    #[serde(default, deserialize_with = "text_or_empty")]
    pub email: String,
}

fn text_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) => Ok(text),
        _ => Ok(String::new()),
    }
}

/// Prediction response
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    /// 1 for phishing, 0 for legitimate
    pub prediction: u8,
    /// Probability of phishing
    pub probability: f64,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(msg: &str) -> Self {
        Self {
            error: msg.to_string(),
        }
    }
}

/// POST /predict - Classify one email
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            debug!("Rejected predict body: {}", rejection);
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiError::new(&rejection.body_text())),
            )
                .into_response();
        }
    };

    match state.predictor.predict_one(&req.email) {
        Ok(prediction) => (
            StatusCode::OK,
            Json(PredictResponse {
                prediction: prediction.label.as_u8(),
                probability: prediction.probability,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Prediction failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new(&e.to_string())),
            )
                .into_response()
        }
    }
}

/// GET /health - Liveness plus the id of the loaded training run
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "phish-api",
        "version": env!("CARGO_PKG_VERSION"),
        "run_id": state.predictor.artifacts().run_id.to_string(),
        "trained_at": state.predictor.artifacts().trained_at.to_rfc3339(),
    }))
}
