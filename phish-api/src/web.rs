//! HTML form for checking a single email by hand

use askama_axum::Template;
use axum::{extract::State, response::IntoResponse, Form};
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

use crate::handlers::AppState;

#[derive(Template, Default)]
#[template(path = "detector.html")]
pub struct DetectorTemplate {
    pub email: String,
    pub success: String,
    pub error: String,
    pub warning: String,
    pub probability: String,
}

#[derive(Deserialize)]
pub struct DetectForm {
    #[serde(default)]
    email: String,
}

/// GET / - Empty detector form
pub async fn detector_page() -> impl IntoResponse {
    DetectorTemplate::default()
}

/// POST / - Classify the submitted text, or warn when it is blank
pub async fn detector_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<DetectForm>,
) -> impl IntoResponse {
    if form.email.trim().is_empty() {
        return DetectorTemplate {
            warning: "Please enter some email text to analyze.".to_string(),
            ..DetectorTemplate::default()
        };
    }

    match state.predictor.predict_one(&form.email) {
        Ok(prediction) if prediction.is_phishing() => DetectorTemplate {
            error: "This email looks like phishing.".to_string(),
            probability: format!("{:.2}%", prediction.probability * 100.0),
            email: form.email,
            ..DetectorTemplate::default()
        },
        Ok(prediction) => DetectorTemplate {
            success: "This email looks legitimate.".to_string(),
            probability: format!("{:.2}%", prediction.probability * 100.0),
            email: form.email,
            ..DetectorTemplate::default()
        },
        Err(e) => {
            error!("Prediction failed: {}", e);
            DetectorTemplate {
                error: format!("Could not analyze this email: {}", e),
                email: form.email,
                ..DetectorTemplate::default()
            }
        }
    }
}
