//! Integration tests for the HTTP server

use phish_api::ApiServer;
use phish_rs::config::ServerConfig;
use phish_rs::{Config, Predictor, TrainingPipeline};
use serde_json::json;
use tempfile::TempDir;
use tokio::net::TcpListener;

const DATASET: &str = "text_combined,label
\"URGENT: verify your account password now\",1
\"You won a FREE prize, claim your money today\",1
\"Your bank account is suspended, click to verify\",1
\"Free gift card offer, confirm your details now\",1
\"Meeting moved to 10am, see agenda attached\",0
\"Lunch with the project team on friday\",0
\"Quarterly report draft for review before the meeting\",0
\"Notes from the planning session yesterday\",0
";

/// Train on a small dataset and start a server on an ephemeral port
async fn start_server(dir: &TempDir, enable_form: bool) -> String {
    let mut config = Config::default();
    config.data.raw_path = dir.path().join("phishing_emails.csv");
    config.data.cleaned_path = dir.path().join("preprocessed_emails.csv");
    config.artifacts.dir = dir.path().to_path_buf();

    let mut dataset = String::from(DATASET);
    // Repeat rows so both classes survive the split with room to spare
    for line in DATASET.lines().skip(1) {
        dataset.push_str(line);
        dataset.push('\n');
    }
    std::fs::write(&config.data.raw_path, dataset).unwrap();
    TrainingPipeline::new(config.clone()).run().unwrap();

    let predictor = Predictor::from_config(&config).unwrap();
    let server_config = ServerConfig {
        enable_form,
        ..ServerConfig::default()
    };
    let server = ApiServer::new(predictor, &server_config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        server.serve(listener).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_predict_phishing() {
    let dir = TempDir::new().unwrap();
    let base = start_server(&dir, true).await;

    let response = reqwest::Client::new()
        .post(format!("{}/predict", base))
        .json(&json!({"email": "Verify your account password now!"}))
        .send()
        .await
        .expect("Request failed");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("Invalid JSON");
    assert_eq!(body["prediction"], 1);
    assert!(body["probability"].as_f64().unwrap() >= 0.5);
}

#[tokio::test]
async fn test_predict_legitimate() {
    let dir = TempDir::new().unwrap();
    let base = start_server(&dir, true).await;

    let body: serde_json::Value = reqwest::Client::new()
        .post(format!("{}/predict", base))
        .json(&json!({"email": "Agenda for the project meeting on friday"}))
        .send()
        .await
        .expect("Request failed")
        .json()
        .await
        .expect("Invalid JSON");

    assert_eq!(body["prediction"], 0);
    assert!(body["probability"].as_f64().unwrap() < 0.5);
}

#[tokio::test]
async fn test_predict_missing_email_field() {
    let dir = TempDir::new().unwrap();
    let base = start_server(&dir, true).await;

    let response = reqwest::Client::new()
        .post(format!("{}/predict", base))
        .json(&json!({"subject": "no email here"}))
        .send()
        .await
        .expect("Request failed");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("Invalid JSON");
    let prediction = body["prediction"].as_u64().unwrap();
    assert!(prediction == 0 || prediction == 1);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let dir = TempDir::new().unwrap();
    let base = start_server(&dir, true).await;

    let response = reqwest::Client::new()
        .post(format!("{}/predict", base))
        .header("Origin", "https://example.org")
        .json(&json!({"email": "hello"}))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn test_health() {
    let dir = TempDir::new().unwrap();
    let base = start_server(&dir, true).await;

    let body: serde_json::Value = reqwest::get(format!("{}/health", base))
        .await
        .expect("Request failed")
        .json()
        .await
        .expect("Invalid JSON");

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "phish-api");
    assert!(body["run_id"].is_string());
}

#[tokio::test]
async fn test_form_page() {
    let dir = TempDir::new().unwrap();
    let base = start_server(&dir, true).await;

    let html = reqwest::get(format!("{}/", base))
        .await
        .expect("Request failed")
        .text()
        .await
        .unwrap();
    assert!(html.contains("<textarea name=\"email\""));
}

#[tokio::test]
async fn test_form_blank_input_warns() {
    let dir = TempDir::new().unwrap();
    let base = start_server(&dir, true).await;

    let html = reqwest::Client::new()
        .post(format!("{}/", base))
        .form(&[("email", "   ")])
        .send()
        .await
        .expect("Request failed")
        .text()
        .await
        .unwrap();

    assert!(html.contains("class=\"alert alert-warning\""));
    assert!(html.contains("Please enter some email text to analyze."));
    assert!(!html.contains("Phishing probability"));
    assert!(!html.contains("This email looks like phishing."));
    assert!(!html.contains("This email looks legitimate."));
}

#[tokio::test]
async fn test_form_page_has_no_message_initially() {
    let dir = TempDir::new().unwrap();
    let base = start_server(&dir, true).await;

    let html = reqwest::get(format!("{}/", base))
        .await
        .expect("Request failed")
        .text()
        .await
        .unwrap();
    assert!(!html.contains("class=\"alert alert-warning\""));
    assert!(!html.contains("class=\"alert alert-error\""));
    assert!(!html.contains("class=\"alert alert-success\""));
}

#[tokio::test]
async fn test_form_shows_verdict() {
    let dir = TempDir::new().unwrap();
    let base = start_server(&dir, true).await;

    let html = reqwest::Client::new()
        .post(format!("{}/", base))
        .form(&[("email", "Claim your FREE prize money now")])
        .send()
        .await
        .expect("Request failed")
        .text()
        .await
        .unwrap();

    assert!(html.contains("This email looks like phishing."));
    assert!(html.contains("Phishing probability"));
}
