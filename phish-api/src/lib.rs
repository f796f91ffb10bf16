//! phish-api: HTTP front end for the phishing classifier
//!
//! Serves `POST /predict` for programmatic clients and an HTML form at `/`
//! for manual checks. The artifact pair is loaded once at startup and shared
//! read-only by every request.

pub mod handlers;
pub mod server;
pub mod web;

pub use handlers::AppState;
pub use server::ApiServer;
