//! API Server - HTTP server for predictions

use axum::{
    routing::{get, post},
    Router,
};
use phish_rs::config::ServerConfig;
use phish_rs::Predictor;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers::{self, AppState};
use crate::web;

/// API Server configuration
pub struct ApiServer {
    state: Arc<AppState>,
    addr: String,
    enable_form: bool,
}

impl ApiServer {
    /// Create a new API server around a loaded predictor
    pub fn new(predictor: Predictor, config: &ServerConfig) -> Self {
        Self {
            state: Arc::new(AppState { predictor }),
            addr: config.listen_addr(),
            enable_form: config.enable_form,
        }
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        // CORS configuration
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let mut router = Router::new()
            .route("/health", get(handlers::health))
            .route("/predict", post(handlers::predict));

        if self.enable_form {
            router = router.route("/", get(web::detector_page).post(web::detector_submit));
        }

        router
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind the configured address and serve until the process stops
    pub async fn run(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(&self.addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(&self, listener: TcpListener) -> std::io::Result<()> {
        info!("Starting API server on {}", listener.local_addr()?);
        axum::serve(listener, self.router()).await
    }
}
