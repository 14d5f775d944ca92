use ::sse::Manager;
use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use domain::auth::Authenticator;
use log::*;
use service::config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

mod controller;
mod error;
mod extractors;
mod params;
pub mod router;
mod sse;

pub use error::{Error, Result};

/// Web-level state: the service infrastructure plus the credential verifier
/// used by the authentication extractor.
#[derive(Clone)]
pub struct AppState {
    pub service_state: service::AppState,
    pub authenticator: Arc<dyn Authenticator>,
}

impl AppState {
    pub fn new(service_state: service::AppState, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            service_state,
            authenticator,
        }
    }

    pub fn sse_manager(&self) -> &Arc<Manager> {
        &self.service_state.sse_manager
    }

    pub fn config(&self) -> &Config {
        &self.service_state.config
    }
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let server_url = app_state.config().bind_address();
    let listener = TcpListener::bind(&server_url).await?;
    info!("Server starting... listening for connections on http://{server_url}");

    let cors_layer = cors_layer(&app_state.config().allowed_origins);
    let manager = app_state.sse_manager().clone();

    axum::serve(listener, router::define_routes(app_state).layer(cors_layer))
        .with_graceful_shutdown(shutdown_signal(manager))
        .await
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {origin:?}: {e}");
                None
            }
        })
        .collect();
    info!("CORS allowed origins: {origins:?}");

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_credentials(true)
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_origin(origins)
}

/// Resolves on Ctrl-C or SIGTERM, after closing every open SSE stream so the
/// server can drain.
async fn shutdown_signal(manager: Arc<Manager>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
    manager.shutdown();
}
