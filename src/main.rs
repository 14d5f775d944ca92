use domain::auth::JwtAuthenticator;
use log::{error, info};
use service::{config::Config, logging::Logger};
use sse::Manager;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
        std::process::exit(1);
    }

    info!(
        "Starting artifact relay [{} environment]...",
        config.runtime_env()
    );

    let sse_manager = Arc::new(Manager::new());
    let authenticator = Arc::new(JwtAuthenticator::from_config(&config));

    let service_state = service::AppState::new(config, &sse_manager);
    let app_state = web::AppState::new(service_state, authenticator);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server failed: {e}");
        std::process::exit(1);
    }

    info!("Artifact relay stopped");
}
