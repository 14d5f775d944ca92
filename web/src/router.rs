use crate::{controller::health_check_controller, params, sse, AppState};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::controller::artifact_controller;

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI document. To be a part
// of the rendered document, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Artifact Relay API"
        ),
        paths(
            artifact_controller::push,
            health_check_controller::health_check,
        ),
        components(
            schemas(
                params::artifact::PushParams,
                params::artifact::PushResponse,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "artifact_relay", description = "Push artifacts to a user's live sessions")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines our bearer token authentication requirement for gaining access to our
// API endpoints for OpenAPI.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(artifact_routes(app_state.clone()))
        .merge(sse_routes(app_state))
        .merge(health_routes())
        // FIXME: protect the OpenAPI web UI
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn artifact_routes(app_state: AppState) -> Router {
    let body_limit = app_state.config().max_request_body_bytes;
    Router::new()
        .route("/artifact/push", post(artifact_controller::push))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(app_state)
}

fn sse_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/sse", get(sse::handler::sse_handler))
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}
