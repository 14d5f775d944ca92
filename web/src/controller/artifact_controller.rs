use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::params::artifact::{PushParams, PushResponse};
use crate::{AppState, Error};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use domain::artifact as ArtifactApi;

use log::*;

/// POST an HTML artifact to every live session of a user
#[utoipa::path(
    post,
    path = "/artifact/push",
    request_body = PushParams,
    responses(
        (status = 200, description = "Broadcast issued to the user's room (possibly to zero sessions)", body = PushResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is neither an admin nor the target user"),
        (status = 422, description = "Unprocessable Entity"),
        (status = 502, description = "Real-time fabric unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn push(
    AuthenticatedUser(caller): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(params): Json<PushParams>,
) -> Result<impl IntoResponse, Error> {
    debug!(
        "POST push artifact from {} to user {}",
        caller.id, params.user_id
    );

    let outcome =
        ArtifactApi::push(app_state.sse_manager().as_ref(), &caller, params.into()).await?;

    Ok(Json(PushResponse::ok(outcome.session_count)))
}
