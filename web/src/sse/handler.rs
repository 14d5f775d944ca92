use crate::extractors::authenticated_user::{authenticate, bearer_token};
use crate::params::sse::StreamParams;
use crate::AppState;
use async_stream::stream;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use domain::room;
use futures::Stream;
use log::*;
use sse::connection::ConnectionId;
use sse::Manager;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Unregisters the connection when the response stream is dropped, whether the
/// channel closed or the client went away.
struct ConnectionGuard {
    manager: Arc<Manager>,
    connection_id: ConnectionId,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.manager.unregister_connection(&self.connection_id);
    }
}

/// SSE handler that establishes a long-lived connection for real-time updates.
/// The connection joins its owner's user room, so every tab or device the user
/// has open receives the same events.
pub(crate) async fn sse_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<StreamParams>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, Response> {
    let token = bearer_token(&headers).or(params.token.as_deref());
    let user = authenticate(&app_state, token)
        .await
        .map_err(IntoResponse::into_response)?;

    let user_room = room::for_user(&user.id);
    debug!("Establishing SSE connection for user {} in room {user_room}", user.id);

    let (tx, mut rx) = mpsc::unbounded_channel();

    let manager = app_state.sse_manager().clone();
    let connection_id = manager
        .register_connection(vec![user_room], tx)
        .map_err(|e| {
            warn!("Refusing SSE connection for user {}: {e}", user.id);
            (StatusCode::SERVICE_UNAVAILABLE, "SERVICE UNAVAILABLE").into_response()
        })?;

    let guard = ConnectionGuard {
        manager,
        connection_id,
    };
    let user_id = user.id;

    let stream = stream! {
        let _guard = guard;
        while let Some(frame) = rx.recv().await {
            yield Ok::<Event, Infallible>(frame.to_sse_event());
        }

        debug!("SSE connection closed for user {user_id}, cleaning up");
    };

    let keep_alive = KeepAlive::new().interval(Duration::from_secs(
        app_state.config().sse_keep_alive_secs,
    ));

    Ok(Sse::new(stream).keep_alive(keep_alive))
}
