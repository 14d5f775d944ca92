use crate::extractors::RejectionType;
use crate::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
};
use domain::caller::CallerIdentity;
use log::*;

/// The verified caller of the current request, resolved from `Authorization: Bearer <token>`.
pub(crate) struct AuthenticatedUser(pub CallerIdentity);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = RejectionType;

    async fn from_request_parts(
        parts: &mut Parts,
        app_state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let caller = authenticate(app_state, bearer_token(&parts.headers)).await?;
        Ok(AuthenticatedUser(caller))
    }
}

/// Extract the token from an `Authorization` header. The scheme is matched case-insensitively.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// Verify `token` with the configured authenticator, rejecting with 401 on any failure.
pub(crate) async fn authenticate(
    app_state: &AppState,
    token: Option<&str>,
) -> Result<CallerIdentity, RejectionType> {
    let Some(token) = token else {
        trace!("Request carried no bearer token");
        return Err(unauthorized());
    };

    app_state.authenticator.verify(token).await.map_err(|e| {
        debug!("Bearer token verification failed: {e}");
        unauthorized()
    })
}

fn unauthorized() -> RejectionType {
    (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
}
