use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::{error::ApiError, AppState};

/// Cookie carrying the session token
pub const TOKEN_COOKIE: &str = "token";

/// Session token sent with the request, either as a bearer token or in the `token` cookie
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(|token| token.trim().to_owned());

    bearer.or_else(|| {
        CookieJar::from_headers(headers)
            .get(TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_owned())
    })
}

/// Rejects requests without a valid session token, otherwise exposes its `Claims` as an extension
pub async fn mw_require_auth<B>(
    State(state): State<Arc<AppState>>,
    mut request: Request<B>,
    next: Next<B>,
) -> Result<Response, ApiError> {
    let token = session_token(request.headers())
        .ok_or_else(|| ApiError::Authentication("You are not signed in.".to_owned()))?;

    let claims = state.tokens.parse(&token).map_err(|err| {
        tracing::debug!("Rejected session token: {}", err);
        ApiError::from(err)
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
