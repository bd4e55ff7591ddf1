use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::json;

use crate::{
    error::ApiError,
    middleware::{session_token, TOKEN_COOKIE},
    model::{NewTodoItem, NewUser, TodoItem, User},
    schema::{CreateItemSchema, ListItemsQuery, SigninSchema, SignupSchema},
    token::{Claims, IssuedToken},
    AppState,
};

// Handler for the health checker route
pub async fn health_checker_handler() -> impl IntoResponse {
    const MESSAGE: &str = "Multi-user to-do API with Rust, SQLX, SQLite, and Axum";

    let json_response = serde_json::json!({
        "status": "success",
        "message": MESSAGE
    });

    Json(json_response)
}

// Handler for listing the caller's items
#[tracing::instrument(skip(state))]
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    query: Result<Query<ListItemsQuery>, QueryRejection>,
) -> Result<Json<Vec<TodoItem>>, ApiError> {
    let Query(query) = query.map_err(|err| ApiError::Validation(err.body_text()))?;
    let items = state.items.list(query.limit(), claims.user_id).await?;
    Ok(Json(items))
}

// Handler for creating a new item owned by the caller
#[tracing::instrument(skip(state, body))]
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<CreateItemSchema>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body.map_err(|err| ApiError::Validation(err.body_text()))?;

    if body.name.trim().is_empty() {
        return Err(ApiError::Validation("Item name must not be empty".to_owned()));
    }

    let item = state
        .items
        .create(&NewTodoItem {
            name: body.name,
            date: body.date,
            description: body.description,
            user_id: claims.user_id,
        })
        .await?;

    tracing::info!(item_id = item.id, "Item created");
    Ok((StatusCode::CREATED, Json(item)))
}

// Handler for getting one of the caller's items by ID
#[tracing::instrument(skip(state))]
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<TodoItem>, ApiError> {
    let Path(id) = id.map_err(|err| ApiError::Validation(err.body_text()))?;
    let item = state.items.get_one(id, claims.user_id).await?;
    Ok(Json(item))
}

// Handler for the caller's own user record
#[tracing::instrument(skip(state))]
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<User>, ApiError> {
    let user = state.users.get_one(claims.user_id).await?;
    Ok(Json(user))
}

#[tracing::instrument(skip(state, jar, body))]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Result<Json<SignupSchema>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body.map_err(|err| ApiError::Validation(err.body_text()))?;

    if body.username.trim().is_empty() {
        return Err(ApiError::Validation("Username must not be empty".to_owned()));
    }
    if body.password.is_empty() {
        return Err(ApiError::Validation("Password must not be empty".to_owned()));
    }
    if !body.email.contains('@') {
        return Err(ApiError::Validation("Email address is invalid".to_owned()));
    }

    let new_user = NewUser {
        username: body.username,
        name: body.name,
        email: body.email,
    };
    let user = state.users.create(&new_user, &body.password).await?;
    let issued = state.tokens.issue(&user)?;

    tracing::info!(user_id = user.user_id, "User signed up");
    Ok((
        StatusCode::CREATED,
        jar.add(token_cookie(&issued, state.tokens.ttl())?),
        Json(user),
    ))
}

#[tracing::instrument(skip(state, jar, body))]
pub async fn signin(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Result<Json<SigninSchema>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body.map_err(|err| ApiError::Validation(err.body_text()))?;

    if !state.users.validate(&body.password, &body.username).await? {
        tracing::info!("Rejected sign in attempt");
        return Err(ApiError::Authentication(
            "Your username or password is incorrect".to_owned(),
        ));
    }

    let user = state.users.get_by_username(&body.username).await?;
    let issued = state.tokens.issue(&user)?;

    tracing::info!(user_id = user.user_id, "User signed in");
    Ok((
        jar.add(token_cookie(&issued, state.tokens.ttl())?),
        Json(user),
    ))
}

// Re-issues the session token when it is close to expiring
#[tracing::instrument(skip_all)]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let token = session_token(&headers)
        .ok_or_else(|| ApiError::Authentication("You are not signed in.".to_owned()))?;

    let issued = state.tokens.refresh(&token)?;

    Ok((
        jar.add(token_cookie(&issued, state.tokens.ttl())?),
        StatusCode::OK,
    ))
}

// Drops the session cookie. The token itself stays valid until it expires.
pub async fn signout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build(TOKEN_COOKIE, "").path("/").finish());
    (jar, Json(json!({"status": "success"})))
}

// Gives the bare 408 of the timeout layer the same JSON body as other errors
pub async fn timeout_as_json(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        tracing::warn!("Request timed out");
        return ApiError::Timeout("Request timed out".to_owned()).into_response();
    }
    response
}

fn token_cookie(issued: &IssuedToken, max_age: i64) -> Result<Cookie<'static>, ApiError> {
    let cookie = format!(
        "{TOKEN_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}",
        issued.token
    );
    Cookie::parse(cookie).map_err(|err| {
        tracing::error!("Failed to build session cookie: {}", err);
        ApiError::Internal("Internal server error".to_owned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn timeout_rendered_as_json() {
        let response = timeout_as_json(StatusCode::REQUEST_TIMEOUT.into_response()).await;

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        let body = body_json(response).await;
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], "Request timed out");
    }

    #[tokio::test]
    async fn other_responses_untouched() {
        let response = timeout_as_json((StatusCode::CREATED, "created").into_response()).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        assert_eq!(&bytes[..], b"created");
    }
}
