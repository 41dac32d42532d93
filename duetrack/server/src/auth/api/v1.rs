/// JSON request payload for API login
#[derive(serde::Deserialize, Debug, ToSchema)]
pub struct JsonLoginRequest {
    pub username: String,
    pub password: String,
}

/// JSON response for successful API login
#[derive(serde::Serialize, serde::Deserialize, Debug, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

/// JSON response for API errors
#[derive(serde::Serialize, serde::Deserialize, Debug, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

use crate::auth::{AuthState, CurrentUser, decode_jwt, encode_jwt};
use crate::user::{UserService, UserServiceError};
use axum::{
    Json, Router,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use utoipa::ToSchema;

/// Creates a JSON API router for authentication endpoints.
pub fn create_api_router(state: Arc<AuthState>) -> Router<()> {
    Router::new()
        .route("/login", axum::routing::post(json_login_handler))
        .with_state(state)
}

/// API authentication middleware that extracts the current user from Authorization Bearer header.
/// Sets the CurrentUser extension if a valid JWT token is found in the Authorization header.
pub async fn auth_user_middleware(
    State(state): State<Arc<AuthState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let bearer_token = headers
        .get("authorization")
        .and_then(|auth_header| auth_header.to_str().ok())
        .and_then(|auth_str| auth_str.strip_prefix("Bearer "));

    if let Some(token) = bearer_token {
        if let Ok(claims) = decode_jwt(token, &state.jwt_secret) {
            let current_user = CurrentUser::new(claims.user_id, claims.username);
            request.extensions_mut().insert(current_user);
        }
    }

    next.run(request).await
}

/// Middleware that ensures the current user is authenticated.
/// Returns UNAUTHORIZED if the CurrentUser extension is not found in the request.
/// This middleware should be applied after auth_user_middleware.
pub async fn require_auth_middleware(request: Request, next: Next) -> Response {
    let is_authenticated = request.extensions().get::<CurrentUser>().is_some();

    if !is_authenticated {
        let error_response = ErrorResponse::new(
            "UNAUTHORIZED",
            "Authentication required to access this resource",
        );
        return (StatusCode::UNAUTHORIZED, Json(error_response)).into_response();
    }

    next.run(request).await
}

/// Handles JSON login requests and returns a JWT token.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = JsonLoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn json_login_handler(
    State(state): State<Arc<AuthState>>,
    Json(payload): Json<JsonLoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<ErrorResponse>)> {
    let user_service = UserService::new(&state.db);
    let user = match user_service
        .authenticate(&payload.username, &payload.password)
        .await
    {
        Ok(user) => user,
        Err(UserServiceError::InvalidCredentials) => {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new(
                    "INVALID_CREDENTIALS",
                    "Invalid username or password",
                )),
            ));
        }
        Err(err) => {
            tracing::error!("API login failed: {}", err);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "INTERNAL_ERROR",
                    "Failed to verify credentials",
                )),
            ));
        }
    };

    let current_user = CurrentUser::from(user);
    let jwt_token =
        encode_jwt(current_user.id, current_user.username, &state.jwt_secret).map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "JWT_ERROR",
                    "Failed to generate authentication token",
                )),
            )
        })?;

    Ok(Json(LoginResponse { token: jwt_token }))
}
