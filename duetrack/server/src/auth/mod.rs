use askama::Template;
use axum::Router;
use axum::extract::{Extension, Form, MatchedPath, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use duetrack_core::UserId;
use jsonwebtoken::encode;
use std::sync::Arc;
use tower_http::trace::MakeSpan;
use tracing::Span;

use crate::config::Config;
use crate::user::{User, UserService, UserServiceError};
use crate::web::render_error_page;

pub mod api;

/// Name of the cookie carrying the session token.
pub const AUTH_COOKIE: &str = "auth_token";

const SESSION_HOURS: i64 = 24;

const SENSITIVE_PATHS: [&str; 3] = ["/login", "/register", "/api/v1/login"];

/// Represents the currently authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
}

impl CurrentUser {
    /// Creates a new CurrentUser instance.
    pub fn new(id: UserId, username: String) -> Self {
        Self { id, username }
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        CurrentUser::new(user.id(), user.username().to_string())
    }
}

/// Authentication state: the user store and the token signing secret.
#[derive(Clone)]
pub struct AuthState {
    pub db: Arc<sea_orm::DatabaseConnection>,
    pub jwt_secret: String,
}

impl AuthState {
    /// Creates a new AuthState from a database connection and the application config.
    pub fn new(db: Arc<sea_orm::DatabaseConnection>, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt_secret.clone(),
        }
    }
}

/// Creates a router with the login, registration and logout routes.
pub fn create_auth_router(state: Arc<AuthState>) -> Router<()> {
    Router::new()
        .route(
            "/login",
            axum::routing::get(login_page_handler).post(login_handler),
        )
        .route(
            "/register",
            axum::routing::get(register_page_handler).post(register_handler),
        )
        .route("/logout", axum::routing::get(logout_handler))
        .with_state(state)
}

/// Authentication middleware that checks for a valid session cookie and sets the CurrentUser extension.
/// This middleware only populates the CurrentUser extension and does not perform redirects.
pub async fn auth_user_middleware(
    State(state): State<Arc<AuthState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token_cookie) = jar.get(AUTH_COOKIE) {
        if let Ok(claims) = decode_jwt(token_cookie.value(), &state.jwt_secret) {
            let current_user = CurrentUser::new(claims.user_id, claims.username);
            request.extensions_mut().insert(current_user);
        }
    }

    next.run(request).await
}

/// Login redirect middleware that redirects unauthenticated users to the login page.
/// This middleware should be applied after auth_user_middleware to check for CurrentUser extension.
pub async fn login_redirect_middleware(request: Request, next: Next) -> Response {
    let is_authenticated = request.extensions().get::<CurrentUser>().is_some();

    if !is_authenticated {
        return Redirect::to("/login").into_response();
    }

    next.run(request).await
}

/// Represents the login and registration form payload.
#[derive(serde::Deserialize, Debug)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct Claims {
    pub exp: usize,       // Expiry time of the token
    pub iat: usize,       // Issued at time of the token
    pub user_id: UserId,  // ID of the authenticated user
    pub username: String, // Username of the authenticated user
}

/// Custom error type for authentication operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Represents an error during template rendering.
    #[error("Template rendering failed")]
    Template(#[from] askama::Error),
    /// Represents an error during JWT operations.
    #[error("JWT operation failed")]
    JwtError,
    /// Represents an unexpected failure of the user store.
    #[error("User service error: {0}")]
    UserService(#[from] UserServiceError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::error!("Authentication request failed: {}", self);
        render_error_page(
            StatusCode::INTERNAL_SERVER_ERROR,
            "An unexpected error occurred while processing your request. Please try again later.",
        )
    }
}

/// Handles the login form submission.
/// Redirects to the task list on success and re-renders the form with an error otherwise.
/// A user who is already logged in is sent straight to the task list.
pub async fn login_handler(
    State(state): State<Arc<AuthState>>,
    jar: CookieJar,
    current_user: Option<Extension<CurrentUser>>,
    Form(payload): Form<CredentialsForm>,
) -> Result<Response, AuthError> {
    if current_user.is_some() {
        return Ok(Redirect::to("/tasks").into_response());
    }

    handle_login_attempt(state, jar, payload).await
}

/// Validates credentials and either starts a session or returns the login form with an error.
#[tracing::instrument(skip(state, jar, payload))]
async fn handle_login_attempt(
    state: Arc<AuthState>,
    jar: CookieJar,
    payload: CredentialsForm,
) -> Result<Response, AuthError> {
    let user_service = UserService::new(&state.db);
    match user_service
        .authenticate(&payload.username, &payload.password)
        .await
    {
        Ok(user) => start_session(&state, jar, user),
        Err(UserServiceError::InvalidCredentials) => {
            tracing::info!("Rejected login attempt");
            let html = LoginTemplate {
                username: None,
                error: Some("Wrong username or password.".to_string()),
            }
            .render()?;
            Ok((StatusCode::UNAUTHORIZED, Html(html)).into_response())
        }
        Err(err) => Err(AuthError::from(err)),
    }
}

/// Handles the registration form submission.
/// A successful registration logs the new user in immediately.
#[tracing::instrument(skip(state, jar, payload))]
pub async fn register_handler(
    State(state): State<Arc<AuthState>>,
    jar: CookieJar,
    Form(payload): Form<CredentialsForm>,
) -> Result<Response, AuthError> {
    let user_service = UserService::new(&state.db);
    let (status, message) = match user_service
        .register(&payload.username, &payload.password)
        .await
    {
        Ok(user) => return start_session(&state, jar, user),
        Err(UserServiceError::DuplicateUsername(_)) => (
            StatusCode::CONFLICT,
            "This username is already taken.".to_string(),
        ),
        Err(UserServiceError::InvalidInput(reason)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Please check your input: {}.", reason),
        ),
        Err(err) => return Err(AuthError::from(err)),
    };

    let html = RegisterTemplate {
        username: None,
        error: Some(message),
    }
    .render()?;
    Ok((status, Html(html)).into_response())
}

/// Ends the session by removing the session cookie.
#[tracing::instrument(skip(jar))]
pub async fn logout_handler(jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar.remove(Cookie::build(AUTH_COOKIE).path("/"));
    (jar, Redirect::to("/"))
}

fn start_session(state: &AuthState, jar: CookieJar, user: User) -> Result<Response, AuthError> {
    let current_user = CurrentUser::from(user);
    let jwt_token = encode_jwt(current_user.id, current_user.username, &state.jwt_secret)
        .map_err(|_| AuthError::JwtError)?;
    tracing::info!("User {} logged in", current_user.id);
    let updated_jar = jar.add(session_cookie(jwt_token));
    Ok((updated_jar, Redirect::to("/tasks")).into_response())
}

fn session_cookie(jwt_token: String) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, jwt_token))
        .http_only(true)
        .secure(false) // Set to true in production with HTTPS
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(SESSION_HOURS))
        .path("/")
        .build()
}

pub fn encode_jwt(user_id: UserId, username: String, jwt_secret: &str) -> anyhow::Result<String> {
    let now = chrono::Utc::now();
    let expire = chrono::Duration::hours(SESSION_HOURS);
    let exp = (now + expire).timestamp() as usize;
    let iat = now.timestamp() as usize;
    let claims = Claims {
        exp,
        iat,
        user_id,
        username,
    };
    let jwt = encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(jwt_secret.as_bytes()),
    )?;
    Ok(jwt)
}

pub fn decode_jwt(token: &str, jwt_secret: &str) -> anyhow::Result<Claims> {
    let token_data = jsonwebtoken::decode(
        token,
        &jsonwebtoken::DecodingKey::from_secret(jwt_secret.as_bytes()),
        &jsonwebtoken::Validation::default(),
    )?;
    Ok(token_data.claims)
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub username: Option<String>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub username: Option<String>,
    pub error: Option<String>,
}

/// Handles GET requests to display the login page.
#[tracing::instrument]
pub async fn login_page_handler(
    current_user: Option<Extension<CurrentUser>>,
) -> Result<Html<String>, AuthError> {
    let username = current_user.map(|Extension(user)| user.username);

    let template = LoginTemplate {
        username,
        error: None,
    };
    template.render().map(Html).map_err(AuthError::from)
}

/// Handles GET requests to display the registration page.
#[tracing::instrument]
pub async fn register_page_handler(
    current_user: Option<Extension<CurrentUser>>,
) -> Result<Html<String>, AuthError> {
    let username = current_user.map(|Extension(user)| user.username);

    let template = RegisterTemplate {
        username,
        error: None,
    };
    template.render().map(Html).map_err(AuthError::from)
}

/// Custom span maker that keeps credentials out of request spans.
/// Sensitive routes are flagged and never record headers, cookies or bodies.
#[derive(Clone, Debug)]
pub struct FilteredMakeSpan;

impl<B> MakeSpan<B> for FilteredMakeSpan {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let uri = request.uri();
        let method = request.method();
        let matched_path = request
            .extensions()
            .get::<MatchedPath>()
            .map(MatchedPath::as_str);

        if SENSITIVE_PATHS.contains(&uri.path()) {
            tracing::info_span!(
                "request",
                method = %method,
                path = %uri.path(),
                matched_path,
                sensitive_route = true,
            )
        } else {
            tracing::info_span!(
                "request",
                method = %method,
                uri = %uri,
                matched_path,
            )
        }
    }
}
