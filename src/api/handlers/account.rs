//! Account handlers: signup, login, logout, password change.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::auth::{AuthUser, BearerToken};
use crate::api::dto::{ChangePasswordRequest, LoginRequest, LoginResponse, SignupRequest};
use crate::app_state::AppState;
use crate::domain::User;
use crate::error::{BookingError, ErrorResponse};

/// `POST /auth/signup` — Create an account.
///
/// # Errors
///
/// Returns [`BookingError::IdentityConflict`] if the username is taken,
/// [`BookingError::InvalidRequest`] for a weak password.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    tag = "Auth",
    summary = "Sign up",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Username taken", body = ErrorResponse),
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, BookingError> {
    let user = state
        .identities
        .signup(&req.username, &req.email, &req.password)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /auth/login` — Open a session.
///
/// # Errors
///
/// Returns [`BookingError::Unauthorized`] for bad credentials.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    summary = "Log in",
    description = "Returns a bearer token. `must_reset_password` is set for provisioned players until they change their one-time password.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Bad credentials", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, BookingError> {
    let outcome = state.identities.login(&req.username, &req.password).await?;
    Ok(Json(LoginResponse {
        token: outcome.token,
        expires_at: outcome.expires_at,
        must_reset_password: outcome.user.must_reset_password,
        user: outcome.user,
    }))
}

/// `POST /auth/logout` — End the current session.
///
/// # Errors
///
/// Returns [`BookingError::Unauthorized`] without a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Auth",
    summary = "Log out",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Session ended"),
        (status = 401, description = "No token", body = ErrorResponse),
    )
)]
pub async fn logout(
    BearerToken(token): BearerToken,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, BookingError> {
    state.identities.logout(token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /auth/password` — Change the caller's password.
///
/// # Errors
///
/// Returns [`BookingError::Unauthorized`] if the current password is wrong.
#[utoipa::path(
    post,
    path = "/api/v1/auth/password",
    tag = "Auth",
    summary = "Change password",
    request_body = ChangePasswordRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Weak password", body = ErrorResponse),
        (status = 401, description = "Wrong current password", body = ErrorResponse),
    )
)]
pub async fn change_password(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, BookingError> {
    state
        .identities
        .change_password(&user, &req.current_password, &req.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/password", post(change_password))
}
