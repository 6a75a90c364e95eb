//! Player handlers: badge, manual toggle, and the QR scan target.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::auth::AuthUser;
use crate::api::dto::CheckInResponse;
use crate::app_state::AppState;
use crate::domain::PlayerId;
use crate::domain::checkin_token::CHECKIN_PATH;
use crate::error::{BookingError, ErrorResponse};
use crate::service::PlayerCard;

async fn toggle_and_report(
    state: &AppState,
    player_id: PlayerId,
) -> Result<CheckInResponse, BookingError> {
    let player = state.checkins.toggle(player_id).await?;
    let roster = state.bookings.roster(player.booking_id).await?;
    Ok(CheckInResponse {
        player_id: player.id,
        name: player.name,
        booking_id: player.booking_id,
        status: player.status,
        roster,
    })
}

/// `GET /players/:id` — Player badge.
///
/// # Errors
///
/// Returns [`BookingError::PlayerNotFound`] if the player does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/players/{id}",
    tag = "Players",
    summary = "Get player badge",
    description = "Returns the player, their check-in token, and the token rendered as an SVG QR code.",
    params(
        ("id" = uuid::Uuid, Path, description = "Player UUID"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Player badge", body = PlayerCard),
        (status = 404, description = "Player not found", body = ErrorResponse),
    )
)]
pub async fn get_player(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, BookingError> {
    Ok(Json(state.checkins.player_card(PlayerId::from(id)).await?))
}

/// `POST /players/:id/toggle` — Manual check-in toggle.
///
/// # Errors
///
/// Returns [`BookingError::PlayerNotFound`] if the player does not exist.
#[utoipa::path(
    post,
    path = "/api/v1/players/{id}/toggle",
    tag = "Players",
    summary = "Toggle check-in",
    description = "Flips the player between `in` and `out` and returns the new status with booking counts.",
    params(
        ("id" = uuid::Uuid, Path, description = "Player UUID"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Status toggled", body = CheckInResponse),
        (status = 404, description = "Player not found", body = ErrorResponse),
    )
)]
pub async fn toggle_player(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, BookingError> {
    Ok(Json(toggle_and_report(&state, PlayerId::from(id)).await?))
}

/// `GET /checkin/:id` — QR scan target.
///
/// The URL printed in every QR badge. Scanning it toggles the player; no
/// session is required since the player UUID is the credential.
///
/// # Errors
///
/// Returns [`BookingError::PlayerNotFound`] if the player does not exist.
#[utoipa::path(
    get,
    path = "/checkin/{id}",
    tag = "Players",
    summary = "Scan check-in badge",
    description = "Target of the QR code. Toggles the player's check-in status.",
    params(
        ("id" = uuid::Uuid, Path, description = "Player UUID"),
    ),
    responses(
        (status = 200, description = "Status toggled", body = CheckInResponse),
        (status = 404, description = "Player not found", body = ErrorResponse),
    )
)]
pub async fn scan_checkin(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, BookingError> {
    Ok(Json(toggle_and_report(&state, PlayerId::from(id)).await?))
}

/// Player routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/players/{id}", get(get_player))
        .route("/players/{id}/toggle", post(toggle_player))
}

/// Scan route, mounted at the root so printed badges stay short.
pub fn scan_routes() -> Router<AppState> {
    Router::new().route(&format!("{CHECKIN_PATH}/{{id}}"), get(scan_checkin))
}
