//! Booking handlers: reserve, list, detail, add players.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::auth::AuthUser;
use crate::api::dto::{
    AddPlayersRequest, AddPlayersResponse, BookingListResponse, PaginationParams, ReserveRequest,
};
use crate::app_state::AppState;
use crate::domain::{Booking, BookingId, SportId};
use crate::error::{BookingError, ErrorResponse};
use crate::service::BookingOverview;

/// `POST /sports/:id/bookings` — Reserve a slot.
///
/// # Errors
///
/// Returns [`BookingError::SlotOverlap`] if the window is taken,
/// [`BookingError::InvalidRequest`] for an empty window or one outside
/// opening hours.
#[utoipa::path(
    post,
    path = "/api/v1/sports/{id}/bookings",
    tag = "Bookings",
    summary = "Reserve a slot",
    description = "Books the sport for the requested window. The booking is confirmed immediately and priced from the sport's hourly rate.",
    params(
        ("id" = uuid::Uuid, Path, description = "Sport UUID"),
    ),
    request_body = ReserveRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Booking confirmed", body = Booking),
        (status = 400, description = "Invalid window", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 404, description = "Sport not found", body = ErrorResponse),
        (status = 409, description = "Slot already booked", body = ErrorResponse),
    )
)]
pub async fn reserve(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<ReserveRequest>,
) -> Result<impl IntoResponse, BookingError> {
    let booking = state
        .bookings
        .reserve(
            SportId::from(id),
            req.date,
            req.start_time,
            req.end_time,
            user.id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// `GET /bookings` — The caller's bookings.
///
/// # Errors
///
/// Returns [`BookingError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    tag = "Bookings",
    summary = "List my bookings",
    description = "Returns the caller's bookings, newest date first, each with its players and check-in counts.",
    params(PaginationParams),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Paginated booking list", body = BookingListResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
    )
)]
pub async fn list_bookings(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, BookingError> {
    let params = params.clamped();
    let (data, total) = state
        .bookings
        .list_for_owner(user.id, params.per_page, params.offset())
        .await?;
    let pagination = params.meta(total);
    Ok(Json(BookingListResponse { data, pagination }))
}

/// `GET /bookings/:id` — Booking details with roster.
///
/// # Errors
///
/// Returns [`BookingError::BookingNotFound`] if the booking does not exist
/// or belongs to someone else.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    summary = "Get booking details",
    description = "Returns one of the caller's bookings with its players and check-in counts.",
    params(
        ("id" = uuid::Uuid, Path, description = "Booking UUID"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Booking details", body = BookingOverview),
        (status = 404, description = "Booking not found", body = ErrorResponse),
    )
)]
pub async fn get_booking(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, BookingError> {
    Ok(Json(state.bookings.get(BookingId::from(id), user.id).await?))
}

/// `POST /bookings/:id/players` — Attach players.
///
/// # Errors
///
/// Returns [`BookingError::BookingNotFound`] if the caller does not own the
/// booking, [`BookingError::IdentityConflict`] if a login cannot be
/// provisioned.
#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/players",
    tag = "Bookings",
    summary = "Add players",
    description = "Adds players to a booking the caller owns. Rows with a blank name or email are skipped. Each added player gets a login whose one-time password is returned here and nowhere else.",
    params(
        ("id" = uuid::Uuid, Path, description = "Booking UUID"),
    ),
    request_body = AddPlayersRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Players added", body = AddPlayersResponse),
        (status = 404, description = "Booking not found", body = ErrorResponse),
        (status = 409, description = "No free username", body = ErrorResponse),
    )
)]
pub async fn add_players(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<AddPlayersRequest>,
) -> Result<impl IntoResponse, BookingError> {
    let booking_id = BookingId::from(id);
    let added = state
        .bookings
        .add_players(booking_id, user.id, &req.players)
        .await?;
    let roster = state.bookings.roster(booking_id).await?;

    let response = AddPlayersResponse {
        booking_id,
        skipped: req.players.len().saturating_sub(added.len()),
        added,
        roster,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Booking routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sports/{id}/bookings", post(reserve))
        .route("/bookings", get(list_bookings))
        .route("/bookings/{id}", get(get_booking))
        .route("/bookings/{id}/players", post(add_players))
}
