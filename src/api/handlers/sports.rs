//! Sport catalog handlers: list, get, create.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::auth::AdminAccess;
use crate::app_state::AppState;
use crate::domain::{NewSport, Sport, SportId};
use crate::error::{BookingError, ErrorResponse};

/// `GET /sports` — List bookable sports.
///
/// # Errors
///
/// Returns [`BookingError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/sports",
    tag = "Sports",
    summary = "List sports",
    description = "Returns every sport in the catalog, ordered by name.",
    responses(
        (status = 200, description = "Sport catalog", body = Vec<Sport>),
    )
)]
pub async fn list_sports(State(state): State<AppState>) -> Result<impl IntoResponse, BookingError> {
    Ok(Json(state.catalog.list_sports().await?))
}

/// `GET /sports/:id` — Sport details.
///
/// # Errors
///
/// Returns [`BookingError::SportNotFound`] if the sport does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/sports/{id}",
    tag = "Sports",
    summary = "Get sport details",
    description = "Returns price and opening hours for one sport.",
    params(
        ("id" = uuid::Uuid, Path, description = "Sport UUID"),
    ),
    responses(
        (status = 200, description = "Sport details", body = Sport),
        (status = 404, description = "Sport not found", body = ErrorResponse),
    )
)]
pub async fn get_sport(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, BookingError> {
    Ok(Json(state.catalog.get_sport(SportId::from(id)).await?))
}

/// `POST /sports` — Add a sport to the catalog.
///
/// # Errors
///
/// Returns [`BookingError::InvalidRequest`] for an invalid entry, or an
/// auth error without a valid admin key.
#[utoipa::path(
    post,
    path = "/api/v1/sports",
    tag = "Sports",
    summary = "Create a sport",
    description = "Adds a sport with its hourly price and opening hours. Requires an `X-Admin-Key` header.",
    request_body = NewSport,
    security(("admin_key" = [])),
    responses(
        (status = 201, description = "Sport created", body = Sport),
        (status = 400, description = "Invalid entry", body = ErrorResponse),
        (status = 401, description = "Missing admin key", body = ErrorResponse),
        (status = 403, description = "Invalid admin key", body = ErrorResponse),
    )
)]
pub async fn create_sport(
    _admin: AdminAccess,
    State(state): State<AppState>,
    Json(req): Json<NewSport>,
) -> Result<impl IntoResponse, BookingError> {
    let sport = state.catalog.create_sport(req).await?;
    Ok((StatusCode::CREATED, Json(sport)))
}

/// Sport routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sports", get(list_sports).post(create_sport))
        .route("/sports/{id}", get(get_sport))
}
