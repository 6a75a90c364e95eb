//! Request authentication extractors.
//!
//! Users authenticate with `Authorization: Bearer <session token>`;
//! administrators with a static key in `X-Admin-Key`.

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::domain::User;
use crate::error::BookingError;

/// Header carrying an admin key.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// The user behind a valid session token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// The raw session token, for logout.
#[derive(Debug, Clone, Copy)]
pub struct BearerToken(pub Uuid);

/// Marker proving the request carried a configured admin key.
#[derive(Debug, Clone, Copy)]
pub struct AdminAccess;

/// Configured admin keys.
#[derive(Debug, Clone, Default)]
pub struct AdminKeys {
    keys: Arc<HashSet<String>>,
}

impl AdminKeys {
    /// Builds the key set, dropping blanks.
    pub fn new(keys: impl IntoIterator<Item = String>) -> Self {
        Self {
            keys: Arc::new(keys.into_iter().filter(|k| !k.is_empty()).collect()),
        }
    }

    /// Returns `true` if `key` is configured.
    #[must_use]
    pub fn is_valid(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

fn bearer_token(parts: &Parts) -> Result<Uuid, BookingError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(BookingError::Unauthorized)?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(BookingError::Unauthorized)?;
    Uuid::parse_str(token.trim()).map_err(|_| BookingError::Unauthorized)
}

impl FromRequestParts<AppState> for BearerToken {
    type Rejection = BookingError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        bearer_token(parts).map(Self)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = BookingError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let user = state.identities.authenticate(token).await?;
        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for AdminAccess {
    type Rejection = BookingError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get(ADMIN_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(BookingError::Unauthorized)?;
        if state.admin_keys.is_valid(key) {
            Ok(Self)
        } else {
            tracing::warn!("invalid admin key attempt");
            Err(BookingError::Forbidden("invalid admin key".to_string()))
        }
    }
}
