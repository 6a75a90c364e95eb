//! Database row types and their conversion into domain values.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::{Booking, Player, Session, Sport, User};
use crate::error::BookingError;

/// A row from the `sports` table.
#[derive(Debug, Clone, FromRow)]
pub struct SportRow {
    /// Primary key.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Description, empty when unset.
    pub description: String,
    /// `NUMERIC(8,2)` hourly price.
    pub price_per_hour: Decimal,
    /// Opening time.
    pub available_from: NaiveTime,
    /// Closing time.
    pub available_to: NaiveTime,
    /// Insert timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<SportRow> for Sport {
    fn from(row: SportRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            description: row.description,
            price_per_hour: row.price_per_hour,
            available_from: row.available_from,
            available_to: row.available_to,
            created_at: row.created_at,
        }
    }
}

/// A row from the `bookings` table.
#[derive(Debug, Clone, FromRow)]
pub struct BookingRow {
    /// Primary key.
    pub id: Uuid,
    /// `sports.id`.
    pub sport_id: Uuid,
    /// `users.id` of the owner.
    pub owner_id: Uuid,
    /// Reservation date.
    pub booking_date: NaiveDate,
    /// Inclusive start.
    pub start_time: NaiveTime,
    /// Exclusive end.
    pub end_time: NaiveTime,
    /// `NUMERIC(10,2)` price.
    pub total_price: Decimal,
    /// `pending`, `confirmed` or `cancelled`.
    pub status: String,
    /// Insert timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = BookingError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            sport_id: row.sport_id.into(),
            owner_id: row.owner_id.into(),
            date: row.booking_date,
            start_time: row.start_time,
            end_time: row.end_time,
            total_price: row.total_price,
            status: row.status.parse()?,
            created_at: row.created_at,
        })
    }
}

/// A row from the `players` table.
#[derive(Debug, Clone, FromRow)]
pub struct PlayerRow {
    /// Primary key.
    pub id: Uuid,
    /// `bookings.id`.
    pub booking_id: Uuid,
    /// `users.id`, nullable.
    pub user_id: Option<Uuid>,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// `in` or `out`.
    pub status: String,
    /// Insert timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PlayerRow> for Player {
    type Error = BookingError;

    fn try_from(row: PlayerRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            booking_id: row.booking_id.into(),
            user_id: row.user_id.map(Into::into),
            name: row.name,
            email: row.email,
            status: row.status.parse()?,
            created_at: row.created_at,
        })
    }
}

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    /// Primary key.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Argon2 encoded hash.
    pub password_hash: String,
    /// Reset-on-first-login flag.
    pub must_reset_password: bool,
    /// Insert timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id.into(),
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            must_reset_password: row.must_reset_password,
            created_at: row.created_at,
        }
    }
}

/// A row from the `sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    /// Bearer token, primary key.
    pub token: Uuid,
    /// `users.id`.
    pub user_id: Uuid,
    /// Issue timestamp.
    pub created_at: DateTime<Utc>,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Self {
            token: row.token,
            user_id: row.user_id.into(),
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}
