//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::BookingStore;
use super::models::{BookingRow, PlayerRow, SessionRow, SportRow, UserRow};
use crate::config::AppConfig;
use crate::domain::{
    Booking, BookingId, BookingStatus, CheckInStatus, NewBooking, NewPlayer, NewSport, NewUser,
    Player, PlayerId, Roster, Session, Sport, SportId, User, UserId,
};
use crate::error::BookingError;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const EXCLUSION_VIOLATION: &str = "23P01";

const SPORT_COLUMNS: &str =
    "id, name, description, price_per_hour, available_from, available_to, created_at";
const BOOKING_COLUMNS: &str = "id, sport_id, owner_id, booking_date, start_time, end_time, \
     total_price, status, created_at";
const PLAYER_COLUMNS: &str = "id, booking_id, user_id, name, email, status, created_at";
const USER_COLUMNS: &str = "id, username, email, password_hash, must_reset_password, created_at";

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized from `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`BookingError::PersistenceError`] if the database cannot
    /// be reached.
    pub async fn connect(config: &AppConfig) -> Result<Self, BookingError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`BookingError::PersistenceError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), BookingError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| BookingError::PersistenceError(e.to_string()))
    }
}

/// Returns the SQLSTATE of a database error, if any.
fn sql_state(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|c| c.into_owned()),
        _ => None,
    }
}

fn count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

#[async_trait]
impl BookingStore for PostgresStore {
    async fn list_sports(&self) -> Result<Vec<Sport>, BookingError> {
        let rows = sqlx::query_as::<_, SportRow>(&format!(
            "SELECT {SPORT_COLUMNS} FROM sports ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Sport::from).collect())
    }

    async fn get_sport(&self, id: SportId) -> Result<Sport, BookingError> {
        sqlx::query_as::<_, SportRow>(&format!(
            "SELECT {SPORT_COLUMNS} FROM sports WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .map(Sport::from)
        .ok_or(BookingError::SportNotFound(*id.as_uuid()))
    }

    async fn insert_sport(&self, sport: NewSport) -> Result<Sport, BookingError> {
        let row = sqlx::query_as::<_, SportRow>(&format!(
            "INSERT INTO sports (id, name, description, price_per_hour, available_from, available_to) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {SPORT_COLUMNS}"
        ))
        .bind(SportId::new().as_uuid())
        .bind(sport.name.trim())
        .bind(&sport.description)
        .bind(sport.price_per_hour)
        .bind(sport.available_from)
        .bind(sport.available_to)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn reserve(&self, booking: NewBooking) -> Result<Booking, BookingError> {
        let overlap = || BookingError::SlotOverlap {
            date: booking.date,
            start: booking.window.start(),
            end: booking.window.end(),
        };

        let mut tx = self.pool.begin().await?;

        // Row lock on the sport serializes concurrent reservations for it.
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM sports WHERE id = $1 FOR UPDATE")
                .bind(booking.sport_id.as_uuid())
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(BookingError::SportNotFound(*booking.sport_id.as_uuid()));
        }

        let conflict: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM bookings \
             WHERE sport_id = $1 AND booking_date = $2 AND status = $3 \
               AND start_time < $5 AND $4 < end_time \
             LIMIT 1",
        )
        .bind(booking.sport_id.as_uuid())
        .bind(booking.date)
        .bind(BookingStatus::Confirmed.as_str())
        .bind(booking.window.start())
        .bind(booking.window.end())
        .fetch_optional(&mut *tx)
        .await?;
        if let Some(existing) = conflict {
            tracing::debug!(%existing, "reservation intersects confirmed booking");
            return Err(overlap());
        }

        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "INSERT INTO bookings \
             (id, sport_id, owner_id, booking_date, start_time, end_time, total_price, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(BookingId::new().as_uuid())
        .bind(booking.sport_id.as_uuid())
        .bind(booking.owner_id.as_uuid())
        .bind(booking.date)
        .bind(booking.window.start())
        .bind(booking.window.end())
        .bind(booking.total_price)
        .bind(BookingStatus::Confirmed.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match sql_state(&e).as_deref() {
            Some(EXCLUSION_VIOLATION) => overlap(),
            _ => BookingError::from(e),
        })?;

        tx.commit().await.map_err(|e| match sql_state(&e).as_deref() {
            Some(EXCLUSION_VIOLATION) => overlap(),
            _ => BookingError::from(e),
        })?;

        row.try_into()
    }

    async fn get_booking(&self, id: BookingId) -> Result<Booking, BookingError> {
        sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(BookingError::BookingNotFound(*id.as_uuid()))?
        .try_into()
    }

    async fn list_bookings_by_owner(
        &self,
        owner: UserId,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Booking>, BookingError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE owner_id = $1 \
             ORDER BY booking_date DESC, start_time DESC, id ASC \
             LIMIT $2 OFFSET $3"
        ))
        .bind(owner.as_uuid())
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn count_bookings_by_owner(&self, owner: UserId) -> Result<u64, BookingError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE owner_id = $1")
            .bind(owner.as_uuid())
            .fetch_one(&self.pool)
            .await?;
        Ok(count(total))
    }

    async fn insert_player(&self, player: NewPlayer) -> Result<Player, BookingError> {
        let booking_id = *player.booking_id.as_uuid();
        let row = sqlx::query_as::<_, PlayerRow>(&format!(
            "INSERT INTO players (id, booking_id, user_id, name, email, status) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {PLAYER_COLUMNS}"
        ))
        .bind(PlayerId::new().as_uuid())
        .bind(booking_id)
        .bind(player.user_id.map(Uuid::from))
        .bind(&player.name)
        .bind(&player.email)
        .bind(CheckInStatus::Out.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match sql_state(&e).as_deref() {
            Some(FOREIGN_KEY_VIOLATION) => BookingError::BookingNotFound(booking_id),
            _ => BookingError::from(e),
        })?;
        row.try_into()
    }

    async fn get_player(&self, id: PlayerId) -> Result<Player, BookingError> {
        sqlx::query_as::<_, PlayerRow>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(BookingError::PlayerNotFound(*id.as_uuid()))?
        .try_into()
    }

    async fn list_players(&self, booking: BookingId) -> Result<Vec<Player>, BookingError> {
        let rows = sqlx::query_as::<_, PlayerRow>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE booking_id = $1 \
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(booking.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Player::try_from).collect()
    }

    async fn list_players_for_bookings(
        &self,
        bookings: &[BookingId],
    ) -> Result<Vec<Player>, BookingError> {
        if bookings.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = bookings.iter().map(|b| *b.as_uuid()).collect();
        let rows = sqlx::query_as::<_, PlayerRow>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE booking_id = ANY($1) \
             ORDER BY booking_id, created_at ASC, id ASC"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Player::try_from).collect()
    }

    async fn toggle_player(&self, id: PlayerId) -> Result<Player, BookingError> {
        sqlx::query_as::<_, PlayerRow>(&format!(
            "UPDATE players SET status = CASE status WHEN 'in' THEN 'out' ELSE 'in' END \
             WHERE id = $1 RETURNING {PLAYER_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(BookingError::PlayerNotFound(*id.as_uuid()))?
        .try_into()
    }

    async fn roster(&self, booking: BookingId) -> Result<Roster, BookingError> {
        let (total, checked_in) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE status = 'in') \
             FROM players WHERE booking_id = $1",
        )
        .bind(booking.as_uuid())
        .fetch_one(&self.pool)
        .await?;
        Ok(Roster {
            total_players: count(total),
            checked_in: count(checked_in),
        })
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, BookingError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (id, username, email, password_hash, must_reset_password) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        ))
        .bind(UserId::new().as_uuid())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.must_reset_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match sql_state(&e).as_deref() {
            Some(UNIQUE_VIOLATION) => BookingError::UsernameTaken(user.username.clone()),
            _ => BookingError::from(e),
        })?;
        Ok(row.into())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, BookingError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, BookingError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn update_password(&self, id: UserId, password_hash: &str) -> Result<(), BookingError> {
        sqlx::query("UPDATE users SET password_hash = $2, must_reset_password = FALSE WHERE id = $1")
            .bind(id.as_uuid())
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_session(&self, session: Session) -> Result<(), BookingError> {
        sqlx::query(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(session.token)
        .bind(session.user_id.as_uuid())
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_session(
        &self,
        token: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, BookingError> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT token, user_id, created_at, expires_at FROM sessions \
             WHERE token = $1 AND expires_at > $2",
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Session::from))
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, BookingError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_session(&self, token: Uuid) -> Result<(), BookingError> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
