//! Persistence layer: the [`BookingStore`] trait and its backends.
//!
//! [`postgres::PostgresStore`] is the production backend on `sqlx::PgPool`.
//! [`memory::MemoryStore`] keeps everything behind a single
//! [`tokio::sync::RwLock`] and backs the test suites and
//! `STORAGE_BACKEND=memory` deployments.
//!
//! Every operation that must be race-free is a single trait call so each
//! backend can make it atomic: [`BookingStore::reserve`] checks and inserts
//! under one lock or transaction, [`BookingStore::toggle_player`] flips in
//! one statement, and [`BookingStore::insert_user`] relies on the unique
//! username constraint.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Booking, BookingId, NewBooking, NewPlayer, NewSport, NewUser, Player, PlayerId, Roster,
    Session, Sport, SportId, User, UserId,
};
use crate::error::BookingError;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Storage operations required by the service layer.
#[async_trait]
pub trait BookingStore: Send + Sync + std::fmt::Debug {
    /// Lists the catalog ordered by name.
    ///
    /// # Errors
    ///
    /// [`BookingError::PersistenceError`] on storage failure.
    async fn list_sports(&self) -> Result<Vec<Sport>, BookingError>;

    /// Fetches one sport.
    ///
    /// # Errors
    ///
    /// [`BookingError::SportNotFound`] if the id is unknown.
    async fn get_sport(&self, id: SportId) -> Result<Sport, BookingError>;

    /// Adds a sport to the catalog.
    ///
    /// # Errors
    ///
    /// [`BookingError::PersistenceError`] on storage failure.
    async fn insert_sport(&self, sport: NewSport) -> Result<Sport, BookingError>;

    /// Atomically checks `booking` against confirmed bookings of the same
    /// sport and date and inserts it as confirmed.
    ///
    /// # Errors
    ///
    /// [`BookingError::SlotOverlap`] if any confirmed booking intersects the
    /// window, [`BookingError::SportNotFound`] if the sport is gone.
    async fn reserve(&self, booking: NewBooking) -> Result<Booking, BookingError>;

    /// Fetches one booking.
    ///
    /// # Errors
    ///
    /// [`BookingError::BookingNotFound`] if the id is unknown.
    async fn get_booking(&self, id: BookingId) -> Result<Booking, BookingError>;

    /// One page of the bookings owned by `owner`, latest date first.
    ///
    /// # Errors
    ///
    /// [`BookingError::PersistenceError`] on storage failure.
    async fn list_bookings_by_owner(
        &self,
        owner: UserId,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Booking>, BookingError>;

    /// Number of bookings owned by `owner`.
    ///
    /// # Errors
    ///
    /// [`BookingError::PersistenceError`] on storage failure.
    async fn count_bookings_by_owner(&self, owner: UserId) -> Result<u64, BookingError>;

    /// Attaches a player to its booking with status `Out`.
    ///
    /// # Errors
    ///
    /// [`BookingError::PersistenceError`] on storage failure.
    async fn insert_player(&self, player: NewPlayer) -> Result<Player, BookingError>;

    /// Fetches one player.
    ///
    /// # Errors
    ///
    /// [`BookingError::PlayerNotFound`] if the id is unknown.
    async fn get_player(&self, id: PlayerId) -> Result<Player, BookingError>;

    /// Players of a booking in insertion order.
    ///
    /// # Errors
    ///
    /// [`BookingError::PersistenceError`] on storage failure.
    async fn list_players(&self, booking: BookingId) -> Result<Vec<Player>, BookingError>;

    /// Players of several bookings at once, each booking's players in
    /// insertion order.
    ///
    /// # Errors
    ///
    /// [`BookingError::PersistenceError`] on storage failure.
    async fn list_players_for_bookings(
        &self,
        bookings: &[BookingId],
    ) -> Result<Vec<Player>, BookingError>;

    /// Flips a player's status and returns the updated row.
    ///
    /// # Errors
    ///
    /// [`BookingError::PlayerNotFound`] if the id is unknown.
    async fn toggle_player(&self, id: PlayerId) -> Result<Player, BookingError>;

    /// Counts the players of a booking.
    ///
    /// # Errors
    ///
    /// [`BookingError::PersistenceError`] on storage failure.
    async fn roster(&self, booking: BookingId) -> Result<Roster, BookingError>;

    /// Inserts a user.
    ///
    /// # Errors
    ///
    /// [`BookingError::UsernameTaken`] if the username already exists.
    async fn insert_user(&self, user: NewUser) -> Result<User, BookingError>;

    /// Looks a user up by exact username.
    ///
    /// # Errors
    ///
    /// [`BookingError::PersistenceError`] on storage failure.
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, BookingError>;

    /// Fetches one user, `None` if unknown.
    ///
    /// # Errors
    ///
    /// [`BookingError::PersistenceError`] on storage failure.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, BookingError>;

    /// Replaces a user's password hash and clears the reset flag.
    ///
    /// # Errors
    ///
    /// [`BookingError::PersistenceError`] on storage failure.
    async fn update_password(&self, id: UserId, password_hash: &str) -> Result<(), BookingError>;

    /// Stores a new session.
    ///
    /// # Errors
    ///
    /// [`BookingError::PersistenceError`] on storage failure.
    async fn insert_session(&self, session: Session) -> Result<(), BookingError>;

    /// Resolves a token to its session if it has not expired at `now`.
    ///
    /// # Errors
    ///
    /// [`BookingError::PersistenceError`] on storage failure.
    async fn find_session(
        &self,
        token: uuid::Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, BookingError>;

    /// Deletes every session that has expired at `now` and returns how
    /// many were removed.
    ///
    /// # Errors
    ///
    /// [`BookingError::PersistenceError`] on storage failure.
    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, BookingError>;

    /// Deletes a session; unknown tokens are ignored.
    ///
    /// # Errors
    ///
    /// [`BookingError::PersistenceError`] on storage failure.
    async fn delete_session(&self, token: uuid::Uuid) -> Result<(), BookingError>;
}
