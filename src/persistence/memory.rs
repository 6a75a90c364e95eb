//! In-process store guarded by a single [`tokio::sync::RwLock`].
//!
//! Every mutation takes the write lock for its whole check-then-write
//! sequence, which is what makes [`BookingStore::reserve`] atomic here.
//! Reads share the lock.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::BookingStore;
use crate::domain::sport::PRICE_SCALE;
use crate::domain::{
    Booking, BookingId, BookingStatus, CheckInStatus, NewBooking, NewPlayer, NewSport, NewUser,
    Player, PlayerId, Roster, Session, Sport, SportId, User, UserId,
};
use crate::error::BookingError;

#[derive(Debug, Default)]
struct Tables {
    sports: HashMap<SportId, Sport>,
    bookings: HashMap<BookingId, Booking>,
    players: HashMap<PlayerId, Player>,
    // Insertion order per booking.
    roster_order: HashMap<BookingId, Vec<PlayerId>>,
    users: HashMap<UserId, User>,
    usernames: HashMap<String, UserId>,
    sessions: HashMap<Uuid, Session>,
}

impl Tables {
    fn players_of(&self, booking: BookingId) -> Vec<Player> {
        self.roster_order
            .get(&booking)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.players.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Store keeping all tables in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn list_sports(&self) -> Result<Vec<Sport>, BookingError> {
        let tables = self.tables.read().await;
        let mut sports: Vec<Sport> = tables.sports.values().cloned().collect();
        sports.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sports)
    }

    async fn get_sport(&self, id: SportId) -> Result<Sport, BookingError> {
        let tables = self.tables.read().await;
        tables
            .sports
            .get(&id)
            .cloned()
            .ok_or(BookingError::SportNotFound(*id.as_uuid()))
    }

    async fn insert_sport(&self, sport: NewSport) -> Result<Sport, BookingError> {
        // Same representation as the NUMERIC(8, 2) column.
        let mut price_per_hour = sport.price_per_hour;
        price_per_hour.rescale(PRICE_SCALE);
        let sport = Sport {
            id: SportId::new(),
            name: sport.name.trim().to_string(),
            description: sport.description,
            price_per_hour,
            available_from: sport.available_from,
            available_to: sport.available_to,
            created_at: Utc::now(),
        };
        let mut tables = self.tables.write().await;
        tables.sports.insert(sport.id, sport.clone());
        Ok(sport)
    }

    async fn reserve(&self, booking: NewBooking) -> Result<Booking, BookingError> {
        let mut tables = self.tables.write().await;
        if !tables.sports.contains_key(&booking.sport_id) {
            return Err(BookingError::SportNotFound(*booking.sport_id.as_uuid()));
        }
        let taken = tables
            .bookings
            .values()
            .any(|b| b.conflicts_with(booking.sport_id, booking.date, &booking.window));
        if taken {
            return Err(BookingError::SlotOverlap {
                date: booking.date,
                start: booking.window.start(),
                end: booking.window.end(),
            });
        }

        let created = Booking {
            id: BookingId::new(),
            sport_id: booking.sport_id,
            owner_id: booking.owner_id,
            date: booking.date,
            start_time: booking.window.start(),
            end_time: booking.window.end(),
            total_price: booking.total_price,
            status: BookingStatus::Confirmed,
            created_at: Utc::now(),
        };
        tables.bookings.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_booking(&self, id: BookingId) -> Result<Booking, BookingError> {
        let tables = self.tables.read().await;
        tables
            .bookings
            .get(&id)
            .cloned()
            .ok_or(BookingError::BookingNotFound(*id.as_uuid()))
    }

    async fn list_bookings_by_owner(
        &self,
        owner: UserId,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Booking>, BookingError> {
        let tables = self.tables.read().await;
        let mut bookings: Vec<&Booking> = tables
            .bookings
            .values()
            .filter(|b| b.owner_id == owner)
            .collect();
        bookings.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.start_time.cmp(&a.start_time))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(bookings
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count_bookings_by_owner(&self, owner: UserId) -> Result<u64, BookingError> {
        let tables = self.tables.read().await;
        let count = tables.bookings.values().filter(|b| b.owner_id == owner).count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn insert_player(&self, player: NewPlayer) -> Result<Player, BookingError> {
        let mut tables = self.tables.write().await;
        if !tables.bookings.contains_key(&player.booking_id) {
            return Err(BookingError::BookingNotFound(*player.booking_id.as_uuid()));
        }
        let created = Player {
            id: PlayerId::new(),
            booking_id: player.booking_id,
            user_id: player.user_id,
            name: player.name,
            email: player.email,
            status: CheckInStatus::Out,
            created_at: Utc::now(),
        };
        tables.players.insert(created.id, created.clone());
        tables
            .roster_order
            .entry(created.booking_id)
            .or_default()
            .push(created.id);
        Ok(created)
    }

    async fn get_player(&self, id: PlayerId) -> Result<Player, BookingError> {
        let tables = self.tables.read().await;
        tables
            .players
            .get(&id)
            .cloned()
            .ok_or(BookingError::PlayerNotFound(*id.as_uuid()))
    }

    async fn list_players(&self, booking: BookingId) -> Result<Vec<Player>, BookingError> {
        let tables = self.tables.read().await;
        Ok(tables.players_of(booking))
    }

    async fn list_players_for_bookings(
        &self,
        bookings: &[BookingId],
    ) -> Result<Vec<Player>, BookingError> {
        let tables = self.tables.read().await;
        Ok(bookings
            .iter()
            .flat_map(|booking| tables.players_of(*booking))
            .collect())
    }

    async fn toggle_player(&self, id: PlayerId) -> Result<Player, BookingError> {
        let mut tables = self.tables.write().await;
        let player = tables
            .players
            .get_mut(&id)
            .ok_or(BookingError::PlayerNotFound(*id.as_uuid()))?;
        player.toggle();
        Ok(player.clone())
    }

    async fn roster(&self, booking: BookingId) -> Result<Roster, BookingError> {
        let tables = self.tables.read().await;
        Ok(Roster::from_players(&tables.players_of(booking)))
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, BookingError> {
        let mut tables = self.tables.write().await;
        if tables.usernames.contains_key(&user.username) {
            return Err(BookingError::UsernameTaken(user.username));
        }
        let created = User {
            id: UserId::new(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            must_reset_password: user.must_reset_password,
            created_at: Utc::now(),
        };
        tables.usernames.insert(created.username.clone(), created.id);
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, BookingError> {
        let tables = self.tables.read().await;
        Ok(tables
            .usernames
            .get(username)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, BookingError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn update_password(&self, id: UserId, password_hash: &str) -> Result<(), BookingError> {
        let mut tables = self.tables.write().await;
        if let Some(user) = tables.users.get_mut(&id) {
            user.password_hash = password_hash.to_string();
            user.must_reset_password = false;
        }
        Ok(())
    }

    async fn insert_session(&self, session: Session) -> Result<(), BookingError> {
        let mut tables = self.tables.write().await;
        tables.sessions.insert(session.token, session);
        Ok(())
    }

    async fn find_session(
        &self,
        token: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, BookingError> {
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .get(&token)
            .filter(|s| !s.is_expired(now))
            .cloned())
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, BookingError> {
        let mut tables = self.tables.write().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| !s.is_expired(now));
        let removed = before.saturating_sub(tables.sessions.len());
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }

    async fn delete_session(&self, token: Uuid) -> Result<(), BookingError> {
        let mut tables = self.tables.write().await;
        tables.sessions.remove(&token);
        Ok(())
    }
}
