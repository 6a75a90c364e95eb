//! Booking service: slot allocation and roster management.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use utoipa::ToSchema;

use super::IdentityService;
use crate::domain::{
    Booking, BookingId, NewBooking, NewPlayer, Player, PlayerEntry, Roster, SportId, TimeWindow,
    UserId,
};
use crate::error::BookingError;
use crate::persistence::BookingStore;

/// A booking together with its players and their counts.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingOverview {
    /// The booking.
    pub booking: Booking,
    /// Players in insertion order.
    pub players: Vec<Player>,
    /// Counts derived from `players`.
    pub roster: Roster,
}

/// A player added to a booking, with the login created for them.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AddedPlayer {
    /// The stored player.
    pub player: Player,
    /// Provisioned username.
    pub username: String,
    /// One-time password, shown exactly once.
    pub temporary_password: String,
}

/// Coordinates reservations and the players attached to them.
///
/// Every write goes through the [`BookingStore`]; the overlap check for a
/// reservation happens inside the store, atomically with the insert.
#[derive(Debug, Clone)]
pub struct BookingService {
    store: Arc<dyn BookingStore>,
    identities: IdentityService,
}

impl BookingService {
    /// Creates a new `BookingService`.
    #[must_use]
    pub fn new(store: Arc<dyn BookingStore>, identities: IdentityService) -> Self {
        Self { store, identities }
    }

    /// Reserves `sport_id` on `date` between `start` and `end`.
    ///
    /// The window must be non-empty and lie within the sport's opening
    /// hours. The price is fixed here from the sport's hourly rate.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidRequest`] for an empty window or one
    /// outside opening hours, [`BookingError::SportNotFound`] for an unknown
    /// sport, and [`BookingError::SlotOverlap`] if a confirmed booking
    /// already holds part of the window.
    pub async fn reserve(
        &self,
        sport_id: SportId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        requester: UserId,
    ) -> Result<Booking, BookingError> {
        let window = TimeWindow::new(start, end)?;
        let sport = self.store.get_sport(sport_id).await?;

        if !sport.is_open_during(&window) {
            return Err(BookingError::InvalidRequest(format!(
                "{} can only be booked between {} and {}",
                sport.name, sport.available_from, sport.available_to
            )));
        }

        let new_booking = NewBooking {
            sport_id,
            owner_id: requester,
            date,
            window,
            total_price: window.price_at(sport.price_per_hour)?,
        };

        match self.store.reserve(new_booking).await {
            Ok(booking) => {
                tracing::info!(
                    booking_id = %booking.id,
                    %sport_id,
                    %date,
                    start = %booking.start_time,
                    end = %booking.end_time,
                    price = %booking.total_price,
                    "booking confirmed"
                );
                Ok(booking)
            }
            Err(e @ BookingError::SlotOverlap { .. }) => {
                tracing::warn!(%sport_id, %date, %start, %end, "slot already taken");
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Returns one of `requester`'s bookings with its players.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::BookingNotFound`] if the booking does not
    /// exist or belongs to someone else.
    pub async fn get(
        &self,
        booking_id: BookingId,
        requester: UserId,
    ) -> Result<BookingOverview, BookingError> {
        let booking = self.owned_booking(booking_id, requester).await?;
        self.overview(booking).await
    }

    /// One page of `owner`'s bookings, newest date first, each with its
    /// roster, together with the owner's total booking count.
    ///
    /// Players for the whole page are loaded in a single store call.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::PersistenceError`] on storage failure.
    pub async fn list_for_owner(
        &self,
        owner: UserId,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<BookingOverview>, u64), BookingError> {
        let total = self.store.count_bookings_by_owner(owner).await?;
        let bookings = self.store.list_bookings_by_owner(owner, limit, offset).await?;

        let ids: Vec<BookingId> = bookings.iter().map(|b| b.id).collect();
        let mut players_by_booking: HashMap<BookingId, Vec<Player>> = HashMap::new();
        for player in self.store.list_players_for_bookings(&ids).await? {
            players_by_booking
                .entry(player.booking_id)
                .or_default()
                .push(player);
        }

        let overviews = bookings
            .into_iter()
            .map(|booking| {
                let players = players_by_booking.remove(&booking.id).unwrap_or_default();
                let roster = Roster::from_players(&players);
                BookingOverview {
                    booking,
                    players,
                    roster,
                }
            })
            .collect();
        Ok((overviews, total))
    }

    /// Current player counts for a booking. An unknown booking has none.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::PersistenceError`] on storage failure.
    pub async fn roster(&self, booking_id: BookingId) -> Result<Roster, BookingError> {
        self.store.roster(booking_id).await
    }

    /// Attaches players to a booking owned by `requester`.
    ///
    /// Entries with a blank name or email are skipped. Every accepted name
    /// is length-checked before anything is written; then each entry gets
    /// a provisioned login before its player row is written.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::BookingNotFound`] if the booking does not
    /// exist or belongs to someone else, [`BookingError::InvalidRequest`] if
    /// a name is too long, [`BookingError::IdentityConflict`] if no username
    /// can be found for a player. Players added before the failing entry
    /// stay attached.
    pub async fn add_players(
        &self,
        booking_id: BookingId,
        requester: UserId,
        entries: &[PlayerEntry],
    ) -> Result<Vec<AddedPlayer>, BookingError> {
        let booking = self.owned_booking(booking_id, requester).await?;

        let accepted: Vec<PlayerEntry> = entries.iter().filter_map(PlayerEntry::accepted).collect();
        for entry in &accepted {
            entry.check_length()?;
        }

        let mut added = Vec::new();
        for entry in accepted {
            let identity = self.identities.provision(&entry.name, &entry.email).await?;
            let player = self
                .store
                .insert_player(NewPlayer {
                    booking_id: booking.id,
                    user_id: Some(identity.user.id),
                    name: entry.name,
                    email: entry.email,
                })
                .await?;
            added.push(AddedPlayer {
                player,
                username: identity.user.username,
                temporary_password: identity.temporary_password,
            });
        }

        tracing::info!(
            %booking_id,
            added = added.len(),
            skipped = entries.len().saturating_sub(added.len()),
            "players added"
        );
        Ok(added)
    }

    async fn owned_booking(
        &self,
        booking_id: BookingId,
        requester: UserId,
    ) -> Result<Booking, BookingError> {
        let booking = self.store.get_booking(booking_id).await?;
        if booking.owner_id != requester {
            return Err(BookingError::BookingNotFound(booking_id.into()));
        }
        Ok(booking)
    }

    async fn overview(&self, booking: Booking) -> Result<BookingOverview, BookingError> {
        let players = self.store.list_players(booking.id).await?;
        let roster = Roster::from_players(&players);
        Ok(BookingOverview {
            booking,
            players,
            roster,
        })
    }
}
