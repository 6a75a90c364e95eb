//! Bookings, their status, and roster aggregation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{BookingId, CheckInStatus, Player, SportId, TimeWindow, UserId};
use crate::error::BookingError;

/// Lifecycle status of a booking.
///
/// Reservations are created as [`BookingStatus::Confirmed`] directly;
/// `Pending` and `Cancelled` exist in the schema but nothing transitions
/// into them yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Held but not confirmed.
    Pending,
    /// Confirmed; occupies its slot.
    Confirmed,
    /// Cancelled; frees its slot.
    Cancelled,
}

impl BookingStatus {
    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Only confirmed bookings block other reservations.
    #[must_use]
    pub const fn holds_slot(self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(BookingError::Internal(format!(
                "unknown booking status: {other}"
            ))),
        }
    }
}

/// A reservation of one sport for one window on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Booking {
    /// Unique booking identifier.
    pub id: BookingId,
    /// Reserved sport.
    pub sport_id: SportId,
    /// User who made the reservation.
    pub owner_id: UserId,
    /// Calendar date of the reservation.
    pub date: NaiveDate,
    /// Inclusive start time.
    #[schema(value_type = String, example = "10:00:00")]
    pub start_time: NaiveTime,
    /// Exclusive end time.
    #[schema(value_type = String, example = "11:30:00")]
    pub end_time: NaiveTime,
    /// Price fixed at creation.
    #[schema(value_type = String, example = "150.00")]
    pub total_price: Decimal,
    /// Lifecycle status.
    pub status: BookingStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// The booked window.
    #[must_use]
    pub const fn window(&self) -> TimeWindow {
        TimeWindow::from_stored(self.start_time, self.end_time)
    }

    /// Returns `true` if this booking blocks `window` for `sport_id` on
    /// `date`.
    #[must_use]
    pub fn conflicts_with(&self, sport_id: SportId, date: NaiveDate, window: &TimeWindow) -> bool {
        self.status.holds_slot()
            && self.sport_id == sport_id
            && self.date == date
            && self.window().overlaps(window)
    }
}

/// A validated reservation ready to be inserted.
///
/// Built by the slot allocator once the sport, window, and price are known;
/// the store performs the final overlap check atomically with the insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    /// Reserved sport.
    pub sport_id: SportId,
    /// Requesting user.
    pub owner_id: UserId,
    /// Reservation date.
    pub date: NaiveDate,
    /// Requested window.
    pub window: TimeWindow,
    /// Price computed from the window.
    pub total_price: Decimal,
}

/// Player counts for a booking, derived on demand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Roster {
    /// Number of players attached to the booking.
    pub total_players: u64,
    /// Number of those players currently checked in.
    pub checked_in: u64,
}

impl Roster {
    /// Counts `players` as they are right now.
    #[must_use]
    pub fn from_players(players: &[Player]) -> Self {
        let checked_in = players
            .iter()
            .filter(|p| p.status == CheckInStatus::In)
            .count();
        Self {
            total_players: players.len() as u64,
            checked_in: checked_in as u64,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::PlayerId;

    fn t(h: u32, m: u32) -> NaiveTime {
        let Some(time) = NaiveTime::from_hms_opt(h, m, 0) else {
            panic!("valid time");
        };
        time
    }

    fn day() -> NaiveDate {
        let Some(d) = NaiveDate::from_ymd_opt(2024, 1, 1) else {
            panic!("valid date");
        };
        d
    }

    fn booking(sport_id: SportId, status: BookingStatus) -> Booking {
        Booking {
            id: BookingId::new(),
            sport_id,
            owner_id: UserId::new(),
            date: day(),
            start_time: t(10, 0),
            end_time: t(11, 0),
            total_price: Decimal::new(10000, 2),
            status,
            created_at: Utc::now(),
        }
    }

    fn player(status: CheckInStatus) -> Player {
        Player {
            id: PlayerId::new(),
            booking_id: BookingId::new(),
            user_id: None,
            name: "X".to_string(),
            email: "x@example.com".to_string(),
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn status_round_trips_through_storage_text() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
        ] {
            let Ok(parsed) = status.as_str().parse::<BookingStatus>() else {
                panic!("parse failed");
            };
            assert_eq!(parsed, status);
        }
        assert!("archived".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn only_confirmed_bookings_conflict() {
        let sport = SportId::new();
        let Ok(window) = TimeWindow::new(t(10, 30), t(11, 30)) else {
            panic!("valid window");
        };
        assert!(booking(sport, BookingStatus::Confirmed).conflicts_with(sport, day(), &window));
        assert!(!booking(sport, BookingStatus::Pending).conflicts_with(sport, day(), &window));
        assert!(!booking(sport, BookingStatus::Cancelled).conflicts_with(sport, day(), &window));
    }

    #[test]
    fn other_sport_or_date_never_conflicts() {
        let sport = SportId::new();
        let Ok(window) = TimeWindow::new(t(10, 0), t(11, 0)) else {
            panic!("valid window");
        };
        let b = booking(sport, BookingStatus::Confirmed);
        assert!(!b.conflicts_with(SportId::new(), day(), &window));
        let Some(next_day) = day().succ_opt() else {
            panic!("valid date");
        };
        assert!(!b.conflicts_with(sport, next_day, &window));
    }

    #[test]
    fn roster_counts_checked_in_players() {
        let players = vec![
            player(CheckInStatus::In),
            player(CheckInStatus::Out),
            player(CheckInStatus::In),
        ];
        let roster = Roster::from_players(&players);
        assert_eq!(roster.total_players, 3);
        assert_eq!(roster.checked_in, 2);
        assert_eq!(Roster::from_players(&[]), Roster::default());
    }
}
