//! Booking and roster DTOs.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::PaginationMeta;
use crate::domain::{BookingId, PlayerEntry, Roster};
use crate::service::{AddedPlayer, BookingOverview};

/// Request body for `POST /sports/:id/bookings`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReserveRequest {
    /// Calendar date (ISO-8601).
    pub date: NaiveDate,
    /// Inclusive start, `HH:MM[:SS]`.
    #[schema(value_type = String, example = "10:00")]
    #[serde(deserialize_with = "time_of_day::deserialize")]
    pub start_time: NaiveTime,
    /// Exclusive end, `HH:MM[:SS]`.
    #[schema(value_type = String, example = "11:30")]
    #[serde(deserialize_with = "time_of_day::deserialize")]
    pub end_time: NaiveTime,
}

/// Response body for `GET /bookings`.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingListResponse {
    /// Bookings on this page, newest date first.
    pub data: Vec<BookingOverview>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Request body for `POST /bookings/:id/players`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddPlayersRequest {
    /// Submitted rows; rows with a blank name or email are skipped.
    pub players: Vec<PlayerEntry>,
}

/// Response body for `POST /bookings/:id/players`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AddPlayersResponse {
    /// Booking the players were added to.
    pub booking_id: BookingId,
    /// Added players with their one-time credentials.
    pub added: Vec<AddedPlayer>,
    /// Number of submitted rows that were skipped.
    pub skipped: usize,
    /// Counts after the additions.
    pub roster: Roster,
}

/// Accepts `HH:MM` as well as `HH:MM:SS`, the two forms time inputs send.
mod time_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer};

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M"))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn reserve_request_accepts_short_and_long_times() {
        let json = r#"{"date":"2024-06-01","start_time":"10:00","end_time":"11:30:00"}"#;
        let Ok(req) = serde_json::from_str::<ReserveRequest>(json) else {
            panic!("should parse");
        };
        assert_eq!(req.start_time, NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default());
        assert_eq!(req.end_time, NaiveTime::from_hms_opt(11, 30, 0).unwrap_or_default());
    }

    #[test]
    fn reserve_request_rejects_garbage_time() {
        let json = r#"{"date":"2024-06-01","start_time":"ten","end_time":"11:00"}"#;
        assert!(serde_json::from_str::<ReserveRequest>(json).is_err());
    }

    #[test]
    fn missing_player_fields_default_to_blank() {
        let json = r#"{"players":[{"name":"A"},{"email":"b@example.com"}]}"#;
        let Ok(req) = serde_json::from_str::<AddPlayersRequest>(json) else {
            panic!("should parse");
        };
        assert_eq!(req.players.len(), 2);
        assert!(req.players.iter().all(|p| p.accepted().is_none()));
    }
}
