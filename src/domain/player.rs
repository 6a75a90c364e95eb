//! Players attached to a booking and their check-in state machine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{BookingId, PlayerId, UserId};
use crate::error::BookingError;

/// Attendance state of a player.
///
/// Two states, one transition in each direction, no terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckInStatus {
    /// Checked in at the facility.
    In,
    /// Not checked in. Initial state.
    #[default]
    Out,
}

impl CheckInStatus {
    /// The state reached by a single toggle.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::In => Self::Out,
            Self::Out => Self::In,
        }
    }

    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

impl fmt::Display for CheckInStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckInStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            other => Err(BookingError::Internal(format!(
                "unknown check-in status: {other}"
            ))),
        }
    }
}

/// A participant registered on a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Player {
    /// Unique player identifier.
    pub id: PlayerId,
    /// Owning booking.
    pub booking_id: BookingId,
    /// Login identity provisioned for the player, if any.
    pub user_id: Option<UserId>,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Current attendance state.
    pub status: CheckInStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Player {
    /// Applies one toggle in place.
    pub fn toggle(&mut self) {
        self.status = self.status.toggled();
    }
}

/// Longest player name the `players.name` column holds, in characters.
pub const MAX_PLAYER_NAME_LEN: usize = 100;

/// One line of a roster submission.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PlayerEntry {
    /// Player name; blank entries are skipped.
    #[serde(default)]
    pub name: String,
    /// Player email; blank entries are skipped.
    #[serde(default)]
    pub email: String,
}

impl PlayerEntry {
    /// Returns the trimmed entry, or `None` if name or email is blank.
    #[must_use]
    pub fn accepted(&self) -> Option<Self> {
        let name = self.name.trim();
        let email = self.email.trim();
        if name.is_empty() || email.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            email: email.to_string(),
        })
    }

    /// Checks that the name fits [`MAX_PLAYER_NAME_LEN`].
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidRequest`] for an overlong name.
    pub fn check_length(&self) -> Result<(), BookingError> {
        if self.name.chars().count() > MAX_PLAYER_NAME_LEN {
            return Err(BookingError::InvalidRequest(format!(
                "player name must be at most {MAX_PLAYER_NAME_LEN} characters"
            )));
        }
        Ok(())
    }
}

/// A player row ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlayer {
    /// Owning booking.
    pub booking_id: BookingId,
    /// Provisioned identity.
    pub user_id: Option<UserId>,
    /// Trimmed name.
    pub name: String,
    /// Trimmed email.
    pub email: String,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn entry(name: &str, email: &str) -> PlayerEntry {
        PlayerEntry {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn default_status_is_out() {
        assert_eq!(CheckInStatus::default(), CheckInStatus::Out);
    }

    #[test]
    fn double_toggle_restores_status() {
        for status in [CheckInStatus::In, CheckInStatus::Out] {
            assert_ne!(status.toggled(), status);
            assert_eq!(status.toggled().toggled(), status);
        }
    }

    #[test]
    fn storage_text_round_trips() {
        assert!(matches!("in".parse::<CheckInStatus>(), Ok(CheckInStatus::In)));
        assert!(matches!("out".parse::<CheckInStatus>(), Ok(CheckInStatus::Out)));
        assert!("In".parse::<CheckInStatus>().is_err());
    }

    #[test]
    fn blank_entries_are_not_accepted() {
        assert!(entry("", "a@b.com").accepted().is_none());
        assert!(entry("X", "   ").accepted().is_none());
        assert!(entry("  ", "").accepted().is_none());
    }

    #[test]
    fn name_length_is_bounded() {
        let Some(longest) = entry(&"p".repeat(MAX_PLAYER_NAME_LEN), "p@example.com").accepted()
        else {
            panic!("entry should be accepted");
        };
        assert!(longest.check_length().is_ok());

        let Some(overlong) =
            entry(&"p".repeat(MAX_PLAYER_NAME_LEN + 1), "p@example.com").accepted()
        else {
            panic!("entry should be accepted");
        };
        assert!(matches!(overlong.check_length(), Err(BookingError::InvalidRequest(_))));
    }

    #[test]
    fn accepted_entry_is_trimmed() {
        let Some(e) = entry("  Sam ", " sam@example.com\n").accepted() else {
            panic!("entry should be accepted");
        };
        assert_eq!(e.name, "Sam");
        assert_eq!(e.email, "sam@example.com");
    }
}
