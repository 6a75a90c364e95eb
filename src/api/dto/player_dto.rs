//! Check-in DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{BookingId, CheckInStatus, PlayerId, Roster};

/// Response body for a check-in toggle, manual or scanned.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckInResponse {
    /// Toggled player.
    pub player_id: PlayerId,
    /// Player name, for display at the gate.
    pub name: String,
    /// Booking the player belongs to.
    pub booking_id: BookingId,
    /// Status after the toggle.
    pub status: CheckInStatus,
    /// Booking counts after the toggle.
    pub roster: Roster,
}
