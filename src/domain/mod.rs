//! Domain layer: catalog, bookings, players, identities.
//!
//! This module contains the server-side domain model: typed identifiers,
//! the half-open slot arithmetic behind reservations, the player check-in
//! state machine, and the stable tokens that QR codes resolve through.

pub mod booking;
pub mod checkin_token;
pub mod identity;
pub mod ids;
pub mod player;
pub mod slot;
pub mod sport;

pub use booking::{Booking, BookingStatus, NewBooking, Roster};
pub use checkin_token::CheckInToken;
pub use identity::{NewUser, Session, User};
pub use ids::{BookingId, PlayerId, SportId, UserId};
pub use player::{CheckInStatus, NewPlayer, Player, PlayerEntry};
pub use slot::TimeWindow;
pub use sport::{NewSport, Sport};
