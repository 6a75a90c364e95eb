//! Data Transfer Objects for REST request/response serialization.
//!
//! Money is serialized as decimal strings and times of day as `HH:MM:SS`.

pub mod auth_dto;
pub mod booking_dto;
pub mod common_dto;
pub mod player_dto;

pub use auth_dto::*;
pub use booking_dto::*;
pub use common_dto::*;
pub use player_dto::*;
