//! # courtside
//!
//! REST API for a sports facility: a catalog of bookable sports, slot
//! reservations that never overlap, player rosters with provisioned
//! logins, and QR badges that toggle a player's check-in when scanned.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, QR scanners)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── BookingService, CheckInService,
//!     │   IdentityService, CatalogService (service/)
//!     │
//!     ├── TimeWindow, CheckInStatus, CheckInToken (domain/)
//!     │
//!     └── BookingStore (persistence/)
//!             ├── PostgresStore
//!             └── MemoryStore
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
