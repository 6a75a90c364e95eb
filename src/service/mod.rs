//! Service layer: business logic orchestration.
//!
//! Each service holds an `Arc<dyn BookingStore>` and coordinates domain
//! rules with storage. [`BookingService`] owns reservations and rosters,
//! [`CheckInService`] the player state machine and badges,
//! [`IdentityService`] logins, [`CatalogService`] the sport list.

pub mod booking_service;
pub mod catalog_service;
pub mod checkin_service;
pub mod credentials;
pub mod identity_service;
pub mod qr_encoder;

pub use booking_service::{AddedPlayer, BookingOverview, BookingService};
pub use catalog_service::CatalogService;
pub use checkin_service::{CheckInService, PlayerCard};
pub use identity_service::{IdentityService, LoginOutcome, ProvisionedIdentity};
pub use qr_encoder::QrImage;
