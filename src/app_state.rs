//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::api::auth::AdminKeys;
use crate::config::{AppConfig, SiteConfig};
use crate::persistence::BookingStore;
use crate::service::{BookingService, CatalogService, CheckInService, IdentityService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Sport catalog.
    pub catalog: Arc<CatalogService>,
    /// Reservations and rosters.
    pub bookings: Arc<BookingService>,
    /// Check-in toggles and badges.
    pub checkins: Arc<CheckInService>,
    /// Accounts and sessions.
    pub identities: Arc<IdentityService>,
    /// Keys accepted for admin endpoints.
    pub admin_keys: AdminKeys,
    /// Static site branding.
    pub site: Arc<SiteConfig>,
}

impl AppState {
    /// Wires every service onto one store.
    #[must_use]
    pub fn new(store: Arc<dyn BookingStore>, config: &AppConfig) -> Self {
        let identities = IdentityService::new(
            Arc::clone(&store),
            config.identity_max_suffix_attempts,
            config.session_ttl_hours,
        );
        Self {
            catalog: Arc::new(CatalogService::new(Arc::clone(&store))),
            bookings: Arc::new(BookingService::new(Arc::clone(&store), identities.clone())),
            checkins: Arc::new(CheckInService::new(
                Arc::clone(&store),
                config.public_base_url.clone(),
            )),
            identities: Arc::new(identities),
            admin_keys: AdminKeys::new(config.admin_api_keys.iter().cloned()),
            site: Arc::new(config.site.clone()),
        }
    }
}
