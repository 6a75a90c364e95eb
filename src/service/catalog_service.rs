//! Sport catalog service.

use std::sync::Arc;

use crate::domain::{NewSport, Sport, SportId};
use crate::error::BookingError;
use crate::persistence::BookingStore;

/// Read access to the catalog plus administrator inserts.
#[derive(Debug, Clone)]
pub struct CatalogService {
    store: Arc<dyn BookingStore>,
}

impl CatalogService {
    /// Creates a new `CatalogService`.
    #[must_use]
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// All sports, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::PersistenceError`] on storage failure.
    pub async fn list_sports(&self) -> Result<Vec<Sport>, BookingError> {
        self.store.list_sports().await
    }

    /// One sport.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::SportNotFound`] if the id is unknown.
    pub async fn get_sport(&self, id: SportId) -> Result<Sport, BookingError> {
        self.store.get_sport(id).await
    }

    /// Validates and inserts a catalog entry.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidRequest`] for an invalid entry.
    pub async fn create_sport(&self, sport: NewSport) -> Result<Sport, BookingError> {
        sport.validate()?;
        let sport = self.store.insert_sport(sport).await?;
        tracing::info!(sport_id = %sport.id, name = %sport.name, "sport created");
        Ok(sport)
    }
}
