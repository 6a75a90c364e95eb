//! Sport catalog reference data.

use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{SportId, TimeWindow};
use crate::error::BookingError;

/// Longest accepted sport name, matching the `sports.name` column.
pub const MAX_SPORT_NAME_LEN: usize = 100;

/// Fraction digits an hourly price may carry, matching `NUMERIC(8, 2)`.
pub const PRICE_SCALE: u32 = 2;

/// Highest hourly price `NUMERIC(8, 2)` can hold.
#[must_use]
pub fn max_price_per_hour() -> Decimal {
    Decimal::new(99_999_999, PRICE_SCALE)
}

/// A bookable sport with its hourly rate and opening hours.
///
/// Reference data: created by an administrator and never mutated by the
/// booking flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Sport {
    /// Unique sport identifier.
    pub id: SportId,
    /// Display name (e.g. `"Badminton"`).
    pub name: String,
    /// Free-form description, may be empty.
    pub description: String,
    /// Hourly price as a decimal string with two fraction digits.
    #[schema(value_type = String, example = "100.00")]
    pub price_per_hour: Decimal,
    /// Opening time.
    #[schema(value_type = String, example = "06:00:00")]
    pub available_from: NaiveTime,
    /// Closing time.
    #[schema(value_type = String, example = "22:00:00")]
    pub available_to: NaiveTime,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Sport {
    /// Returns `true` if `window` falls within the sport's opening hours.
    #[must_use]
    pub fn is_open_during(&self, window: &TimeWindow) -> bool {
        window.fits_within(self.available_from, self.available_to)
    }
}

/// Catalog entry as submitted by an administrator.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewSport {
    /// Display name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: String,
    /// Hourly price.
    #[schema(value_type = String, example = "100.00")]
    pub price_per_hour: Decimal,
    /// Opening time.
    #[schema(value_type = String, example = "06:00:00")]
    pub available_from: NaiveTime,
    /// Closing time.
    #[schema(value_type = String, example = "22:00:00")]
    pub available_to: NaiveTime,
}

impl NewSport {
    /// Checks the entry before it enters the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidRequest`] on an empty or overlong
    /// name, a price that is negative, above [`max_price_per_hour`] or has
    /// more than two fraction digits, or opening hours that do not form a
    /// window.
    pub fn validate(&self) -> Result<(), BookingError> {
        if self.name.trim().is_empty() {
            return Err(BookingError::InvalidRequest(
                "sport name must not be empty".to_string(),
            ));
        }
        if self.name.trim().chars().count() > MAX_SPORT_NAME_LEN {
            return Err(BookingError::InvalidRequest(format!(
                "sport name must be at most {MAX_SPORT_NAME_LEN} characters"
            )));
        }
        if self.price_per_hour.is_sign_negative() {
            return Err(BookingError::InvalidRequest(
                "price_per_hour must not be negative".to_string(),
            ));
        }
        if self.price_per_hour > max_price_per_hour() {
            return Err(BookingError::InvalidRequest(format!(
                "price_per_hour must be at most {}",
                max_price_per_hour()
            )));
        }
        if self.price_per_hour.normalize().scale() > PRICE_SCALE {
            return Err(BookingError::InvalidRequest(
                "price_per_hour must have at most two decimal places".to_string(),
            ));
        }
        TimeWindow::new(self.available_from, self.available_to)?;
        Ok(())
    }
}
