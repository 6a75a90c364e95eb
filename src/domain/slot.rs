//! Half-open booking windows and their pricing.

use chrono::NaiveTime;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::error::BookingError;

const SECONDS_PER_HOUR: i64 = 3600;

/// A validated `[start, end)` window on a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeWindow {
    /// Builds a window, rejecting empty or inverted ranges.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidRequest`] unless `start < end`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, BookingError> {
        if start >= end {
            return Err(BookingError::InvalidRequest(format!(
                "start time {start} must be before end time {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Rebuilds a window from stored bounds that were validated on insert.
    pub(crate) const fn from_stored(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Inclusive start of the window.
    #[must_use]
    pub const fn start(&self) -> NaiveTime {
        self.start
    }

    /// Exclusive end of the window.
    #[must_use]
    pub const fn end(&self) -> NaiveTime {
        self.end
    }

    /// Standard half-open intersection: touching endpoints do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns `true` if this window lies entirely inside `[open, close]`.
    #[must_use]
    pub fn fits_within(&self, open: NaiveTime, close: NaiveTime) -> bool {
        self.start >= open && self.end <= close
    }

    /// Length of the window in whole seconds.
    #[must_use]
    pub fn duration_seconds(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }

    /// Price of the window at `price_per_hour`, rounded to cents.
    ///
    /// Multiplies before dividing: 20 minutes at 100.00 is 33.33.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidRequest`] if the price does not fit a
    /// [`Decimal`].
    pub fn price_at(&self, price_per_hour: Decimal) -> Result<Decimal, BookingError> {
        let seconds = Decimal::from(self.duration_seconds());
        let mut price = price_per_hour
            .checked_mul(seconds)
            .and_then(|amount| amount.checked_div(Decimal::from(SECONDS_PER_HOUR)))
            .ok_or_else(|| {
                BookingError::InvalidRequest(format!(
                    "price for {} to {} at {price_per_hour} per hour is out of range",
                    self.start, self.end
                ))
            })?
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        price.rescale(2);
        Ok(price)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn t(h: u32, m: u32) -> NaiveTime {
        let Some(time) = NaiveTime::from_hms_opt(h, m, 0) else {
            panic!("valid time");
        };
        time
    }

    fn window(a: (u32, u32), b: (u32, u32)) -> TimeWindow {
        let Ok(w) = TimeWindow::new(t(a.0, a.1), t(b.0, b.1)) else {
            panic!("valid window");
        };
        w
    }

    fn dec(s: &str) -> Decimal {
        let Ok(d) = Decimal::from_str(s) else {
            panic!("valid decimal");
        };
        d
    }

    #[test]
    fn rejects_inverted_and_empty_windows() {
        assert!(TimeWindow::new(t(11, 0), t(10, 0)).is_err());
        assert!(TimeWindow::new(t(10, 0), t(10, 0)).is_err());
    }

    #[test]
    fn contained_window_overlaps() {
        let booked = window((10, 0), (12, 0));
        let inner = window((10, 30), (11, 0));
        assert!(booked.overlaps(&inner));
        assert!(inner.overlaps(&booked));
    }

    #[test]
    fn partial_overlap_detected_both_sides() {
        let booked = window((10, 0), (12, 0));
        assert!(booked.overlaps(&window((9, 0), (10, 1))));
        assert!(booked.overlaps(&window((11, 59), (13, 0))));
    }

    #[test]
    fn adjacent_windows_do_not_overlap() {
        let booked = window((10, 0), (11, 0));
        assert!(!booked.overlaps(&window((11, 0), (12, 0))));
        assert!(!booked.overlaps(&window((9, 0), (10, 0))));
    }

    #[test]
    fn ninety_minutes_at_one_hundred_is_exactly_150() {
        let Ok(price) = window((10, 0), (11, 30)).price_at(dec("100.00")) else {
            panic!("price in range");
        };
        assert_eq!(price, dec("150.00"));
        assert_eq!(price.to_string(), "150.00");
    }

    #[test]
    fn twenty_minutes_rounds_to_cents() {
        let Ok(price) = window((10, 0), (10, 20)).price_at(dec("100.00")) else {
            panic!("price in range");
        };
        assert_eq!(price, dec("33.33"));
    }

    #[test]
    fn overflowing_price_is_an_error() {
        let result = window((10, 0), (11, 0)).price_at(Decimal::MAX);
        assert!(matches!(result, Err(BookingError::InvalidRequest(_))));
    }

    #[test]
    fn fits_within_is_inclusive_of_opening_hours() {
        let w = window((6, 0), (22, 0));
        assert!(w.fits_within(t(6, 0), t(22, 0)));
        assert!(!w.fits_within(t(7, 0), t(22, 0)));
    }
}
