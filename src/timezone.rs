//! Converts between calendar dates and points in time in the server's time zone.

use std::fmt::Debug;

use time::{Date, OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone, Tz};

use crate::Error;

/// A canonical time zone, e.g. "Pacific/Auckland".
#[derive(Clone, Copy)]
pub struct LocalTimezone {
    tz: &'static Tz,
}

impl LocalTimezone {
    /// Look up the time zone with the canonical name `canonical_timezone`.
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezone] if the name is not a known time zone.
    pub fn new(canonical_timezone: &str) -> Result<Self, Error> {
        time_tz::timezones::get_by_name(canonical_timezone)
            .map(|tz| Self { tz })
            .ok_or_else(|| Error::InvalidTimezone(canonical_timezone.to_owned()))
    }

    /// The canonical name of the time zone.
    pub fn name(&self) -> &'static str {
        self.tz.name()
    }

    /// The UTC offset in effect at `instant`.
    pub fn offset_at(&self, instant: OffsetDateTime) -> UtcOffset {
        self.tz.get_offset_utc(&instant).to_utc()
    }

    /// The calendar date at `instant`.
    pub fn date_of(&self, instant: OffsetDateTime) -> Date {
        instant.to_offset(self.offset_at(instant)).date()
    }

    /// Today's date according to the server clock.
    pub fn today(&self) -> Date {
        self.date_of(OffsetDateTime::now_utc())
    }

    /// The first instant of `date`, normally midnight.
    ///
    /// When a DST transition skips midnight, the first instant that falls on
    /// `date` is returned instead.
    pub fn start_of_day(&self, date: Date) -> OffsetDateTime {
        let midnight = date.midnight();
        let first_guess = midnight.assume_offset(self.offset_at(midnight.assume_utc()));
        let second_guess = midnight.assume_offset(self.offset_at(first_guess));

        [second_guess, first_guess]
            .into_iter()
            .find(|instant| self.date_of(*instant) == date)
            .unwrap_or(first_guess)
    }
}

impl Debug for LocalTimezone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("LocalTimezone").field(&self.name()).finish()
    }
}
