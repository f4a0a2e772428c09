//! Day-granularity dates.
//!
//! All schedule arithmetic works on [`DayNumber`], a count of days since 1970-01-01.
//! Timestamps never enter due-date math, so time zones cannot shift an occurrence.

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// Integer count of days since 1970-01-01.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DayNumber(i64);

impl DayNumber {
    /// Wraps a raw day count.
    #[must_use]
    pub const fn new(days: i64) -> Self {
        Self(days)
    }

    /// Raw day count, as persisted.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Day number of a calendar date.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self(i64::from(date.num_days_from_ce()) - EPOCH_DAYS_FROM_CE)
    }

    /// Calendar date of this day number, `None` outside chrono's range.
    #[must_use]
    pub fn to_date(self) -> Option<NaiveDate> {
        let days = i32::try_from(self.0.checked_add(EPOCH_DAYS_FROM_CE)?).ok()?;
        NaiveDate::from_num_days_from_ce_opt(days)
    }

    /// `self + days`, `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, days: i64) -> Option<Self> {
        match self.0.checked_add(days) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Days from `earlier` to `self`, `None` on overflow.
    #[must_use]
    pub const fn checked_days_since(self, earlier: Self) -> Option<i64> {
        self.0.checked_sub(earlier.0)
    }

    /// Today according to the local calendar.
    #[must_use]
    pub fn today_local() -> Self {
        Self::from_date(Local::now().date_naive())
    }
}

impl Add<i64> for DayNumber {
    type Output = Self;

    fn add(self, days: i64) -> Self {
        Self(self.0.saturating_add(days))
    }
}

impl Sub for DayNumber {
    type Output = i64;

    fn sub(self, other: Self) -> i64 {
        self.0.saturating_sub(other.0)
    }
}

impl From<NaiveDate> for DayNumber {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

impl fmt::Display for DayNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_date() {
            Some(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            None => write!(f, "day {}", self.0),
        }
    }
}
