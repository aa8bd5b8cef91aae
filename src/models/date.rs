//! Calendar date value type used as the natural key of a meal.

use std::fmt::{Display, Formatter};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{AppError, Result};

/// A validated calendar day.
///
/// Serializes as `{"year": 2024, "month": 5, "day": 1}`. Deserialization
/// rejects days that do not exist in the Gregorian calendar.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "RawDate")]
pub struct Date {
    /// Calendar year.
    pub year: i32,
    /// Month of the year, 1-12.
    pub month: u32,
    /// Day of the month, 1-31.
    pub day: u32,
}

#[derive(Deserialize)]
struct RawDate {
    year: i32,
    month: u32,
    day: u32,
}

impl TryFrom<RawDate> for Date {
    type Error = AppError;

    fn try_from(raw: RawDate) -> Result<Self> {
        Self::new(raw.year, raw.month, raw.day)
    }
}

impl Date {
    /// Build a date, validating that it exists.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` for out-of-range components such as
    /// month 13 or February 30.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self::from)
            .ok_or_else(|| {
                AppError::InvalidInput(format!("{year:04}-{month:02}-{day:02} is not a valid date"))
            })
    }

    /// Convert into a `chrono` date.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` if the fields were mutated into an
    /// impossible combination after construction.
    pub fn to_naive(self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or_else(|| {
            AppError::InvalidInput(format!("{self} is not a valid date"))
        })
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}
