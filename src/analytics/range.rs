//! Calendar periods on local wall-clock time.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ParseError;

/// Named date range selected in a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    Week,
    #[default]
    Month,
    Quarter,
    Year,
    Custom,
}

impl FromStr for DateRange {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" => Ok(DateRange::Week),
            "month" => Ok(DateRange::Month),
            "quarter" => Ok(DateRange::Quarter),
            "year" => Ok(DateRange::Year),
            "custom" => Ok(DateRange::Custom),
            _ => Err(ParseError::DateRange(s.to_string())),
        }
    }
}

/// First day of the calendar week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    fn days_into_week(&self, day: Weekday) -> i64 {
        match self {
            WeekStart::Sunday => day.num_days_from_sunday() as i64,
            WeekStart::Monday => day.num_days_from_monday() as i64,
        }
    }
}

impl FromStr for WeekStart {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sunday" | "sun" => Ok(WeekStart::Sunday),
            "monday" | "mon" => Ok(WeekStart::Monday),
            _ => Err(ParseError::WeekStart(s.to_string())),
        }
    }
}

/// Inclusive span of local wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Period {
    /// Period covering `[start, next_start)`
    fn until(start: NaiveDate, next_start: NaiveDate) -> Self {
        Self {
            start: start_of_day(start),
            end: start_of_day(next_start) - Duration::nanoseconds(1),
        }
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        instant >= self.start && instant <= self.end
    }

    /// Calendar week containing `date`
    pub fn week(date: NaiveDate, week_start: WeekStart) -> Self {
        let start = start_of_week(date, week_start);
        Self::until(start, start + Duration::weeks(1))
    }

    /// Calendar month containing `date`
    pub fn month(date: NaiveDate) -> Self {
        Self::until(shift_months(date, 0), shift_months(date, 1))
    }

    /// Calendar quarter containing `date`
    pub fn quarter(date: NaiveDate) -> Self {
        let into_quarter = (date.month0() % 3) as i32;
        Self::until(
            shift_months(date, -into_quarter),
            shift_months(date, 3 - into_quarter),
        )
    }

    /// Calendar year containing `date`
    pub fn year(date: NaiveDate) -> Self {
        let into_year = date.month0() as i32;
        Self::until(shift_months(date, -into_year), shift_months(date, 12 - into_year))
    }
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

pub fn start_of_week(date: NaiveDate, week_start: WeekStart) -> NaiveDate {
    date - Duration::days(week_start.days_into_week(date.weekday()))
}

/// First day of the month `months` away from the month containing `date`
pub fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 + months;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

/// Resolve a named range against the local "now".
///
/// Custom ranges fall back to the start of the current month and to now for
/// missing bounds. An inverted custom range is returned as-is and simply
/// matches nothing.
pub fn resolve(
    range: DateRange,
    start_date: Option<NaiveDateTime>,
    end_date: Option<NaiveDateTime>,
    now: NaiveDateTime,
    week_start: WeekStart,
) -> Period {
    let today = now.date();
    match range {
        DateRange::Week => Period::week(today, week_start),
        DateRange::Month => Period::month(today),
        DateRange::Quarter => Period::quarter(today),
        DateRange::Year => Period::year(today),
        DateRange::Custom => Period {
            start: start_date.unwrap_or_else(|| start_of_day(shift_months(today, 0))),
            end: end_date.unwrap_or(now),
        },
    }
}
