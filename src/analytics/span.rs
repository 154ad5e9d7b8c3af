use chrono::NaiveDateTime;

use super::clock::Clock;
use super::earnings::{entry_earnings, entry_seconds, percent, saturating_add, SECONDS_PER_HOUR};
use crate::models::TimeEntry;

/// A time entry with its local start time, sanitized duration and earnings
/// resolved once, so every aggregation pass reads the same numbers.
#[derive(Debug, Clone, Copy)]
pub struct WorkSpan<'a> {
    pub entry: &'a TimeEntry,
    pub local_start: NaiveDateTime,
    pub seconds: f64,
    pub earnings: f64,
}

impl<'a> WorkSpan<'a> {
    pub fn new(entry: &'a TimeEntry, default_rate: Option<f64>, clock: &impl Clock) -> Self {
        Self {
            entry,
            local_start: clock.to_local(entry.start_time),
            seconds: entry_seconds(entry),
            earnings: entry_earnings(entry, default_rate),
        }
    }

    pub fn billable_seconds(&self) -> f64 {
        if self.entry.is_billable {
            self.seconds
        } else {
            0.0
        }
    }
}

/// Running totals for one bucket
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tally {
    pub seconds: f64,
    pub billable_seconds: f64,
    pub earnings: f64,
    pub sessions: usize,
}

impl Tally {
    pub fn add(&mut self, span: &WorkSpan<'_>) {
        self.seconds = saturating_add(self.seconds, span.seconds);
        self.billable_seconds = saturating_add(self.billable_seconds, span.billable_seconds());
        self.earnings = saturating_add(self.earnings, span.earnings);
        self.sessions += 1;
    }

    pub fn of<'s, 'a: 's>(spans: impl IntoIterator<Item = &'s WorkSpan<'a>>) -> Self {
        let mut tally = Self::default();
        for span in spans {
            tally.add(span);
        }
        tally
    }

    pub fn total_hours(&self) -> f64 {
        self.seconds / SECONDS_PER_HOUR
    }

    pub fn billable_hours(&self) -> f64 {
        self.billable_seconds / SECONDS_PER_HOUR
    }

    /// Billable share of tracked time, in percent
    pub fn productivity_score(&self) -> f64 {
        percent(self.billable_seconds, self.seconds)
    }
}
