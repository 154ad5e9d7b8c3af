use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Offset, Utc};

/// Source of "now" and of the local wall-clock view used for bucketing
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Convert an instant to local wall-clock time
    fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime;

    fn local_now(&self) -> NaiveDateTime {
        self.to_local(self.now())
    }
}

/// Clock backed by the system time and the machine's time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&Local).naive_local()
    }
}

/// Clock pinned to one instant and one UTC offset
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
    offset: FixedOffset,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { now, offset }
    }

    pub fn utc(now: DateTime<Utc>) -> Self {
        Self::new(now, Utc.fix())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.offset).naive_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_fixed_clock_applies_offset() {
        let now = Utc.with_ymd_and_hms(2024, 6, 12, 23, 30, 0).unwrap();
        let clock = FixedClock::new(now, FixedOffset::east_opt(2 * 3600).unwrap());

        let local = clock.local_now();
        assert_eq!(local.date().to_string(), "2024-06-13");
        assert_eq!(local.hour(), 1);
    }

    #[test]
    fn test_utc_clock_is_identity() {
        let now = Utc.with_ymd_and_hms(2024, 6, 12, 9, 0, 0).unwrap();
        let clock = FixedClock::utc(now);
        assert_eq!(clock.local_now(), now.naive_utc());
    }
}
