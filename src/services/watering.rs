use chrono::{DateTime, Duration, Offset, TimeZone, Utc};
use chrono_tz::Tz;

pub const DEFAULT_WATERING_HOUR: u32 = 19;

/// Anchors reminders to a fixed hour of day in a reference timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WateringSchedule {
    timezone: Tz,
    hour: u32,
}

impl Default for WateringSchedule {
    fn default() -> Self {
        Self::new(chrono_tz::Europe::Amsterdam, DEFAULT_WATERING_HOUR)
    }
}

impl WateringSchedule {
    /// `hour` is taken modulo 24.
    pub fn new(timezone: Tz, hour: u32) -> Self {
        Self {
            timezone,
            hour: hour % 24,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    /// The next reminder instant for a plant watered at `now`.
    ///
    /// Takes the local date of `now`, sets the watering hour, adds
    /// `interval_days`, and bumps one more day if that is not after local
    /// now. The result is converted back with the UTC offset in effect at
    /// `now`, so an interval spanning a DST change lands one hour off.
    ///
    /// `None` if the result falls outside the representable date range.
    pub fn next_watering(&self, now: DateTime<Utc>, interval_days: i64) -> Option<DateTime<Utc>> {
        let local_now = now.with_timezone(&self.timezone);
        let offset_secs = i64::from(local_now.offset().fix().local_minus_utc());
        let local_naive = local_now.naive_local();

        let at_hour = local_naive
            .date()
            .and_hms_opt(self.hour, 0, 0)
            .unwrap_or(local_naive);
        let mut target = at_hour.checked_add_signed(Duration::try_days(interval_days)?)?;

        if target <= local_naive {
            target = target.checked_add_signed(Duration::try_days(1)?)?;
        }

        let utc = target.checked_sub_signed(Duration::try_seconds(offset_secs)?)?;
        Some(Utc.from_utc_datetime(&utc))
    }
}
