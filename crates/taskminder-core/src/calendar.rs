//! Local-calendar arithmetic.
//!
//! Every function here is pure and generic over [`chrono::TimeZone`], so the
//! same code runs against `chrono::Local` in the host and a `FixedOffset` in
//! tests. "Day" always means the local calendar day of the given instant.

use crate::error::{ReminderError, Result};
use chrono::{
    DateTime, Datelike, Days, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
    Weekday,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// WeekdayCode
// ---------------------------------------------------------------------------

/// Locale-independent weekday abbreviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeekdayCode {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl WeekdayCode {
    pub fn as_str(self) -> &'static str {
        match self {
            WeekdayCode::Mon => "Mon",
            WeekdayCode::Tue => "Tue",
            WeekdayCode::Wed => "Wed",
            WeekdayCode::Thu => "Thu",
            WeekdayCode::Fri => "Fri",
            WeekdayCode::Sat => "Sat",
            WeekdayCode::Sun => "Sun",
        }
    }
}

impl From<Weekday> for WeekdayCode {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => WeekdayCode::Mon,
            Weekday::Tue => WeekdayCode::Tue,
            Weekday::Wed => WeekdayCode::Wed,
            Weekday::Thu => WeekdayCode::Thu,
            Weekday::Fri => WeekdayCode::Fri,
            Weekday::Sat => WeekdayCode::Sat,
            Weekday::Sun => WeekdayCode::Sun,
        }
    }
}

impl fmt::Display for WeekdayCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ReminderTime
// ---------------------------------------------------------------------------

/// A validated local wall-clock time of day (`HH:MM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderTime {
    hour: u8,
    minute: u8,
}

impl ReminderTime {
    pub const DEFAULT: ReminderTime = ReminderTime {
        hour: 7,
        minute: 55,
    };

    pub fn new(hour: u8, minute: u8) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(ReminderError::InvalidTime(format!(
                "{hour:02}:{minute:02} is outside 00:00..23:59"
            )));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    fn naive(self) -> NaiveTime {
        // Range checked in `new`.
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
            .unwrap_or(NaiveTime::MIN)
    }
}

impl Default for ReminderTime {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for ReminderTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl std::str::FromStr for ReminderTime {
    type Err = ReminderError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (h, m) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| ReminderError::InvalidTime(format!("expected HH:MM, got '{s}'")))?;
        let hour = h
            .parse::<u8>()
            .map_err(|_| ReminderError::InvalidTime(format!("bad hour in '{s}'")))?;
        let minute = m
            .parse::<u8>()
            .map_err(|_| ReminderError::InvalidTime(format!("bad minute in '{s}'")))?;
        ReminderTime::new(hour, minute)
    }
}

// ---------------------------------------------------------------------------
// Day arithmetic
// ---------------------------------------------------------------------------

/// Floor `instant` to 00:00:00.000 of its local day.
pub fn day_start<Tz: TimeZone>(instant: &DateTime<Tz>) -> DateTime<Tz> {
    local_midnight(&instant.timezone(), instant.date_naive())
}

/// Last millisecond of the day that begins at `day_start`.
pub fn day_end<Tz: TimeZone>(day_start: &DateTime<Tz>) -> DateTime<Tz> {
    day_start.clone() + Duration::hours(24) - Duration::milliseconds(1)
}

/// Weekday of `instant` on the local calendar.
pub fn weekday_code<Tz: TimeZone>(instant: &DateTime<Tz>) -> WeekdayCode {
    instant.weekday().into()
}

/// First local midnight of `date` in `tz`.
pub fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    resolve_local(tz, date.and_time(NaiveTime::MIN))
}

/// The next instant strictly after `now` whose local wall-clock reads `at`.
///
/// If `at` today is at or before `now`, tomorrow's occurrence is returned.
pub fn next_fire_at<Tz: TimeZone>(now: &DateTime<Tz>, at: ReminderTime) -> Result<DateTime<Tz>> {
    let tz = now.timezone();
    let today = now.date_naive();
    let candidate = resolve_local(&tz, today.and_time(at.naive()));
    if candidate > *now {
        return Ok(candidate);
    }
    let tomorrow = today
        .checked_add_days(Days::new(1))
        .ok_or_else(|| ReminderError::InvalidTime(format!("no calendar day after {today}")))?;
    Ok(resolve_local(&tz, tomorrow.and_time(at.naive())))
}

/// Map a local wall-clock reading to an instant.
///
/// Ambiguous readings (DST fall-back) take the earliest instant. Readings
/// inside a DST gap move forward to the first representable quarter hour.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    let mut candidate = naive;
    for _ in 0..96 {
        if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
            return dt;
        }
        candidate += Duration::minutes(15);
    }
    tz.from_utc_datetime(&naive)
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of "now".
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike};
    use chrono_tz::America::{New_York, Sao_Paulo};

    fn plus_two() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<FixedOffset> {
        plus_two().with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn day_start_floors_to_local_midnight() {
        let start = day_start(&at(2024, 1, 11, 15, 42));
        assert_eq!(start, at(2024, 1, 11, 0, 0));
    }

    #[test]
    fn day_start_uses_local_not_utc_date() {
        // 00:30 local is still the previous day in UTC.
        let instant = at(2024, 1, 11, 0, 30);
        assert_eq!(instant.with_timezone(&Utc).day(), 10);
        assert_eq!(day_start(&instant).day(), 11);
    }

    #[test]
    fn day_end_is_last_millisecond() {
        let end = day_end(&at(2024, 1, 11, 0, 0));
        assert_eq!(end.day(), 11);
        assert_eq!(end.hour(), 23);
        assert_eq!(end.minute(), 59);
        assert_eq!(end.second(), 59);
        assert_eq!(end.timestamp_subsec_millis(), 999);
    }

    #[test]
    fn weekday_code_is_local() {
        // 2024-01-09 is a Tuesday.
        assert_eq!(weekday_code(&at(2024, 1, 9, 0, 30)), WeekdayCode::Tue);
        let late_utc_monday = Utc.with_ymd_and_hms(2024, 1, 8, 23, 0, 0).unwrap();
        assert_eq!(
            weekday_code(&late_utc_monday.with_timezone(&plus_two())),
            WeekdayCode::Tue
        );
    }

    #[test]
    fn next_fire_later_today() {
        let now = at(2024, 1, 11, 6, 0);
        let fire = next_fire_at(&now, ReminderTime::DEFAULT).unwrap();
        assert_eq!(fire, at(2024, 1, 11, 7, 55));
    }

    #[test]
    fn next_fire_rolls_to_tomorrow_when_passed() {
        let now = at(2024, 1, 11, 8, 0);
        let fire = next_fire_at(&now, ReminderTime::new(7, 55).unwrap()).unwrap();
        assert_eq!(fire, at(2024, 1, 12, 7, 55));
    }

    #[test]
    fn next_fire_is_strictly_future() {
        let now = at(2024, 1, 11, 7, 55);
        let fire = next_fire_at(&now, ReminderTime::DEFAULT).unwrap();
        assert_eq!(fire, at(2024, 1, 12, 7, 55));
    }

    #[test]
    fn next_fire_crosses_month_end() {
        let now = at(2024, 1, 31, 23, 0);
        let fire = next_fire_at(&now, ReminderTime::new(0, 5).unwrap()).unwrap();
        assert_eq!(fire, at(2024, 2, 1, 0, 5));
    }

    #[test]
    fn reminder_time_parse_and_display() {
        let t: ReminderTime = "07:05".parse().unwrap();
        assert_eq!((t.hour(), t.minute()), (7, 5));
        assert_eq!(t.to_string(), "07:05");
        assert!("24:00".parse::<ReminderTime>().is_err());
        assert!("12:60".parse::<ReminderTime>().is_err());
        assert!("noon".parse::<ReminderTime>().is_err());
    }

    #[test]
    fn weekday_codes_decode_exactly() {
        let days: Vec<WeekdayCode> = serde_yaml::from_str("[Mon, Sun]").unwrap();
        assert_eq!(days, vec![WeekdayCode::Mon, WeekdayCode::Sun]);
        assert!(serde_yaml::from_str::<WeekdayCode>("mon").is_err());
        assert_eq!(WeekdayCode::Thu.to_string(), "Thu");
    }

    // ---------------------------------------------------------------------
    // Zones with daylight saving
    // ---------------------------------------------------------------------

    #[test]
    fn next_fire_in_spring_gap_moves_to_first_valid_instant() {
        // 2024-03-10: New York clocks jump from 02:00 EST to 03:00 EDT.
        let now = New_York.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        let fire = next_fire_at(&now, ReminderTime::new(2, 30).unwrap()).unwrap();
        assert_eq!(fire, New_York.with_ymd_and_hms(2024, 3, 10, 3, 0, 0).unwrap());
        assert_eq!(
            fire.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2024, 3, 10, 7, 0, 0).unwrap()
        );
    }

    #[test]
    fn next_fire_in_fall_overlap_takes_earliest() {
        // 2024-11-03: 01:00..02:00 happens twice in New York.
        let now = New_York.with_ymd_and_hms(2024, 11, 3, 0, 0, 0).unwrap();
        let fire = next_fire_at(&now, ReminderTime::new(1, 30).unwrap()).unwrap();
        // 01:30 EDT, not 01:30 EST an hour later.
        assert_eq!(
            fire.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2024, 11, 3, 5, 30, 0).unwrap()
        );
    }

    #[test]
    fn next_fire_after_first_overlap_pass_rolls_to_tomorrow() {
        // Past the earliest 01:30, so the next occurrence is the following day.
        let now = Utc
            .with_ymd_and_hms(2024, 11, 3, 6, 0, 0)
            .unwrap()
            .with_timezone(&New_York);
        let fire = next_fire_at(&now, ReminderTime::new(1, 30).unwrap()).unwrap();
        assert_eq!(fire, New_York.with_ymd_and_hms(2024, 11, 4, 1, 30, 0).unwrap());
    }

    #[test]
    fn day_start_when_midnight_is_skipped() {
        // 2018-11-04: Sao Paulo moved from 00:00 -03 straight to 01:00 -02.
        let noon = Sao_Paulo.with_ymd_and_hms(2018, 11, 4, 12, 0, 0).unwrap();
        let start = day_start(&noon);
        assert_eq!(start, Sao_Paulo.with_ymd_and_hms(2018, 11, 4, 1, 0, 0).unwrap());
        assert_eq!(start.date_naive(), noon.date_naive());
    }

    #[test]
    fn day_bounds_on_short_and_long_days() {
        let spring = New_York.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(day_start(&spring).hour(), 0);
        assert_eq!(weekday_code(&spring), WeekdayCode::Sun);

        let fall = New_York.with_ymd_and_hms(2024, 11, 3, 12, 0, 0).unwrap();
        let start = day_start(&fall);
        assert_eq!(
            start.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2024, 11, 3, 4, 0, 0).unwrap()
        );
        assert_eq!(
            day_end(&start) - start,
            Duration::hours(24) - Duration::milliseconds(1)
        );
    }

    #[test]
    fn fixed_clock_moves_only_when_set() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = FixedClock::new(t0);
        assert_eq!(clock.now(), t0);
        let t1 = t0 + Duration::hours(3);
        clock.set(t1);
        assert_eq!(clock.now(), t1);
    }
}
