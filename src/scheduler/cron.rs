use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::fmt;
use std::str::FromStr;

/// How far ahead `next_after` searches before giving up (covers Feb 29).
const MAX_SEARCH_DAYS: u32 = 366 * 8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CronError {
    #[error("expected 5 fields (minute hour day-of-month month day-of-week), found {0}")]
    FieldCount(usize),

    #[error("invalid {field} field '{value}'")]
    InvalidField { field: &'static str, value: String },

    #[error("{field} value {value} is outside {min}-{max}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

/// Set of allowed values for one field, as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FieldSet {
    bits: u64,
    restricted: bool,
}

impl FieldSet {
    fn contains(&self, value: u32) -> bool {
        value < 64 && self.bits & (1 << value) != 0
    }

    fn parse(spec: &str, field: &'static str, min: u32, max: u32) -> Result<Self, CronError> {
        let invalid = || CronError::InvalidField {
            field,
            value: spec.to_string(),
        };
        let number = |s: &str| -> Result<u32, CronError> {
            let value: u32 = s.parse().map_err(|_| invalid())?;
            if value < min || value > max {
                return Err(CronError::OutOfRange { field, value, min, max });
            }
            Ok(value)
        };

        let mut bits = 0u64;
        for part in spec.split(',') {
            let (range, step) = match part.split_once('/') {
                Some((range, step)) => {
                    let step: u32 = step.parse().map_err(|_| invalid())?;
                    if step == 0 {
                        return Err(invalid());
                    }
                    (range, step)
                }
                None => (part, 1),
            };

            let (start, end) = if range == "*" {
                (min, max)
            } else if let Some((lo, hi)) = range.split_once('-') {
                (number(lo)?, number(hi)?)
            } else {
                let value = number(range)?;
                // `5/15` means from 5 to the end of the range.
                if part.contains('/') { (value, max) } else { (value, value) }
            };

            if start > end {
                return Err(invalid());
            }
            for value in (start..=end).step_by(step as usize) {
                bits |= 1 << value;
            }
        }

        Ok(Self {
            bits,
            restricted: !spec.starts_with('*'),
        })
    }
}

/// A standard five-field cron expression evaluated against local wall-clock
/// time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    source: String,
    minutes: FieldSet,
    hours: FieldSet,
    days_of_month: FieldSet,
    months: FieldSet,
    days_of_week: FieldSet,
}

impl CronSchedule {
    pub fn parse(expression: &str) -> Result<Self, CronError> {
        let fields: Vec<&str> = expression.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(CronError::FieldCount(fields.len()));
        }

        let mut days_of_week = FieldSet::parse(fields[4], "day-of-week", 0, 7)?;
        // 7 is an alias for Sunday.
        if days_of_week.contains(7) {
            days_of_week.bits |= 1;
        }

        Ok(Self {
            source: fields.join(" "),
            minutes: FieldSet::parse(fields[0], "minute", 0, 59)?,
            hours: FieldSet::parse(fields[1], "hour", 0, 23)?,
            days_of_month: FieldSet::parse(fields[2], "day-of-month", 1, 31)?,
            months: FieldSet::parse(fields[3], "month", 1, 12)?,
            days_of_week,
        })
    }

    pub fn matches(&self, at: NaiveDateTime) -> bool {
        self.matches_day(at.date())
            && self.hours.contains(at.hour())
            && self.minutes.contains(at.minute())
    }

    /// First matching minute strictly after `after`.
    pub fn next_after(&self, after: NaiveDateTime) -> Option<NaiveDateTime> {
        let start = after
            .with_second(0)?
            .with_nanosecond(0)?
            .checked_add_signed(Duration::minutes(1))?;

        let mut day = start.date();
        for _ in 0..MAX_SEARCH_DAYS {
            if self.matches_day(day) {
                let from = if day == start.date() { start.time() } else { NaiveTime::MIN };
                if let Some(time) = self.first_time_from(from) {
                    return Some(day.and_time(time));
                }
            }
            day = day.succ_opt()?;
        }
        None
    }

    fn matches_day(&self, day: NaiveDate) -> bool {
        if !self.months.contains(day.month()) {
            return false;
        }

        let dom = self.days_of_month.contains(day.day());
        let dow = self.days_of_week.contains(day.weekday().num_days_from_sunday());

        // Classic cron: when both day fields are restricted either may match.
        match (self.days_of_month.restricted, self.days_of_week.restricted) {
            (true, true) => dom || dow,
            (true, false) => dom,
            (false, true) => dow,
            (false, false) => true,
        }
    }

    fn first_time_from(&self, from: NaiveTime) -> Option<NaiveTime> {
        for hour in from.hour()..24 {
            if !self.hours.contains(hour) {
                continue;
            }
            let first_minute = if hour == from.hour() { from.minute() } else { 0 };
            for minute in first_minute..60 {
                if self.minutes.contains(minute) {
                    return NaiveTime::from_hms_opt(hour, minute, 0);
                }
            }
        }
        None
    }
}

impl FromStr for CronSchedule {
    type Err = CronError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CronSchedule::parse(s)
    }
}

impl fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
