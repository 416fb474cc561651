use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named relative time range used to scope aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeWindow {
    #[serde(rename = "last-7-days")]
    LastSevenDays,
    #[default]
    #[serde(rename = "this-month")]
    ThisMonth,
    #[serde(rename = "last-month")]
    LastMonth,
    #[serde(rename = "all-time")]
    AllTime,
}

/// Concrete `[start, end]` pair produced by resolving a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    /// Membership is decided on the calendar date, both ends inclusive.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.date() <= date && date <= self.end.date()
    }
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 4] = [
        TimeWindow::LastSevenDays,
        TimeWindow::ThisMonth,
        TimeWindow::LastMonth,
        TimeWindow::AllTime,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            TimeWindow::LastSevenDays => "last-7-days",
            TimeWindow::ThisMonth => "this-month",
            TimeWindow::LastMonth => "last-month",
            TimeWindow::AllTime => "all-time",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeWindow::LastSevenDays => "Last 7 days",
            TimeWindow::ThisMonth => "This month",
            TimeWindow::LastMonth => "Last month",
            TimeWindow::AllTime => "All time",
        }
    }

    /// Resolves the window relative to `now`. `None` means unconstrained.
    pub fn resolve(&self, now: NaiveDateTime) -> Option<DateRange> {
        match self {
            TimeWindow::LastSevenDays => Some(DateRange {
                start: now - Duration::days(7),
                end: now,
            }),
            TimeWindow::ThisMonth => Some(DateRange {
                start: first_of_month(now.date()).and_time(NaiveTime::MIN),
                end: now,
            }),
            TimeWindow::LastMonth => {
                let this_month = first_of_month(now.date());
                let last_day = this_month.pred_opt()?;
                let end_of_day = NaiveTime::from_hms_opt(23, 59, 59)?;
                Some(DateRange {
                    start: first_of_month(last_day).and_time(NaiveTime::MIN),
                    end: last_day.and_time(end_of_day),
                })
            }
            TimeWindow::AllTime => None,
        }
    }

    /// Whether an expense dated `date` falls inside the window at `now`.
    /// Undated records only pass the unconstrained window.
    pub fn admits(&self, date: Option<NaiveDate>, now: NaiveDateTime) -> bool {
        match self.resolve(now) {
            None => true,
            Some(range) => date.map_or(false, |d| range.contains(d)),
        }
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown time window '{0}'")]
pub struct UnknownWindow(pub String);

impl FromStr for TimeWindow {
    type Err = UnknownWindow;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeWindow::ALL
            .into_iter()
            .find(|window| window.tag() == s)
            .ok_or_else(|| UnknownWindow(s.to_string()))
    }
}
