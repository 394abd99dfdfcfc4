//! Operating hours, parsed once from the catalog's hour strings.
//!
//! Accepted forms:
//! - `24/7` for centers that never close
//! - empty or `CLOSED` for centers that are not operating
//! - `MON:9:00AM-5:00PM;TUE-FRI:10:00-18:00,19:00-21:00;SUN:CLOSED`
//!
//! Days that are not listed are closed. Interval bounds are inclusive. An
//! interval whose close precedes its open (`10:00PM-2:00AM`) runs past
//! midnight into the next day; one whose close equals its open covers the
//! whole day.

use crate::utils::error::{FinderError, Result};
use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const DAY_CODES: [&str; 7] = ["MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl TimeInterval {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Self {
        Self { open, close }
    }

    pub fn crosses_midnight(&self) -> bool {
        self.close < self.open
    }

    pub fn is_whole_day(&self) -> bool {
        self.open == self.close
    }

    /// Whether `t` falls in the part of the interval on its own day.
    fn covers_same_day(&self, t: NaiveTime) -> bool {
        if self.is_whole_day() {
            true
        } else if self.crosses_midnight() {
            t >= self.open
        } else {
            self.open <= t && t <= self.close
        }
    }

    /// Whether `t` falls in the part that spilled over from the previous day.
    fn covers_next_day(&self, t: NaiveTime) -> bool {
        self.crosses_midnight() && t <= self.close
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.open.format("%-I:%M%p"),
            self.close.format("%-I:%M%p")
        )
    }
}

/// Open intervals per weekday, indexed from Monday.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklySchedule {
    days: [Vec<TimeInterval>; 7],
}

impl WeeklySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, day: Weekday, interval: TimeInterval) -> &mut Self {
        self.days[day.num_days_from_monday() as usize].push(interval);
        self
    }

    pub fn intervals(&self, day: Weekday) -> &[TimeInterval] {
        &self.days[day.num_days_from_monday() as usize]
    }

    fn clear(&mut self, day: Weekday) {
        self.days[day.num_days_from_monday() as usize].clear();
    }

    pub fn is_open_at(&self, at: NaiveDateTime) -> bool {
        // minute resolution, matching how hours are written
        let t = at.time();
        let t = NaiveTime::from_hms_opt(t.hour(), t.minute(), 0).unwrap_or(t);
        let today = at.weekday();

        self.intervals(today)
            .iter()
            .any(|interval| interval.covers_same_day(t))
            || self
                .intervals(today.pred())
                .iter()
                .any(|interval| interval.covers_next_day(t))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hours {
    AlwaysOpen,
    Closed,
    Weekly(WeeklySchedule),
}

impl Hours {
    pub fn is_open_at(&self, at: NaiveDateTime) -> bool {
        match self {
            Hours::AlwaysOpen => true,
            Hours::Closed => false,
            Hours::Weekly(schedule) => schedule.is_open_at(at),
        }
    }

    /// One display line per day with at least one interval, Monday first.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Hours::AlwaysOpen => vec!["Open 24/7".to_string()],
            Hours::Closed => vec!["Closed".to_string()],
            Hours::Weekly(schedule) => {
                let lines: Vec<String> = DAY_CODES
                    .iter()
                    .zip(schedule.days.iter())
                    .filter(|(_, intervals)| !intervals.is_empty())
                    .map(|(code, intervals)| {
                        let joined = intervals
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join(", ");
                        format!("{}: {}", code, joined)
                    })
                    .collect();
                if lines.is_empty() {
                    vec!["Closed".to_string()]
                } else {
                    lines
                }
            }
        }
    }
}

impl fmt::Display for Hours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hours::AlwaysOpen => f.write_str("24/7"),
            Hours::Closed => f.write_str("Closed"),
            Hours::Weekly(_) => f.write_str(&self.lines().join("; ")),
        }
    }
}

impl Serialize for Hours {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for Hours {
    type Err = FinderError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_matches(|c| c == '"' || c == '\'').trim();

        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("closed") {
            return Ok(Hours::Closed);
        }
        if is_around_the_clock(trimmed) {
            return Ok(Hours::AlwaysOpen);
        }

        let mut schedule = WeeklySchedule::new();
        for entry in trimmed.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (day_part, times) = entry.split_once(':').ok_or_else(|| {
                FinderError::invalid_argument(format!("hours entry '{}' has no day prefix", entry))
            })?;
            let days = parse_days(day_part)?;
            let times = times.trim();

            if times.eq_ignore_ascii_case("closed") {
                for day in &days {
                    schedule.clear(*day);
                }
                continue;
            }

            let intervals = if is_around_the_clock(times) {
                vec![TimeInterval::new(NaiveTime::MIN, NaiveTime::MIN)]
            } else {
                times
                    .split(',')
                    .map(parse_interval)
                    .collect::<Result<Vec<_>>>()?
            };

            for day in &days {
                for interval in &intervals {
                    schedule.add(*day, *interval);
                }
            }
        }

        Ok(Hours::Weekly(schedule))
    }
}

fn is_around_the_clock(s: &str) -> bool {
    let lowered = s.to_ascii_lowercase();
    matches!(lowered.as_str(), "24/7" | "24 hours" | "open 24 hours")
}

fn parse_day(s: &str) -> Result<Weekday> {
    s.trim()
        .parse::<Weekday>()
        .map_err(|_| FinderError::invalid_argument(format!("unknown day '{}'", s.trim())))
}

/// `MON` or an inclusive range such as `MON-FRI` (ranges may wrap, `FRI-MON`).
fn parse_days(s: &str) -> Result<Vec<Weekday>> {
    match s.split_once('-') {
        None => Ok(vec![parse_day(s)?]),
        Some((from, to)) => {
            let (from, to) = (parse_day(from)?, parse_day(to)?);
            let mut days = vec![from];
            let mut day = from;
            while day != to {
                day = day.succ();
                days.push(day);
            }
            Ok(days)
        }
    }
}

fn parse_interval(s: &str) -> Result<TimeInterval> {
    let (open, close) = s.trim().split_once('-').ok_or_else(|| {
        FinderError::invalid_argument(format!("interval '{}' is not OPEN-CLOSE", s.trim()))
    })?;
    Ok(TimeInterval::new(parse_time(open)?, parse_time(close)?))
}

/// `9:00AM`, `9:00 pm` or 24-hour `21:00`.
fn parse_time(s: &str) -> Result<NaiveTime> {
    let compact: String = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();

    NaiveTime::parse_from_str(&compact, "%I:%M%p")
        .or_else(|_| NaiveTime::parse_from_str(&compact, "%H:%M"))
        .map_err(|_| FinderError::invalid_argument(format!("unrecognised time '{}'", s.trim())))
}
