//! Recurrence rule parsing.
//!
//! Rules are ASCII `KEY=VALUE` pairs separated by `;`, using the keys
//! `FREQ` (required), `INTERVAL`, `BYDAY`, and `BYMONTHDAY`:
//!
//! ```text
//! FREQ=DAILY;INTERVAL=2
//! FREQ=WEEKLY;BYDAY=MO,WE,FR
//! FREQ=MONTHLY;BYMONTHDAY=1,15
//! ```
//!
//! Unknown keys are ignored; duplicate keys are last-wins. Parsing is
//! strict about the values it does understand: a missing or unrecognized
//! `FREQ`, a bad weekday code, an out-of-range month day, or a zero or
//! non-numeric interval all fail with [`RuleError`].

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::Weekday;
use thiserror::Error;

/// Errors produced when parsing a recurrence rule string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    /// The rule has no `FREQ=` component.
    #[error("recurrence rule has no FREQ component")]
    MissingFrequency,
    /// The `FREQ=` value is not DAILY, WEEKLY, or MONTHLY.
    #[error("unrecognized frequency: {0}")]
    UnknownFrequency(String),
    /// The `INTERVAL=` value is not a positive integer.
    #[error("invalid interval: {0}")]
    InvalidInterval(String),
    /// A `BYDAY=` entry is not a two-letter weekday code.
    #[error("invalid weekday code: {0}")]
    InvalidWeekday(String),
    /// A `BYMONTHDAY=` entry is not a day number in 1..=31.
    #[error("invalid month day: {0}")]
    InvalidMonthDay(String),
    /// A component is not a `KEY=VALUE` pair.
    #[error("malformed rule component: {0}")]
    MalformedComponent(String),
}

/// How often a template repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    /// Every `interval` days.
    Daily,
    /// On the weekdays named by `BYDAY`.
    Weekly,
    /// On the month days named by `BYMONTHDAY`.
    Monthly,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "DAILY"),
            Self::Weekly => write!(f, "WEEKLY"),
            Self::Monthly => write!(f, "MONTHLY"),
        }
    }
}

/// A parsed, typed recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    /// Base repeat frequency.
    pub frequency: Frequency,
    /// Repeat interval in units of `frequency`; always >= 1.
    pub interval: u32,
    /// Weekdays the rule fires on (`FREQ=WEEKLY`).
    pub weekdays: BTreeSet<WeekdayCode>,
    /// Days of the month the rule fires on (`FREQ=MONTHLY`).
    pub month_days: BTreeSet<u8>,
}

/// An ordered wrapper around [`chrono::Weekday`] so weekday sets have a
/// stable MO..SU iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekdayCode(pub Weekday);

impl WeekdayCode {
    /// The two-letter code for this weekday (`MO`, `TU`, ...).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self.0 {
            Weekday::Mon => "MO",
            Weekday::Tue => "TU",
            Weekday::Wed => "WE",
            Weekday::Thu => "TH",
            Weekday::Fri => "FR",
            Weekday::Sat => "SA",
            Weekday::Sun => "SU",
        }
    }
}

impl PartialOrd for WeekdayCode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WeekdayCode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0
            .num_days_from_monday()
            .cmp(&other.0.num_days_from_monday())
    }
}

impl FromStr for WeekdayCode {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let day = match s {
            "MO" => Weekday::Mon,
            "TU" => Weekday::Tue,
            "WE" => Weekday::Wed,
            "TH" => Weekday::Thu,
            "FR" => Weekday::Fri,
            "SA" => Weekday::Sat,
            "SU" => Weekday::Sun,
            other => return Err(RuleError::InvalidWeekday(other.to_string())),
        };
        Ok(Self(day))
    }
}

impl RecurrenceRule {
    /// Whether the rule fires on the given weekday.
    #[must_use]
    pub fn fires_on_weekday(&self, day: Weekday) -> bool {
        self.weekdays.contains(&WeekdayCode(day))
    }

    /// Whether the rule fires on the given day of the month (1..=31).
    #[must_use]
    pub fn fires_on_month_day(&self, day: u8) -> bool {
        self.month_days.contains(&day)
    }
}

impl FromStr for RecurrenceRule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut frequency = None;
        let mut interval: u32 = 1;
        let mut weekdays = BTreeSet::new();
        let mut month_days = BTreeSet::new();

        for component in s.split(';') {
            let component = component.trim();
            if component.is_empty() {
                continue;
            }
            let Some((key, value)) = component.split_once('=') else {
                return Err(RuleError::MalformedComponent(component.to_string()));
            };
            match key {
                "FREQ" => {
                    frequency = Some(match value {
                        "DAILY" => Frequency::Daily,
                        "WEEKLY" => Frequency::Weekly,
                        "MONTHLY" => Frequency::Monthly,
                        other => return Err(RuleError::UnknownFrequency(other.to_string())),
                    });
                }
                "INTERVAL" => {
                    interval = value
                        .parse::<u32>()
                        .ok()
                        .filter(|n| *n >= 1)
                        .ok_or_else(|| RuleError::InvalidInterval(value.to_string()))?;
                }
                "BYDAY" => {
                    weekdays = value
                        .split(',')
                        .map(str::parse)
                        .collect::<Result<BTreeSet<_>, _>>()?;
                }
                "BYMONTHDAY" => {
                    month_days = value
                        .split(',')
                        .map(|d| {
                            d.parse::<u8>()
                                .ok()
                                .filter(|n| (1..=31).contains(n))
                                .ok_or_else(|| RuleError::InvalidMonthDay(d.to_string()))
                        })
                        .collect::<Result<BTreeSet<_>, _>>()?;
                }
                // Unknown keys (DTSTART, UNTIL, ...) are tolerated.
                _ => {}
            }
        }

        let frequency = frequency.ok_or(RuleError::MissingFrequency)?;
        Ok(Self {
            frequency,
            interval,
            weekdays,
            month_days,
        })
    }
}

impl std::fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FREQ={}", self.frequency)?;
        if self.interval != 1 {
            write!(f, ";INTERVAL={}", self.interval)?;
        }
        if !self.weekdays.is_empty() {
            let days: Vec<&str> = self.weekdays.iter().map(|d| d.code()).collect();
            write!(f, ";BYDAY={}", days.join(","))?;
        }
        if !self.month_days.is_empty() {
            let days: Vec<String> = self.month_days.iter().map(ToString::to_string).collect();
            write!(f, ";BYMONTHDAY={}", days.join(","))?;
        }
        Ok(())
    }
}
