//! Recurrence rules and their pure date evaluator.
//!
//! # Responsibility
//! - Model the schedule variants a task template can carry.
//! - Decide membership of a calendar date in a template's schedule.
//!
//! # Invariants
//! - Rules are timezone-naive: evaluation sees calendar dates, not instants.
//! - `WeeklyDays` always holds at least one in-range weekday index.
//! - `EveryNDays` always holds a strictly positive interval.
//! - `matches` is pure and total; it never fails at evaluation time.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Construction error for recurrence rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceError {
    /// `WeeklyDays` was given an empty day set.
    EmptyDaySet,
    /// A weekday index outside `0..=6` (0 = Sunday).
    DayIndexOutOfRange(u8),
    /// `EveryNDays` was given a zero-day interval.
    ZeroInterval,
}

impl Display for RecurrenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDaySet => write!(f, "weekly day set must not be empty"),
            Self::DayIndexOutOfRange(index) => {
                write!(f, "weekday index must be in 0..=6, got {index}")
            }
            Self::ZeroInterval => write!(f, "interval must be at least one day"),
        }
    }
}

impl Error for RecurrenceError {}

/// Validated set of weekday indices, 0 = Sunday .. 6 = Saturday.
///
/// Stored as a 7-bit mask. Constructible only through [`WeekdaySet::new`],
/// which rejects empty and out-of-range input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// Builds a set from weekday indices (0 = Sunday .. 6 = Saturday).
    ///
    /// # Errors
    /// - `EmptyDaySet` when `days` is empty.
    /// - `DayIndexOutOfRange` for any index above 6.
    pub fn new(days: &[u8]) -> Result<Self, RecurrenceError> {
        if days.is_empty() {
            return Err(RecurrenceError::EmptyDaySet);
        }

        let mut mask = 0u8;
        for &day in days {
            if day > 6 {
                return Err(RecurrenceError::DayIndexOutOfRange(day));
            }
            mask |= 1 << day;
        }
        Ok(Self(mask))
    }

    /// Returns whether the given weekday is a member of this set.
    pub fn contains(&self, weekday: Weekday) -> bool {
        let index = weekday.num_days_from_sunday() as u8;
        self.0 & (1 << index) != 0
    }

    /// Returns member indices in ascending order.
    pub fn indices(&self) -> Vec<u8> {
        (0u8..=6).filter(|day| self.0 & (1 << day) != 0).collect()
    }
}

impl TryFrom<Vec<u8>> for WeekdaySet {
    type Error = RecurrenceError;

    fn try_from(days: Vec<u8>) -> Result<Self, Self::Error> {
        Self::new(&days)
    }
}

impl From<WeekdaySet> for Vec<u8> {
    fn from(value: WeekdaySet) -> Self {
        value.indices()
    }
}

/// Validated every-N-days cadence anchored at a start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CadenceRepr", into = "CadenceRepr")]
pub struct Cadence {
    start: NaiveDate,
    interval_days: u32,
}

impl Cadence {
    /// Builds a cadence matching `start`, `start + interval`, and so on.
    ///
    /// # Errors
    /// - `ZeroInterval` when `interval_days == 0`.
    pub fn new(start: NaiveDate, interval_days: u32) -> Result<Self, RecurrenceError> {
        if interval_days == 0 {
            return Err(RecurrenceError::ZeroInterval);
        }
        Ok(Self {
            start,
            interval_days,
        })
    }

    /// Anchor date of the cadence.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Interval length in days, always >= 1.
    pub fn interval_days(&self) -> u32 {
        self.interval_days
    }

    fn matches(&self, date: NaiveDate) -> bool {
        if date < self.start {
            return false;
        }
        let elapsed = (date - self.start).num_days();
        elapsed % i64::from(self.interval_days) == 0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct CadenceRepr {
    start: NaiveDate,
    interval_days: u32,
}

impl TryFrom<CadenceRepr> for Cadence {
    type Error = RecurrenceError;

    fn try_from(repr: CadenceRepr) -> Result<Self, Self::Error> {
        Self::new(repr.start, repr.interval_days)
    }
}

impl From<Cadence> for CadenceRepr {
    fn from(value: Cadence) -> Self {
        Self {
            start: value.start,
            interval_days: value.interval_days,
        }
    }
}

/// Schedule rule carried by a task template.
///
/// One variant per recurrence kind; variants carry only the data they need,
/// so malformed rule/field combinations cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "params", rename_all = "snake_case")]
pub enum Recurrence {
    /// Every calendar date.
    Daily,
    /// Monday through Friday.
    Weekday,
    /// Saturday and Sunday.
    Weekend,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
    /// Dates whose weekday index is in the set (0 = Sunday .. 6 = Saturday).
    WeeklyDays(WeekdaySet),
    /// Dates at a fixed day interval from an anchor start date.
    EveryNDays(Cadence),
}

impl Recurrence {
    /// Builds a validated `WeeklyDays` rule from weekday indices.
    pub fn weekly_days(days: &[u8]) -> Result<Self, RecurrenceError> {
        WeekdaySet::new(days).map(Self::WeeklyDays)
    }

    /// Builds a validated `EveryNDays` rule.
    pub fn every_n_days(start: NaiveDate, interval_days: u32) -> Result<Self, RecurrenceError> {
        Cadence::new(start, interval_days).map(Self::EveryNDays)
    }

    /// Returns whether `date` belongs to this schedule.
    ///
    /// Pure and total. Template-creation cutoffs are enforced by the
    /// generation layer, not here.
    pub fn matches(&self, date: NaiveDate) -> bool {
        let weekday = date.weekday();
        match self {
            Self::Daily => true,
            Self::Weekday => !matches!(weekday, Weekday::Sat | Weekday::Sun),
            Self::Weekend => matches!(weekday, Weekday::Sat | Weekday::Sun),
            Self::Monday => weekday == Weekday::Mon,
            Self::Tuesday => weekday == Weekday::Tue,
            Self::Wednesday => weekday == Weekday::Wed,
            Self::Thursday => weekday == Weekday::Thu,
            Self::Friday => weekday == Weekday::Fri,
            Self::Saturday => weekday == Weekday::Sat,
            Self::Sunday => weekday == Weekday::Sun,
            Self::WeeklyDays(days) => days.contains(weekday),
            Self::EveryNDays(cadence) => cadence.matches(date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Recurrence, RecurrenceError, WeekdaySet};
    use chrono::NaiveDate;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn weekday_set_rejects_empty_and_out_of_range_input() {
        assert_eq!(WeekdaySet::new(&[]), Err(RecurrenceError::EmptyDaySet));
        assert_eq!(
            WeekdaySet::new(&[1, 7]),
            Err(RecurrenceError::DayIndexOutOfRange(7))
        );
    }

    #[test]
    fn weekday_set_indices_are_sorted_and_deduplicated() {
        let set = WeekdaySet::new(&[5, 1, 5, 0]).unwrap();
        assert_eq!(set.indices(), vec![0, 1, 5]);
    }

    #[test]
    fn every_n_days_rejects_zero_interval() {
        let err = Recurrence::every_n_days(date(2024, 1, 1), 0).unwrap_err();
        assert_eq!(err, RecurrenceError::ZeroInterval);
    }

    #[test]
    fn serde_roundtrip_preserves_weekly_days_rule() {
        let rule = Recurrence::weekly_days(&[0, 3]).unwrap();
        let json = serde_json::to_string(&rule).unwrap();
        let parsed: Recurrence = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rule);
    }

    #[test]
    fn serde_rejects_invalid_weekly_days_payload() {
        let result: Result<Recurrence, _> =
            serde_json::from_str(r#"{"kind":"weekly_days","params":[9]}"#);
        assert!(result.is_err());
    }
}
