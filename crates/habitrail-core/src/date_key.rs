//! Calendar keys shared by habits, tasks and the journal.
//!
//! A [`DateKey`] is the canonical `YYYY-MM-DD` identifier of a local calendar
//! day. A habit's completion history is a [`CompletionSet`] of such keys.
//! [`TimeOfDay`] is the `HH:MM` wall-clock value used by reminders and tasks.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Local, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// A local calendar day, rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Parse a strict, zero-padded `YYYY-MM-DD` key.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidDateKey`] for anything else.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        // chrono accepts unpadded fields; the key format does not.
        let bytes = s.as_bytes();
        let shape_ok = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
        if !shape_ok {
            return Err(ValidationError::InvalidDateKey(s.to_string()));
        }
        NaiveDate::parse_from_str(s, DATE_KEY_FORMAT)
            .map(Self)
            .map_err(|_| ValidationError::InvalidDateKey(s.to_string()))
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Today's key in the local timezone.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The previous calendar day. Saturates at the minimum representable date.
    pub fn pred(&self) -> Self {
        Self(self.0.pred_opt().unwrap_or(self.0))
    }

    /// The next calendar day. Saturates at the maximum representable date.
    pub fn succ(&self) -> Self {
        Self(self.0.succ_opt().unwrap_or(self.0))
    }

    /// `n` calendar days earlier. Saturates at the minimum representable date.
    pub fn days_back(&self, n: u64) -> Self {
        Self(self.0.checked_sub_days(Days::new(n)).unwrap_or(NaiveDate::MIN))
    }

    /// Weekday number, 0 = Sunday ... 6 = Saturday.
    pub fn weekday_from_sunday(&self) -> u8 {
        self.0.weekday().num_days_from_sunday() as u8
    }

    /// Whole days from `self` to `later` (negative if `later` is earlier).
    pub fn days_until(&self, later: DateKey) -> i64 {
        (later.0 - self.0).num_days()
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_KEY_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateKey::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Set of completed days for a habit.
///
/// Set semantics: inserting an existing key is a no-op and iteration order
/// is chronological regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionSet(BTreeSet<DateKey>);

impl CompletionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from raw strings. Malformed keys are dropped and count as
    /// "not completed".
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for key in keys {
            match DateKey::parse(key.as_ref()) {
                Ok(k) => {
                    set.insert(k);
                }
                Err(_) => {
                    tracing::debug!(key = key.as_ref(), "ignoring malformed completion key");
                }
            }
        }
        Self(set)
    }

    pub fn contains(&self, key: &DateKey) -> bool {
        self.0.contains(key)
    }

    /// Returns `true` if the key was newly inserted.
    pub fn insert(&mut self, key: DateKey) -> bool {
        self.0.insert(key)
    }

    /// Returns `true` if the key was present.
    pub fn remove(&mut self, key: &DateKey) -> bool {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Chronological iteration.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &DateKey> {
        self.0.iter()
    }

    /// Most recent completed day.
    pub fn latest(&self) -> Option<DateKey> {
        self.0.last().copied()
    }

    /// Number of completed days in the inclusive range `[from, to]`.
    pub fn count_between(&self, from: DateKey, to: DateKey) -> usize {
        if from > to {
            return 0;
        }
        self.0.range(from..=to).count()
    }
}

impl FromIterator<DateKey> for CompletionSet {
    fn from_iter<T: IntoIterator<Item = DateKey>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a CompletionSet {
    type Item = &'a DateKey;
    type IntoIter = std::collections::btree_set::Iter<'a, DateKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Wall-clock time of day at minute resolution, rendered as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// # Errors
    /// Returns [`ValidationError::InvalidTime`] if the fields are out of range.
    pub fn new(hour: u8, minute: u8) -> Result<Self, ValidationError> {
        if hour > 23 || minute > 59 {
            return Err(ValidationError::InvalidTime(format!("{hour}:{minute}")));
        }
        Ok(Self { hour, minute })
    }

    /// Parse `HH:MM` (24-hour, zero-padded).
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidTime`] for anything else.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidTime(s.to_string());
        let (h, m) = s.split_once(':').ok_or_else(invalid)?;
        let digits = |f: &str| f.len() == 2 && f.bytes().all(|b| b.is_ascii_digit());
        if !digits(h) || !digits(m) {
            return Err(invalid());
        }
        let hour = h.parse::<u8>().map_err(|_| invalid())?;
        let minute = m.parse::<u8>().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }

    /// Truncate a wall-clock time to its minute.
    pub fn from_time(time: NaiveTime) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TimeOfDay::parse(&raw).map_err(serde::de::Error::custom)
    }
}
