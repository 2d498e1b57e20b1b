//! Per-habit reminder configuration.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::date_key::TimeOfDay;
use crate::error::ValidationError;

/// Set of weekdays, 0 = Sunday ... 6 = Saturday.
///
/// Serialized as a sorted array of day numbers. An empty set is treated as
/// "every day" by [`Reminder::fires_on`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: WeekdaySet = WeekdaySet(0);
    pub const EVERY_DAY: WeekdaySet = WeekdaySet(0b0111_1111);
    /// Monday through Friday.
    pub const WEEKDAYS: WeekdaySet = WeekdaySet(0b0011_1110);

    /// # Errors
    /// Returns [`ValidationError::InvalidWeekday`] for any day above 6.
    pub fn from_days(days: &[u8]) -> Result<Self, ValidationError> {
        let mut bits = 0u8;
        for &day in days {
            if day > 6 {
                return Err(ValidationError::InvalidWeekday(day));
            }
            bits |= 1 << day;
        }
        Ok(Self(bits))
    }

    /// Parse a comma-separated list such as `"1,2,3"`.
    ///
    /// # Errors
    /// Returns a validation error for non-numeric or out-of-range entries.
    pub fn parse_list(s: &str) -> Result<Self, ValidationError> {
        let mut days = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let day = part.parse::<u8>().map_err(|_| ValidationError::InvalidValue {
                field: "days".to_string(),
                message: format!("'{part}' is not a weekday number"),
            })?;
            days.push(day);
        }
        Self::from_days(&days)
    }

    pub fn contains(&self, day: u8) -> bool {
        day <= 6 && self.0 & (1 << day) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn days(&self) -> Vec<u8> {
        (0..=6).filter(|d| self.contains(*d)).collect()
    }
}

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days: Vec<String> = self.days().iter().map(u8::to_string).collect();
        write!(f, "{}", days.join(","))
    }
}

impl Serialize for WeekdaySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.days().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WeekdaySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let days = Vec::<u8>::deserialize(deserializer)?;
        WeekdaySet::from_days(&days).map_err(serde::de::Error::custom)
    }
}

/// Reminder descriptor: a time of day and the weekdays it applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub enabled: bool,
    pub time: TimeOfDay,
    #[serde(default)]
    pub days: WeekdaySet,
}

impl Reminder {
    pub fn new(time: TimeOfDay, days: WeekdaySet) -> Self {
        Self {
            enabled: true,
            time,
            days,
        }
    }

    /// Whether the reminder applies on `weekday` (0 = Sunday).
    pub fn fires_on(&self, weekday: u8) -> bool {
        self.days.is_empty() || self.days.contains(weekday)
    }

    /// Whether an enabled reminder is due at exactly this minute and weekday.
    pub fn is_due(&self, time: TimeOfDay, weekday: u8) -> bool {
        self.enabled && self.time == time && self.fires_on(weekday)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_set_round_trips_through_json() {
        let set = WeekdaySet::from_days(&[5, 1, 3]).unwrap();
        assert_eq!(serde_json::to_string(&set).unwrap(), "[1,3,5]");
        let back: WeekdaySet = serde_json::from_str("[1,3,5]").unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn weekday_set_rejects_out_of_range_days() {
        assert_eq!(
            WeekdaySet::from_days(&[7]),
            Err(ValidationError::InvalidWeekday(7))
        );
        assert!(serde_json::from_str::<WeekdaySet>("[0,9]").is_err());
    }

    #[test]
    fn parse_list_accepts_spaces() {
        let set = WeekdaySet::parse_list("1, 2,3").unwrap();
        assert_eq!(set.days(), vec![1, 2, 3]);
        assert!(WeekdaySet::parse_list("mon").is_err());
    }

    #[test]
    fn empty_day_set_means_every_day() {
        let reminder = Reminder::new(TimeOfDay::parse("08:00").unwrap(), WeekdaySet::EMPTY);
        assert!((0..=6).all(|d| reminder.fires_on(d)));
    }

    #[test]
    fn is_due_requires_exact_minute_and_enabled() {
        let mut reminder = Reminder::new(TimeOfDay::parse("08:00").unwrap(), WeekdaySet::WEEKDAYS);
        let eight = TimeOfDay::parse("08:00").unwrap();
        assert!(reminder.is_due(eight, 1));
        assert!(!reminder.is_due(eight, 0));
        assert!(!reminder.is_due(TimeOfDay::parse("08:01").unwrap(), 1));
        reminder.enabled = false;
        assert!(!reminder.is_due(eight, 1));
    }
}
