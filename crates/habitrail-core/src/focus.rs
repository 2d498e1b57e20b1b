//! Focus-session log and aggregate statistics.
//!
//! A session is a stretch of timed work (or a break) attached to a task and
//! the day it was logged on.

use std::str::FromStr;

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::date_key::DateKey;
use crate::error::ValidationError;

/// Sessions this short or shorter are not worth logging.
pub const MIN_SESSION_SECONDS: u64 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    #[default]
    Focus,
    ShortBreak,
    LongBreak,
}

impl SessionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::Focus => "focus",
            SessionKind::ShortBreak => "short_break",
            SessionKind::LongBreak => "long_break",
        }
    }
}

impl FromStr for SessionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "focus" => Ok(SessionKind::Focus),
            "short_break" | "short" => Ok(SessionKind::ShortBreak),
            "long_break" | "long" => Ok(SessionKind::LongBreak),
            _ => Err(ValidationError::InvalidValue {
                field: "kind".to_string(),
                message: format!("unknown session kind '{s}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Completed,
    Interrupted,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Completed => "completed",
            SessionStatus::Interrupted => "interrupted",
        }
    }

    pub fn parse_lenient(s: &str) -> Self {
        if s.eq_ignore_ascii_case("interrupted") {
            SessionStatus::Interrupted
        } else {
            SessionStatus::Completed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSession {
    pub id: String,
    pub task_id: String,
    pub date: DateKey,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_seconds: u64,
    pub kind: SessionKind,
    pub status: SessionStatus,
}

impl FocusSession {
    /// Build a session from its boundaries.
    ///
    /// Returns `None` when the session lasted [`MIN_SESSION_SECONDS`] or less.
    pub fn record(
        task_id: impl Into<String>,
        date: DateKey,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        kind: SessionKind,
    ) -> Option<Self> {
        let seconds = (ended_at - started_at).num_seconds();
        let duration_seconds = u64::try_from(seconds).ok()?;
        if duration_seconds <= MIN_SESSION_SECONDS {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4().to_string(),
            task_id: task_id.into(),
            date,
            started_at,
            ended_at,
            duration_seconds,
            kind,
            status: SessionStatus::Completed,
        })
    }

    pub fn whole_minutes(&self) -> u64 {
        self.duration_seconds / 60
    }
}

/// Reporting window for focus statistics, anchored at "today".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusRange {
    Day,
    #[default]
    Week,
    Month,
    Year,
    AllTime,
}

impl FocusRange {
    /// First day included in the window, or `None` for all time.
    pub fn start(self, today: DateKey) -> Option<DateKey> {
        let date = today.date();
        match self {
            FocusRange::Day => Some(today),
            FocusRange::Week => Some(DateKey::from_date(date - chrono::Days::new(6))),
            FocusRange::Month => Some(DateKey::from_date(date - chrono::Days::new(29))),
            FocusRange::Year => Some(DateKey::from_date(
                date.checked_sub_months(Months::new(12)).unwrap_or(date),
            )),
            FocusRange::AllTime => None,
        }
    }
}

impl FromStr for FocusRange {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "day" => Ok(FocusRange::Day),
            "week" => Ok(FocusRange::Week),
            "month" => Ok(FocusRange::Month),
            "year" => Ok(FocusRange::Year),
            "all" | "all_time" => Ok(FocusRange::AllTime),
            _ => Err(ValidationError::InvalidValue {
                field: "range".to_string(),
                message: format!("unknown range '{s}'"),
            }),
        }
    }
}

/// Minute totals over a set of sessions. Each session contributes its whole
/// minutes only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusStats {
    pub sessions: u64,
    pub completed: u64,
    pub interrupted: u64,
    pub total_minutes: u64,
    pub focus_minutes: u64,
    pub short_break_minutes: u64,
    pub long_break_minutes: u64,
}

impl FocusStats {
    pub fn from_sessions<'a, I>(sessions: I) -> Self
    where
        I: IntoIterator<Item = &'a FocusSession>,
    {
        let mut stats = Self::default();
        for session in sessions {
            let minutes = session.whole_minutes();
            stats.sessions += 1;
            stats.total_minutes += minutes;
            match session.status {
                SessionStatus::Completed => stats.completed += 1,
                SessionStatus::Interrupted => stats.interrupted += 1,
            }
            match session.kind {
                SessionKind::Focus => stats.focus_minutes += minutes,
                SessionKind::ShortBreak => stats.short_break_minutes += minutes,
                SessionKind::LongBreak => stats.long_break_minutes += minutes,
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn key(s: &str) -> DateKey {
        DateKey::parse(s).unwrap()
    }

    #[test]
    fn sessions_of_one_second_or_less_are_dropped() {
        let start = Utc::now();
        let day = key("2024-06-01");
        assert!(FocusSession::record("t", day, start, start + Duration::seconds(1), SessionKind::Focus).is_none());
        assert!(FocusSession::record("t", day, start, start - Duration::seconds(30), SessionKind::Focus).is_none());
        let s = FocusSession::record("t", day, start, start + Duration::seconds(2), SessionKind::Focus).unwrap();
        assert_eq!(s.duration_seconds, 2);
    }

    #[test]
    fn stats_use_whole_minutes_per_session() {
        let start = Utc::now();
        let day = key("2024-06-01");
        let mut sessions = vec![
            FocusSession::record("t", day, start, start + Duration::seconds(25 * 60 + 59), SessionKind::Focus).unwrap(),
            FocusSession::record("t", day, start, start + Duration::seconds(5 * 60), SessionKind::ShortBreak).unwrap(),
            FocusSession::record("t", day, start, start + Duration::seconds(15 * 60), SessionKind::LongBreak).unwrap(),
        ];
        sessions[1].status = SessionStatus::Interrupted;

        let stats = FocusStats::from_sessions(&sessions);
        assert_eq!(stats.sessions, 3);
        assert_eq!((stats.completed, stats.interrupted), (2, 1));
        assert_eq!(stats.focus_minutes, 25);
        assert_eq!(stats.short_break_minutes, 5);
        assert_eq!(stats.long_break_minutes, 15);
        assert_eq!(stats.total_minutes, 45);
    }

    #[test]
    fn range_start_dates() {
        let today = key("2024-03-31");
        assert_eq!(FocusRange::Day.start(today), Some(today));
        assert_eq!(FocusRange::Week.start(today), Some(key("2024-03-25")));
        assert_eq!(FocusRange::Month.start(today), Some(key("2024-03-02")));
        assert_eq!(FocusRange::Year.start(today), Some(key("2023-03-31")));
        assert_eq!(FocusRange::AllTime.start(today), None);
    }

    #[test]
    fn kind_accepts_display_labels() {
        assert_eq!("Short Break".parse::<SessionKind>().unwrap(), SessionKind::ShortBreak);
        assert_eq!("long-break".parse::<SessionKind>().unwrap(), SessionKind::LongBreak);
        assert!("nap".parse::<SessionKind>().is_err());
    }
}
