//! Polling loop that drives the reminder matcher.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tokio::time::MissedTickBehavior;

use super::{deliver, MinuteMark, Notifier, ReminderFire, ReminderMatcher};
use crate::date_key::DateKey;
use crate::error::Result;
use crate::habit::StreakEngine;
use crate::notifications::{AppNotification, NotificationKind};
use crate::storage::{Config, Database};

/// Source of local wall-clock time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// The machine's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

/// kv key holding the last evaluated minute as JSON.
const LAST_MINUTE_KEY: &str = "reminders.last_minute";

/// Reloads habits from storage on every tick and shows whatever is due.
pub struct ReminderService<N, C = SystemClock> {
    db: Database,
    notifier: N,
    clock: C,
    matcher: ReminderMatcher,
    engine: StreakEngine,
    period: Duration,
    enabled: bool,
}

impl<N: Notifier, C: Clock> ReminderService<N, C> {
    /// Resumes from the last minute recorded in `db`, so separate runs
    /// inside one minute do not repeat reminders.
    pub fn new(db: Database, notifier: N, clock: C, config: &Config) -> Self {
        let matcher = match load_last_minute(&db) {
            Some(mark) => ReminderMatcher::resume_from(mark),
            None => ReminderMatcher::new(),
        };
        Self {
            db,
            notifier,
            clock,
            matcher,
            engine: StreakEngine::with_config(config.streak_config()),
            period: config.reminders.tick_period(),
            enabled: config.reminders.enabled,
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Evaluate the current minute once.
    ///
    /// Returns every firing the matcher produced, shown or not. Shown
    /// firings are appended to the notification log.
    pub fn tick_once(&mut self) -> Result<Vec<ReminderFire>> {
        if !self.enabled {
            return Ok(Vec::new());
        }

        let now = self.clock.now();
        let today = DateKey::from_date(now.date());
        let mut habits = self.db.list_habits(false)?;
        for habit in &mut habits {
            habit.refresh_streak(today, &self.engine);
        }

        let previous = self.matcher.last_checked();
        let fires = self.matcher.tick(now, &habits);
        if self.matcher.last_checked() != previous {
            self.store_last_minute();
        }

        for fire in deliver(&self.notifier, &fires) {
            let entry = AppNotification::new(&fire.title, &fire.message, NotificationKind::Habit);
            if let Err(e) = self.db.add_notification(&entry) {
                tracing::warn!(habit = %fire.habit_id, error = %e, "failed to log reminder");
            }
        }
        Ok(fires)
    }

    fn store_last_minute(&self) {
        let Some(mark) = self.matcher.last_checked() else {
            return;
        };
        let stored = serde_json::to_string(&mark)
            .map_err(crate::error::CoreError::from)
            .and_then(|json| self.db.kv_set(LAST_MINUTE_KEY, &json));
        if let Err(e) = stored {
            tracing::warn!(error = %e, "failed to store last reminder minute");
        }
    }

    /// Tick every period until `shutdown` resolves. The first tick is immediate.
    ///
    /// A failing tick is logged and skipped.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        if !self.enabled {
            tracing::info!("reminders disabled");
            return;
        }

        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);
        tracing::info!(period_secs = self.period.as_secs(), "reminder loop started");

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = interval.tick() => {
                    match self.tick_once() {
                        Ok(fires) if !fires.is_empty() => {
                            tracing::info!(count = fires.len(), "reminders fired");
                        }
                        Ok(_) => {}
                        Err(e) => tracing::warn!(error = %e, "reminder tick failed"),
                    }
                }
            }
        }
        tracing::info!("reminder loop stopped");
    }
}

fn load_last_minute(db: &Database) -> Option<MinuteMark> {
    let raw = match db.kv_get(LAST_MINUTE_KEY) {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read last reminder minute");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(mark) => Some(mark),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring malformed last reminder minute");
            None
        }
    }
}
