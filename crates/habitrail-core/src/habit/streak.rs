//! Day-streak calculation over a habit's completion set.
//!
//! The current streak is the run of consecutive completed days ending today.
//! A day that has not been completed yet does not break the streak until it
//! is over, so when today is missing the run ending yesterday counts instead.

use serde::{Deserialize, Serialize};

use crate::date_key::{CompletionSet, DateKey};

/// Configuration for streak calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakConfig {
    /// Upper bound on the reported current streak, in days.
    /// `None` walks the whole run.
    #[serde(default)]
    pub max_lookback_days: Option<u32>,
}

/// Current and best streak for one habit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub current: u32,
    pub best: u32,
}

/// Streak calculator
#[derive(Debug, Clone, Default)]
pub struct StreakEngine {
    config: StreakConfig,
}

impl StreakEngine {
    /// Create a new engine with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: StreakConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StreakConfig {
        &self.config
    }

    /// Consecutive completed days ending at `today`, or at yesterday when
    /// `today` has no completion yet.
    pub fn current_streak(&self, completed: &CompletionSet, today: DateKey) -> u32 {
        let mut day = today;
        if !completed.contains(&day) {
            // Grace step: today is still open.
            day = day.pred();
        }

        // Every counted day is a distinct member of the set, so the set size
        // bounds the walk even without a configured cap.
        let mut bound = completed.len();
        if let Some(cap) = self.config.max_lookback_days {
            bound = bound.min(cap as usize);
        }

        let mut streak = 0usize;
        while streak < bound && completed.contains(&day) {
            streak += 1;
            day = day.pred();
        }
        u32::try_from(streak).unwrap_or(u32::MAX)
    }

    /// Longest run of consecutive days anywhere in the set.
    pub fn best_streak(&self, completed: &CompletionSet) -> u32 {
        let mut best = 0u32;
        let mut run = 0u32;
        let mut prev: Option<DateKey> = None;

        for day in completed.iter() {
            run = match prev {
                Some(p) if p.succ() == *day => run.saturating_add(1),
                _ => 1,
            };
            best = best.max(run);
            prev = Some(*day);
        }
        best
    }

    /// Both streaks for `today`; `best >= current` always holds.
    pub fn summarize(&self, completed: &CompletionSet, today: DateKey) -> StreakSummary {
        let current = self.current_streak(completed, today);
        let best = self.best_streak(completed).max(current);
        StreakSummary { current, best }
    }
}
