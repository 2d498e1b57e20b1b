//! Delivery seam for reminder firings.

use std::sync::Mutex;

use thiserror::Error;

use super::ReminderFire;

/// Delivery failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The user has not granted notification permission.
    #[error("notification permission denied")]
    PermissionDenied,

    /// The platform accepted the request but could not show it.
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// Shows a reminder to the user.
pub trait Notifier {
    /// # Errors
    /// Returns [`NotifyError`] when the notification could not be shown.
    fn notify(&self, fire: &ReminderFire) -> Result<(), NotifyError>;
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, fire: &ReminderFire) -> Result<(), NotifyError> {
        (**self).notify(fire)
    }
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&self, fire: &ReminderFire) -> Result<(), NotifyError> {
        (**self).notify(fire)
    }
}

/// Deliver each firing, swallowing failures. No retry.
///
/// Returns the firings that were actually shown.
pub fn deliver<'a, N: Notifier + ?Sized>(notifier: &N, fires: &'a [ReminderFire]) -> Vec<&'a ReminderFire> {
    let mut shown = Vec::with_capacity(fires.len());
    for fire in fires {
        match notifier.notify(fire) {
            Ok(()) => shown.push(fire),
            Err(NotifyError::PermissionDenied) => {
                tracing::debug!(habit = %fire.habit_id, "notification permission denied");
            }
            Err(err) => {
                tracing::warn!(habit = %fire.habit_id, error = %err, "reminder not shown");
            }
        }
    }
    shown
}

/// Notifier that keeps every firing in memory.
///
/// Useful for dry runs and tests. Can be configured to refuse delivery.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<ReminderFire>>,
    deny: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier without permission to show anything.
    pub fn denied() -> Self {
        Self {
            shown: Mutex::new(Vec::new()),
            deny: true,
        }
    }

    pub fn shown(&self) -> Vec<ReminderFire> {
        self.shown
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, fire: &ReminderFire) -> Result<(), NotifyError> {
        if self.deny {
            return Err(NotifyError::PermissionDenied);
        }
        self.shown
            .lock()
            .map_err(|e| NotifyError::Delivery(e.to_string()))?
            .push(fire.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_key::{DateKey, TimeOfDay};
    use crate::reminder::MinuteMark;

    fn fire(id: &str) -> ReminderFire {
        ReminderFire {
            habit_id: id.to_string(),
            habit_name: id.to_string(),
            at: MinuteMark {
                day: DateKey::parse("2024-06-03").unwrap(),
                time: TimeOfDay::parse("08:00").unwrap(),
            },
            title: format!("Time for {id}!"),
            message: String::new(),
        }
    }

    struct Flaky;

    impl Notifier for Flaky {
        fn notify(&self, fire: &ReminderFire) -> Result<(), NotifyError> {
            if fire.habit_id == "bad" {
                Err(NotifyError::Delivery("boom".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn permission_denial_is_swallowed() {
        let notifier = RecordingNotifier::denied();
        let fires = [fire("a"), fire("b")];
        assert!(deliver(&notifier, &fires).is_empty());
        assert!(notifier.shown().is_empty());
    }

    #[test]
    fn one_failure_does_not_stop_the_rest() {
        let fires = [fire("bad"), fire("good")];
        let shown = deliver(&Flaky, &fires);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].habit_id, "good");
    }

    #[test]
    fn recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        let fires = [fire("a"), fire("b")];
        deliver(&notifier, &fires);
        let ids: Vec<String> = notifier.shown().into_iter().map(|f| f.habit_id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
