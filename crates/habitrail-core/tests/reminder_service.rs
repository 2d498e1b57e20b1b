//! Reminder loop driven by tokio's paused clock.

use std::time::Duration;

use chrono::NaiveDate;
use habitrail_core::reminder::{FixedClock, RecordingNotifier};
use habitrail_core::{
    Config, Database, DateKey, Habit, HabitDraft, NotificationKind, Reminder, ReminderService,
    StreakEngine, TimeOfDay, WeekdaySet,
};

fn saturday_at(h: u32, m: u32) -> chrono::NaiveDateTime {
    // 2024-06-08 was a Saturday.
    NaiveDate::from_ymd_opt(2024, 6, 8)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn habit(name: &str, time: &str, days: WeekdaySet) -> Habit {
    let mut draft = HabitDraft::named(name);
    draft.reminder = Some(Reminder::new(TimeOfDay::parse(time).unwrap(), days));
    Habit::new(draft).unwrap()
}

#[tokio::test(start_paused = true)]
async fn loop_fires_each_habit_once_per_minute() {
    let db = Database::open_memory().unwrap();
    db.save_habit(&habit("Weekend run", "07:00", WeekdaySet::from_days(&[0, 6]).unwrap()))
        .unwrap();
    db.save_habit(&habit("Workday standup", "07:00", WeekdaySet::WEEKDAYS))
        .unwrap();

    let clock = FixedClock::new(saturday_at(7, 0));
    let notifier = RecordingNotifier::new();
    let mut service = ReminderService::new(db, &notifier, &clock, &Config::default());

    // Ticks at 0s, 10s, 20s and 30s all land in the same wall-clock minute.
    service.run(tokio::time::sleep(Duration::from_secs(35))).await;

    let shown = notifier.shown();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].habit_name, "Weekend run");

    let log = service.db().list_notifications(false, None).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].kind, NotificationKind::Habit);
}

#[tokio::test(start_paused = true)]
async fn completed_today_is_not_reminded() {
    let db = Database::open_memory().unwrap();
    let today = DateKey::from_date(saturday_at(0, 0).date());
    let mut h = habit("Read", "21:15", WeekdaySet::EMPTY);
    h.mark_completed(today, today, &StreakEngine::new());
    db.save_habit(&h).unwrap();

    let clock = FixedClock::new(saturday_at(21, 15));
    let notifier = RecordingNotifier::new();
    let mut service = ReminderService::new(db, &notifier, &clock, &Config::default());
    service.run(tokio::time::sleep(Duration::from_secs(5))).await;

    assert!(notifier.shown().is_empty());
}

#[test]
fn next_minute_fires_again_and_message_carries_streak() {
    let db = Database::open_memory().unwrap();
    let mut h = habit("Water", "08:00", WeekdaySet::EMPTY);
    let engine = StreakEngine::new();
    let today = DateKey::from_date(saturday_at(0, 0).date());
    h.mark_completed(today.pred(), today, &engine);
    h.mark_completed(today.pred().pred(), today, &engine);
    db.save_habit(&h).unwrap();

    let clock = FixedClock::new(saturday_at(8, 0));
    let notifier = RecordingNotifier::new();
    let mut service = ReminderService::new(db, &notifier, &clock, &Config::default());

    let fires = service.tick_once().unwrap();
    assert_eq!(fires.len(), 1);
    assert_eq!(
        fires[0].message,
        "Don't forget to complete your habit: Water. Only 2 days streak so far!"
    );

    clock.advance(chrono::Duration::minutes(1));
    assert!(service.tick_once().unwrap().is_empty());

    // Same time next day is a new minute.
    clock.set(saturday_at(8, 0) + chrono::Duration::days(1));
    assert_eq!(service.tick_once().unwrap().len(), 1);
}
