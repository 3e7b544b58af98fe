use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime, Utc};
use log::{debug, info};

use crate::{UserID, WeeklyPlan, Weekday};

#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub user_id: UserID,
    pub weekday: Weekday,
    pub at: DateTime<Utc>,
    pub focus: String,
}

/// Pending workout reminders of all users.
///
/// A registry is created at startup and drained with `shutdown` when the
/// process stops. Delivering due reminders is left to the caller.
#[derive(Debug)]
pub struct ReminderRegistry {
    default_time: NaiveTime,
    pending: BTreeMap<UserID, Vec<Reminder>>,
    shut_down: bool,
}

impl ReminderRegistry {
    #[must_use]
    pub fn new(default_time: NaiveTime) -> Self {
        Self {
            default_time,
            pending: BTreeMap::new(),
            shut_down: false,
        }
    }

    /// Replace the user's pending reminders with one per plan day.
    ///
    /// Days without a time use the registry's default time.
    pub fn schedule_plan(
        &mut self,
        user_id: UserID,
        plan: &WeeklyPlan,
        now: DateTime<Utc>,
        offset: FixedOffset,
    ) -> Result<usize, ReminderError> {
        if self.shut_down {
            return Err(ReminderError::ShutDown);
        }

        let mut reminders = plan
            .days
            .iter()
            .map(|day| {
                let time = day.time.unwrap_or(self.default_time);
                Reminder {
                    user_id,
                    weekday: day.weekday,
                    at: next_occurrence(day.weekday, time, now, offset),
                    focus: day.focus.clone(),
                }
            })
            .collect::<Vec<_>>();
        reminders.sort_by_key(|r| r.at);

        for reminder in &reminders {
            debug!("scheduled reminder for {} at {}", reminder.weekday, reminder.at);
        }
        let count = reminders.len();
        if let Some(replaced) = self.pending.insert(user_id, reminders) {
            debug!("replaced {} pending reminders", replaced.len());
        }
        info!("scheduled {count} reminders");
        Ok(count)
    }

    #[must_use]
    pub fn pending(&self, user_id: UserID) -> &[Reminder] {
        self.pending
            .get(&user_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Remove and return all reminders due at `now`, earliest first.
    pub fn due(&mut self, now: DateTime<Utc>) -> Vec<Reminder> {
        let mut due = vec![];
        for reminders in self.pending.values_mut() {
            let (ready, waiting): (Vec<_>, Vec<_>) =
                reminders.drain(..).partition(|r| r.at <= now);
            *reminders = waiting;
            due.extend(ready);
        }
        self.pending.retain(|_, reminders| !reminders.is_empty());
        due.sort_by_key(|r| r.at);
        due
    }

    pub fn cancel(&mut self, user_id: UserID) -> usize {
        self.pending.remove(&user_id).map_or(0, |r| r.len())
    }

    /// Stop accepting reminders and return everything still pending.
    pub fn shutdown(&mut self) -> Vec<Reminder> {
        if !self.shut_down {
            info!("reminder registry shut down");
        }
        self.shut_down = true;
        let mut drained = std::mem::take(&mut self.pending)
            .into_values()
            .flatten()
            .collect::<Vec<_>>();
        drained.sort_by_key(|r| r.at);
        drained
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

/// Next `weekday` at `time` in the local time given by `offset`, strictly
/// after today. A weekday equal to today is scheduled for next week.
#[must_use]
pub fn next_occurrence(
    weekday: Weekday,
    time: NaiveTime,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> DateTime<Utc> {
    let local_now = now.with_timezone(&offset);
    let today = Weekday::from(local_now.weekday());
    let mut days_ahead = i64::from(weekday.index()) - i64::from(today.index());
    if days_ahead <= 0 {
        days_ahead += 7;
    }
    let local = (local_now.date_naive() + Duration::days(days_ahead)).and_time(time);
    (local - Duration::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderError {
    #[error("reminder registry is shut down")]
    ShutDown,
}
