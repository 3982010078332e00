//! Due-date reminder sweep
//!
//! Periodically finds active loans due inside the reminder window and sends
//! each one a single `DueSoon` notification.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use super::notifications::{LoanEvent, Notifier};
use crate::{error::AppResult, repository::LendingStore};

#[derive(Clone)]
pub struct ReminderService {
    store: Arc<dyn LendingStore>,
    notifier: Arc<dyn Notifier>,
    window: chrono::Duration,
}

impl ReminderService {
    pub fn new(
        store: Arc<dyn LendingStore>,
        notifier: Arc<dyn Notifier>,
        window_days: i64,
    ) -> Self {
        Self {
            store,
            notifier,
            window: chrono::Duration::days(window_days.max(0)),
        }
    }

    /// Remind every loan due before `now + window`. Returns how many were sent.
    ///
    /// Each loan is claimed in the store before its notification goes out,
    /// so overlapping sweeps never remind the same loan twice. A failed
    /// delivery drops the claim and is retried on the next sweep.
    pub async fn run_once(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let due = self.store.list_loans_due_before(now + self.window).await?;
        let mut sent = 0;

        for loan in due {
            if !self.store.claim_reminder(loan.id, now).await? {
                continue;
            }

            if let Err(e) = self.notifier.notify(LoanEvent::DueSoon, &loan).await {
                tracing::warn!(loan_id = %loan.id, "Failed to send due-date reminder: {}", e);
                self.store.release_reminder(loan.id, now).await?;
                continue;
            }
            sent += 1;
        }

        if sent > 0 {
            tracing::info!(count = sent, "Due-date reminders sent");
        }
        Ok(sent)
    }

    /// Run the sweep forever on a fixed period
    pub fn spawn(self, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!(period_secs = every.as_secs(), "Reminder sweep starting");

            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if let Err(e) = self.run_once(Utc::now()).await {
                    tracing::error!(?e, "Reminder sweep failed");
                }
            }
        })
    }
}
