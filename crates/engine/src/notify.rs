//! Outbound notifications.
//!
//! The engine never delivers messages itself: it hands a [`Notification`] to
//! an injected [`Notifier`] and moves on. Implementations must return quickly
//! (queue the message, do not wait for delivery) and must swallow their own
//! failures.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::Money;

/// Sent to a debtor for every ledger entry created on their behalf.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseNotice {
    pub debtor_name: String,
    pub debtor_email: String,
    pub payer_name: String,
    pub amount: Money,
}

/// One creditor line of a weekly summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryLine {
    pub creditor_name: String,
    pub amount: Money,
}

/// What a user owed to others during the trailing week.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub lines: Vec<SummaryLine>,
    pub total: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    ExpenseNotice(ExpenseNotice),
    WeeklySummary(WeeklySummary),
}

/// Fire-and-forget sink for notifications.
pub trait Notifier: Send + Sync {
    fn send(&self, notification: Notification);
}

/// Drops every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn send(&self, _notification: Notification) {}
}

/// Keeps every notification in memory, in dispatch order. Meant for tests.
#[doc(hidden)]
#[derive(Clone, Debug, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of what has been sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<Notification> {
        match self.sent.lock() {
            Ok(sent) => sent.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, notification: Notification) {
        match self.sent.lock() {
            Ok(mut sent) => sent.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}
