//! Weekly per-user debt aggregation.
//!
//! The summary covers the trailing window `[last_monday(today), today]`, where
//! `last_monday` is always the Monday of the *previous* calendar week. An
//! entry belongs to the window when the expense that produced it was created
//! (UTC date) inside it.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};

use crate::{LedgerEntry, Money};

/// `debtor -> creditor -> amount owed in the window`.
pub type WeeklyDebts = BTreeMap<String, BTreeMap<String, Money>>;

/// Monday of the calendar week before the one containing `today`.
#[must_use]
pub fn last_monday(today: NaiveDate) -> NaiveDate {
    let back = u64::from(today.weekday().num_days_from_monday()) + 7;
    today - Days::new(back)
}

/// Inclusive date range covered by a weekly summary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeeklyWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeeklyWindow {
    #[must_use]
    pub fn ending(today: NaiveDate) -> Self {
        Self {
            start: last_monday(today),
            end: today,
        }
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// First instant of the window, in UTC.
    #[must_use]
    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start.and_time(chrono::NaiveTime::MIN).and_utc()
    }
}

/// Groups the in-window entries by debtor, then by creditor.
///
/// `rows` pairs each entry with the creation time of its expense. Entries a
/// user owes to themselves are ignored.
#[must_use]
pub fn aggregate_week(rows: &[(LedgerEntry, DateTime<Utc>)], window: &WeeklyWindow) -> WeeklyDebts {
    let mut debts = WeeklyDebts::new();
    for (entry, expense_created_at) in rows {
        if entry.debtor == entry.creditor || !window.contains(expense_created_at.date_naive()) {
            continue;
        }
        *debts
            .entry(entry.debtor.clone())
            .or_default()
            .entry(entry.creditor.clone())
            .or_insert(Money::ZERO) += entry.amount;
    }
    debts
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Weekday};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(debtor: &str, creditor: &str, amount: i64, created: NaiveDate) -> (LedgerEntry, DateTime<Utc>) {
        let at = Utc.from_utc_datetime(&created.and_hms_opt(18, 30, 0).unwrap());
        (
            LedgerEntry {
                id: 0,
                expense_id: 0,
                debtor: debtor.to_string(),
                creditor: creditor.to_string(),
                amount: Money::major(amount),
                created_at: at,
            },
            at,
        )
    }

    #[test]
    fn last_monday_is_previous_week_monday() {
        // 2026-10-14 is a Wednesday.
        let wednesday = date(2026, 10, 14);
        assert_eq!(wednesday.weekday(), Weekday::Wed);
        assert_eq!(last_monday(wednesday), date(2026, 10, 5));

        let monday = date(2026, 10, 12);
        assert_eq!(last_monday(monday), date(2026, 10, 5));

        let sunday = date(2026, 10, 18);
        assert_eq!(last_monday(sunday), date(2026, 10, 5));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let today = date(2026, 10, 14);
        let window = WeeklyWindow::ending(today);
        let rows = vec![
            row("a", "b", 10, date(2026, 10, 5)),
            row("a", "b", 20, today),
            row("a", "b", 40, date(2026, 10, 4)),
            row("a", "b", 80, date(2026, 10, 15)),
        ];
        let debts = aggregate_week(&rows, &window);
        assert_eq!(debts["a"]["b"], Money::major(30));
    }

    #[test]
    fn debts_are_grouped_per_debtor_and_creditor() {
        let today = date(2026, 10, 14);
        let rows = vec![
            row("a", "b", 10, today),
            row("a", "c", 5, today),
            row("a", "b", 1, today),
            row("b", "a", 7, today),
            row("c", "c", 9, today),
        ];
        let debts = aggregate_week(&rows, &WeeklyWindow::ending(today));
        assert_eq!(debts.len(), 2);
        assert_eq!(debts["a"]["b"], Money::major(11));
        assert_eq!(debts["a"]["c"], Money::major(5));
        assert_eq!(debts["b"]["a"], Money::major(7));
        assert!(!debts.contains_key("c"));
    }

    #[test]
    fn start_utc_is_midnight() {
        let window = WeeklyWindow::ending(date(2026, 10, 14));
        assert_eq!(
            window.start_utc(),
            Utc.with_ymd_and_hms(2026, 10, 5, 0, 0, 0).unwrap()
        );
    }
}
