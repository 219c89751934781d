use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{QueryFilter, QueryOrder, prelude::*};

use crate::{
    LedgerEntry, Money, Notification, ResultEngine, SummaryLine, WeeklySummary, WeeklyWindow,
    aggregate_week, expenses, ledger, users,
};

use super::Engine;

impl Engine {
    /// Per-user summaries of what each user owed during the week ending on
    /// `today` (see [`WeeklyWindow::ending`]).
    ///
    /// Users who owe nothing in the window are left out.
    pub async fn weekly_summaries(&self, today: NaiveDate) -> ResultEngine<Vec<WeeklySummary>> {
        let window = WeeklyWindow::ending(today);

        let rows: Vec<(LedgerEntry, DateTime<Utc>)> = ledger::Entity::find()
            .find_also_related(expenses::Entity)
            .filter(expenses::Column::CreatedAt.gte(window.start_utc()))
            .order_by_asc(ledger::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .filter_map(|(entry, expense)| {
                expense.map(|expense| (LedgerEntry::from(entry), expense.created_at))
            })
            .collect();
        let debts = aggregate_week(&rows, &window);

        let users = users::Entity::find()
            .order_by_asc(users::Column::UserId)
            .all(&self.database)
            .await?;
        let name_of = |user_id: &str| {
            users
                .iter()
                .find(|u| u.user_id == user_id)
                .map_or_else(|| user_id.to_string(), |u| u.name.clone())
        };

        let summaries = users
            .iter()
            .filter_map(|user| {
                let creditors = debts.get(&user.user_id)?;
                let lines: Vec<SummaryLine> = creditors
                    .iter()
                    .map(|(creditor, amount)| SummaryLine {
                        creditor_name: name_of(creditor),
                        amount: *amount,
                    })
                    .collect();
                let total: Money = lines.iter().map(|line| line.amount).sum();
                Some(WeeklySummary {
                    user_id: user.user_id.clone(),
                    user_name: user.name.clone(),
                    user_email: user.email.clone(),
                    lines,
                    total,
                })
            })
            .collect();

        Ok(summaries)
    }

    /// Hands one summary per indebted user to the notifier and returns how many
    /// were dispatched.
    pub async fn send_weekly_summaries(&self, today: NaiveDate) -> ResultEngine<usize> {
        let summaries = self.weekly_summaries(today).await?;
        let count = summaries.len();
        for summary in summaries {
            self.notify(Notification::WeeklySummary(summary));
        }
        tracing::info!(%today, summaries = count, "weekly summaries dispatched");
        Ok(count)
    }
}
