use chrono::Utc;
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    CreateExpenseCmd, Expense, ExpenseNotice, Notification, ResultEngine, expenses, ledger,
};

use super::{Engine, normalize_optional_text, require_user, require_users, with_tx};

impl Engine {
    /// Records an expense and splits it into ledger entries.
    ///
    /// Validation (split rules, limits, user lookups) runs before anything is
    /// written. The expense row and all of its ledger entries are committed in
    /// a single DB transaction; one [`ExpenseNotice`] per entry is dispatched
    /// after the commit, in participant order.
    pub async fn create_expense(&self, cmd: CreateExpenseCmd) -> ResultEngine<Expense> {
        let allocations =
            self.calculator
                .split(cmd.amount, &cmd.payer, &cmd.participants, cmd.split_type)?;
        let name = normalize_optional_text(cmd.name.as_deref());
        let note = normalize_optional_text(cmd.note.as_deref());
        let now = Utc::now();

        let (expense, entries, payer, debtors) = with_tx!(self, |db_tx| {
            async {
                let payer = require_user(&db_tx, &cmd.payer).await?;
                let debtors =
                    require_users(&db_tx, allocations.iter().map(|a| a.debtor.as_str())).await?;

                let expense = expenses::ActiveModel::new_row(
                    &payer.user_id,
                    cmd.amount,
                    cmd.split_type,
                    name,
                    note,
                    now,
                )
                .insert(&db_tx)
                .await?;
                let entries =
                    ledger::accumulate(&db_tx, expense.id, &payer.user_id, &allocations, now)
                        .await?;
                Ok::<_, crate::EngineError>((expense, entries, payer, debtors))
            }
            .await
        })?;

        tracing::info!(
            expense_id = expense.id,
            payer = %payer.user_id,
            amount = %cmd.amount,
            split_type = %cmd.split_type,
            entries = entries.len(),
            "expense created"
        );

        for entry in &entries {
            let Some(debtor) = debtors.get(&entry.debtor) else {
                continue;
            };
            self.notify(Notification::ExpenseNotice(ExpenseNotice {
                debtor_name: debtor.name.clone(),
                debtor_email: debtor.email.clone(),
                payer_name: payer.name.clone(),
                amount: entry.amount,
            }));
        }

        Expense::try_from(expense)
    }

    /// Every expense, oldest first.
    pub async fn list_expenses(&self) -> ResultEngine<Vec<Expense>> {
        expenses::Entity::find()
            .order_by_asc(expenses::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Expense::try_from)
            .collect()
    }

    /// Expenses paid by `user_id`, oldest first. Unknown users have none.
    pub async fn list_expenses_for_user(&self, user_id: &str) -> ResultEngine<Vec<Expense>> {
        expenses::Entity::find()
            .filter(expenses::Column::Payer.eq(user_id))
            .order_by_asc(expenses::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Expense::try_from)
            .collect()
    }
}
