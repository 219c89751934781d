use sea_orm::{QueryFilter, QueryOrder, prelude::*};

use crate::{
    BalanceMode, Balances, LedgerEntry, ResultEngine, balances::simplify, ledger,
};

use super::Engine;

impl Engine {
    /// Builds a balance view from the current passbook.
    ///
    /// The passbook is read once; the view is computed on that snapshot and
    /// rows written concurrently may or may not be part of it.
    pub async fn balances(&self, mode: BalanceMode) -> ResultEngine<Balances> {
        let entries = self.ledger_entries().await?;
        tracing::debug!(entries = entries.len(), ?mode, "building balance view");
        Ok(simplify(entries, mode))
    }

    /// Entries where `user_id` is the debtor, followed by entries where they
    /// are the creditor.
    pub async fn balances_for_user(&self, user_id: &str) -> ResultEngine<Vec<LedgerEntry>> {
        let owes = ledger::Entity::find()
            .filter(ledger::Column::Debtor.eq(user_id))
            .order_by_asc(ledger::Column::Id)
            .all(&self.database)
            .await?;
        let owed = ledger::Entity::find()
            .filter(ledger::Column::Creditor.eq(user_id))
            .order_by_asc(ledger::Column::Id)
            .all(&self.database)
            .await?;

        Ok(owes
            .into_iter()
            .chain(owed)
            .map(LedgerEntry::from)
            .collect())
    }

    /// The whole passbook in ledger order.
    pub async fn ledger_entries(&self) -> ResultEngine<Vec<LedgerEntry>> {
        Ok(ledger::Entity::find()
            .order_by_asc(ledger::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(LedgerEntry::from)
            .collect())
    }
}
