//! The passbook: an append-only ledger of who owes whom.
//!
//! Each [`LedgerEntry`] states that `debtor` owes `creditor` a fixed amount and
//! comes from one participant's share of one expense. Entries for the same
//! pair are never merged at rest; they are summed only when a view is built
//! (see [`crate::balances`]).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, ConnectionTrait, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{Allocation, Money, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub expense_id: i64,
    pub debtor: String,
    pub creditor: String,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub expense_id: i64,
    pub debtor: String,
    pub creditor: String,
    pub amount_minor: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Expenses,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for LedgerEntry {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            expense_id: model.expense_id,
            debtor: model.debtor,
            creditor: model.creditor,
            amount: Money::new(model.amount_minor),
            created_at: model.created_at,
        }
    }
}

/// Writes one entry per allocation, in allocation order, crediting `payer`.
///
/// The caller owns the transaction: when it is rolled back, none of the
/// entries survive.
pub(crate) async fn accumulate<C>(
    db: &C,
    expense_id: i64,
    payer: &str,
    allocations: &[Allocation],
    now: DateTime<Utc>,
) -> ResultEngine<Vec<LedgerEntry>>
where
    C: ConnectionTrait,
{
    let mut entries = Vec::with_capacity(allocations.len());
    for allocation in allocations {
        let row = ActiveModel {
            id: ActiveValue::NotSet,
            expense_id: ActiveValue::Set(expense_id),
            debtor: ActiveValue::Set(allocation.debtor.clone()),
            creditor: ActiveValue::Set(payer.to_string()),
            amount_minor: ActiveValue::Set(allocation.amount.minor()),
            created_at: ActiveValue::Set(now),
        };
        let model = row.insert(db).await?;
        tracing::debug!(
            expense_id,
            debtor = %model.debtor,
            creditor = %model.creditor,
            amount = %allocation.amount,
            "ledger entry written"
        );
        entries.push(LedgerEntry::from(model));
    }
    Ok(entries)
}
