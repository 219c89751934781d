//! Expense primitives.
//!
//! An [`Expense`] records that a payer spent an amount on behalf of others.
//! It never changes after creation; who owes what lives in the ledger.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, SplitType};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub payer: String,
    pub amount: Money,
    pub split_type: SplitType,
    pub name: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub payer: String,
    pub amount_minor: i64,
    pub split_type: String,
    pub name: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::Payer",
        to = "super::users::Column::UserId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(has_many = "super::ledger::Entity")]
    LedgerEntries,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::ledger::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    /// A new row; the id is assigned by the database.
    pub(crate) fn new_row(
        payer: &str,
        amount: Money,
        split_type: SplitType,
        name: Option<String>,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ActiveValue::NotSet,
            payer: ActiveValue::Set(payer.to_string()),
            amount_minor: ActiveValue::Set(amount.minor()),
            split_type: ActiveValue::Set(split_type.as_str().to_string()),
            name: ActiveValue::Set(name),
            note: ActiveValue::Set(note),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            payer: model.payer,
            amount: Money::new(model.amount_minor),
            split_type: SplitType::try_from(model.split_type.as_str())?,
            name: model.name,
            note: model.note,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
