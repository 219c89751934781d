use std::{collections::HashMap, fmt, sync::Arc};

use sea_orm::{ConnectionTrait, DatabaseConnection, QueryFilter, prelude::*};

use crate::{
    EngineError, NoopNotifier, Notification, Notifier, ResultEngine, SplitCalculator, SplitLimits,
};

mod balances;
mod expenses;
mod users;
mod weekly;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Clone)]
pub struct Engine {
    database: DatabaseConnection,
    notifier: Arc<dyn Notifier>,
    calculator: SplitCalculator,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("database", &self.database)
            .field("calculator", &self.calculator)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Limits applied to every split.
    pub fn limits(&self) -> SplitLimits {
        self.calculator.limits()
    }

    fn notify(&self, notification: Notification) {
        self.notifier.send(notification);
    }
}

/// Fetch a user or fail with a lookup error.
async fn require_user<C>(db: &C, user_id: &str) -> ResultEngine<crate::users::Model>
where
    C: ConnectionTrait,
{
    crate::users::Entity::find_by_id(user_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("user {user_id}")))
}

/// Fetch every referenced user, failing on the first missing id (input order).
async fn require_users<'a, C, I>(db: &C, user_ids: I) -> ResultEngine<HashMap<String, crate::users::Model>>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = &'a str>,
{
    let wanted: Vec<&str> = user_ids.into_iter().collect();
    let found: HashMap<String, crate::users::Model> = crate::users::Entity::find()
        .filter(crate::users::Column::UserId.is_in(wanted.iter().copied()))
        .all(db)
        .await?
        .into_iter()
        .map(|model| (model.user_id.clone(), model))
        .collect();

    if let Some(missing) = wanted.iter().find(|id| !found.contains_key(**id)) {
        return Err(EngineError::KeyNotFound(format!("user {missing}")));
    }
    Ok(found)
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    notifier: Option<Arc<dyn Notifier>>,
    limits: SplitLimits,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Where notifications go. Without one they are dropped.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> EngineBuilder {
        self.notifier = Some(notifier);
        self
    }

    pub fn limits(mut self, limits: SplitLimits) -> EngineBuilder {
        self.limits = limits;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let notifier = self.notifier.unwrap_or_else(|| {
            tracing::warn!("no notifier configured, notifications will be dropped");
            Arc::new(NoopNotifier)
        });
        Ok(Engine {
            database: self.database,
            notifier,
            calculator: SplitCalculator::new(self.limits),
        })
    }
}
