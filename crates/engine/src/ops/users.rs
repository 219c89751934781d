use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{CreateUserCmd, EngineError, ResultEngine, User, users};

use super::{Engine, require_user, with_tx};

impl Engine {
    /// Registers a user. Both the id and the email must be unused.
    pub async fn create_user(&self, cmd: CreateUserCmd) -> ResultEngine<User> {
        let user = User::new(
            cmd.user_id.as_deref(),
            &cmd.name,
            &cmd.email,
            cmd.mobile_number.as_deref(),
        )?;

        with_tx!(self, |db_tx| {
            async {
                let clash = users::Entity::find()
                    .filter(
                        users::Column::UserId
                            .eq(user.user_id.as_str())
                            .or(users::Column::Email.eq(user.email.as_str())),
                    )
                    .one(&db_tx)
                    .await?;
                if let Some(existing) = clash {
                    let key = if existing.user_id == user.user_id {
                        existing.user_id
                    } else {
                        existing.email
                    };
                    return Err(EngineError::ExistingKey(key));
                }

                users::ActiveModel::from(&user).insert(&db_tx).await?;
                Ok::<_, EngineError>(())
            }
            .await
        })?;

        tracing::info!(user_id = %user.user_id, "user created");
        Ok(user)
    }

    pub async fn user(&self, user_id: &str) -> ResultEngine<User> {
        require_user(&self.database, user_id).await.map(User::from)
    }

    /// Every registered user, ordered by id.
    pub async fn list_users(&self) -> ResultEngine<Vec<User>> {
        Ok(users::Entity::find()
            .order_by_asc(users::Column::UserId)
            .all(&self.database)
            .await?
            .into_iter()
            .map(User::from)
            .collect())
    }
}
