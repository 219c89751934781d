//! Users table (minimal entity).
//!
//! Expenses and ledger entries reference users by `user_id`, a readable slug
//! derived from the name (`"Jane Doe"` -> `jane_doe_1a2b3c4d`).

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub mobile_number: Option<String>,
}

impl User {
    /// Validates the fields and generates a `user_id` when none is given.
    pub fn new(
        user_id: Option<&str>,
        name: &str,
        email: &str,
        mobile_number: Option<&str>,
    ) -> ResultEngine<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidUser("name must not be empty".to_string()));
        }
        let email = email.trim();
        if !email.contains('@') {
            return Err(EngineError::InvalidUser(format!("invalid email: {email}")));
        }
        let mobile_number = crate::ops::normalize_optional_text(mobile_number);
        if let Some(mobile) = &mobile_number
            && mobile.chars().count() > 10
        {
            return Err(EngineError::InvalidUser(
                "mobile number must be at most 10 characters".to_string(),
            ));
        }
        let user_id = match crate::ops::normalize_optional_text(user_id) {
            Some(id) => id,
            None => generate_user_id(name),
        };

        Ok(Self {
            user_id,
            name: name.to_string(),
            email: email.to_lowercase(),
            mobile_number,
        })
    }
}

/// `lowercase(name)` with whitespace replaced by `_`, plus 8 random hex chars.
fn generate_user_id(name: &str) -> String {
    let slug: String = name
        .nfkc()
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{slug}_{}", &suffix[..8])
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub mobile_number: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        Self {
            user_id: ActiveValue::Set(user.user_id.clone()),
            name: ActiveValue::Set(user.name.clone()),
            email: ActiveValue::Set(user.email.clone()),
            mobile_number: ActiveValue::Set(user.mobile_number.clone()),
        }
    }
}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            user_id: model.user_id,
            name: model.name,
            email: model.email,
            mobile_number: model.mobile_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_is_slug_plus_suffix() {
        let user = User::new(None, " Jane  Doe ", "Jane@Example.com", None).unwrap();
        let (slug, suffix) = user.user_id.rsplit_once('_').unwrap();
        assert_eq!(slug, "jane__doe");
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(user.name, "Jane  Doe");
        assert_eq!(user.email, "jane@example.com");
    }

    #[test]
    fn explicit_id_is_kept() {
        let user = User::new(Some("alice"), "Alice", "alice@example.com", Some("555")).unwrap();
        assert_eq!(user.user_id, "alice");
        assert_eq!(user.mobile_number.as_deref(), Some("555"));
    }

    #[test]
    fn rejects_invalid_fields() {
        assert!(User::new(None, "  ", "a@b.c", None).is_err());
        assert!(User::new(None, "Bob", "not-an-email", None).is_err());
        assert!(User::new(None, "Bob", "bob@example.com", Some("12345678901")).is_err());
    }
}
