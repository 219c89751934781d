use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A decimal sent either as a JSON number or as a string.
///
/// `10`, `10.5` and `"10.50"` are all accepted; the server parses the text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Decimal {
    Number(serde_json::Number),
    Text(String),
}

impl Decimal {
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text.clone(),
        }
    }
}

impl From<&str> for Decimal {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Plain acknowledgement, e.g. `{"message": "Expense Created"}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    /// Stable classification (`input_shape`, `lookup`, ...).
    pub kind: String,
}

pub mod expense {
    use super::*;

    /// Request body for `POST /expense`.
    ///
    /// Every field is optional at the wire level so that missing ones are
    /// reported with a readable message instead of a deserialization error.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub payer: Option<String>,
        pub amount: Option<Decimal>,
        /// `equal`, `exact` or `percent`, case-insensitive.
        pub expense_type: Option<String>,
        pub expense_name: Option<String>,
        pub note: Option<String>,
        pub participant_detail: Option<Vec<ParticipantDetail>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantDetail {
        pub id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub amount: Option<Decimal>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub percentage: Option<Decimal>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: i64,
        pub payer: String,
        /// Decimal string with two fractional digits.
        pub amount: String,
        pub expense_type: String,
        pub expense_name: Option<String>,
        pub note: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod passbook {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PassbookQuery {
        /// `true`, `1`, `yes` or `on` select the simplified view.
        pub simplify: Option<String>,
    }

    impl PassbookQuery {
        pub fn wants_simplified(&self) -> bool {
            self.simplify.as_deref().is_some_and(|value| {
                matches!(
                    value.trim().to_ascii_lowercase().as_str(),
                    "true" | "1" | "yes" | "on"
                )
            })
        }
    }

    /// One ledger row: `user` owes `amount` to `owes_to`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PassbookEntryView {
        pub id: i64,
        pub expense_id: i64,
        pub user: String,
        pub owes_to: String,
        pub amount: String,
        pub created_at: DateTime<Utc>,
    }

    /// `outer user -> inner user -> amount` after netting.
    pub type SimplifiedView = BTreeMap<String, BTreeMap<String, String>>;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum PassbookResponse {
        Raw(Vec<PassbookEntryView>),
        Simplified(SimplifiedView),
    }
}

pub mod user {
    use super::*;

    /// Request body for `POST /users`. A `user_id` is generated when absent.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        #[serde(default)]
        pub user_id: Option<String>,
        pub name: String,
        pub email: String,
        #[serde(default)]
        pub mobile_number: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub user_id: String,
        pub name: String,
        pub email: String,
        pub mobile_number: Option<String>,
    }
}
