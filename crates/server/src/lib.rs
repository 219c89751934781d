use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::{EngineError, ErrorKind};

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod expense;
mod passbook;
mod server;
mod users;

pub mod types {
    pub mod expense {
        pub use api_types::expense::{ExpenseNew, ExpenseView, ParticipantDetail};
    }

    pub mod passbook {
        pub use api_types::passbook::{
            PassbookEntryView, PassbookQuery, PassbookResponse, SimplifiedView,
        };
    }

    pub mod user {
        pub use api_types::user::{UserNew, UserView};
    }

    pub use api_types::{Decimal, ErrorBody, Message};
}

pub enum ServerError {
    Engine(EngineError),
    /// Malformed request that never reached the engine.
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
    kind: &'static str,
}

fn status_for_kind(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InputShape
        | ErrorKind::Cardinality
        | ErrorKind::Limit
        | ErrorKind::StrategyValidation => StatusCode::BAD_REQUEST,
        ErrorKind::Lookup => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Database => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (kind, error) = match self {
            ServerError::Engine(err) => (err.kind(), message_for_engine_error(err)),
            ServerError::Generic(err) => (ErrorKind::InputShape, err),
        };

        let body = Error {
            error,
            kind: kind.as_str(),
        };
        (status_for_kind(kind), Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<axum::extract::rejection::JsonRejection> for ServerError {
    fn from(value: axum::extract::rejection::JsonRejection) -> Self {
        Self::Generic(value.body_text())
    }
}
