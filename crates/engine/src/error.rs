//! The module contains the errors the engine can throw.
//!
//! Every failure carries a stable [`ErrorKind`] so the HTTP layer (and any
//! other caller) can classify it without matching on messages:
//!
//! - [`InputShape`]: a required field is missing or malformed.
//! - [`Cardinality`]: the participant list is empty or too long.
//! - [`Limit`]: the expense amount is outside the allowed range.
//! - [`StrategyValidation`]: the participants do not fit the split type.
//! - [`Lookup`]: a referenced user does not exist.
//! - [`Conflict`]: a user id or email is already taken.
//! - [`Database`]: the store failed; the whole write is rolled back.
//!
//!  [`InputShape`]: ErrorKind::InputShape
//!  [`Cardinality`]: ErrorKind::Cardinality
//!  [`Limit`]: ErrorKind::Limit
//!  [`StrategyValidation`]: ErrorKind::StrategyValidation
//!  [`Lookup`]: ErrorKind::Lookup
//!  [`Conflict`]: ErrorKind::Conflict
//!  [`Database`]: ErrorKind::Database
use sea_orm::DbErr;
use thiserror::Error;

use crate::{Money, Percent};

/// Machine-checkable classification of an [`EngineError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InputShape,
    Cardinality,
    Limit,
    StrategyValidation,
    Lookup,
    Conflict,
    Database,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InputShape => "input_shape",
            Self::Cardinality => "cardinality",
            Self::Limit => "limit",
            Self::StrategyValidation => "strategy_validation",
            Self::Lookup => "lookup",
            Self::Conflict => "conflict",
            Self::Database => "database",
        }
    }
}

/// Validation failures raised by the split calculator.
///
/// They are all detected before anything is written to the ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SplitError {
    #[error("At least one participant is required.")]
    NoParticipants,
    #[error("Too many participants. Maximum allowed is {max}.")]
    TooManyParticipants { count: usize, max: usize },
    #[error("Expense amount must be greater than 0.")]
    NonPositiveAmount,
    #[error("Expense amount exceeds the maximum limit of {max}.")]
    AmountExceedsLimit { max: Money },
    #[error(
        "Payer \"{0}\" cannot be a participant of their own expense. Leave the payer out of participant_detail."
    )]
    PayerIsParticipant(String),
    #[error("Amount or percentage is not required for equal type of split")]
    UnexpectedField,
    #[error("Each participant's amount is required for exact type of split")]
    MissingAmount,
    #[error(
        "The calculated total amount of participants ({actual}) does not match the provided total amount ({expected})"
    )]
    SumMismatch { expected: Money, actual: Money },
    #[error("Each participant's percentage is required for percent type of split")]
    MissingPercentage,
    #[error("The sum of participant's percentage is not equal to 100 (got {actual}).")]
    PercentageSumMismatch { actual: Percent },
}

impl SplitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoParticipants | Self::TooManyParticipants { .. } => ErrorKind::Cardinality,
            Self::NonPositiveAmount | Self::AmountExceedsLimit { .. } => ErrorKind::Limit,
            Self::PayerIsParticipant(_)
            | Self::UnexpectedField
            | Self::MissingAmount
            | Self::SumMismatch { .. }
            | Self::MissingPercentage
            | Self::PercentageSumMismatch { .. } => ErrorKind::StrategyValidation,
        }
    }
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0} is required")]
    MissingField(String),
    #[error("Invalid split type: {0}")]
    InvalidSplitType(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid user: {0}")]
    InvalidUser(String),
    #[error(transparent)]
    Split(#[from] SplitError),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField(_)
            | Self::InvalidSplitType(_)
            | Self::InvalidAmount(_)
            | Self::InvalidUser(_) => ErrorKind::InputShape,
            Self::Split(err) => err.kind(),
            Self::KeyNotFound(_) => ErrorKind::Lookup,
            Self::ExistingKey(_) => ErrorKind::Conflict,
            Self::Database(_) => ErrorKind::Database,
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MissingField(a), Self::MissingField(b)) => a == b,
            (Self::InvalidSplitType(a), Self::InvalidSplitType(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidUser(a), Self::InvalidUser(b)) => a == b,
            (Self::Split(a), Self::Split(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
