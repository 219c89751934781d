//! Shared-expense engine.
//!
//! A payer records an expense, the [`SplitCalculator`] allocates it across the
//! participants and every allocation becomes a [`LedgerEntry`] in the
//! append-only passbook. Balance views and weekly summaries are derived from
//! the passbook on demand and never stored.

pub use balances::{BalanceMode, BalanceView, Balances};
pub use commands::{CreateExpenseCmd, CreateUserCmd};
pub use error::{EngineError, ErrorKind, SplitError};
pub use expenses::Expense;
pub use ledger::LedgerEntry;
pub use money::Money;
pub use notify::{
    ExpenseNotice, NoopNotifier, Notification, Notifier, RecordingNotifier, SummaryLine,
    WeeklySummary,
};
pub use ops::{Engine, EngineBuilder};
pub use split::{
    Allocation, MODEL_AMOUNT_CEILING, ParticipantSpec, Percent, SplitCalculator, SplitLimits,
    SplitType,
};
pub use users::User;
pub use weekly::{WeeklyDebts, WeeklyWindow, aggregate_week, last_monday};

pub mod balances;
mod commands;
mod error;
mod expenses;
mod ledger;
mod money;
mod notify;
mod ops;
mod split;
mod users;
mod weekly;

type ResultEngine<T> = Result<T, EngineError>;
