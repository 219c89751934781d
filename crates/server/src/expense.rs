//! Expense API endpoints

use std::str::FromStr;

use api_types::{
    Message,
    expense::{ExpenseNew, ExpenseView, ParticipantDetail},
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use engine::{CreateExpenseCmd, EngineError, Expense, Money, ParticipantSpec, SplitType};

use crate::{ServerError, server::ServerState};

/// Handle requests for recording a new expense
pub async fn expense_new(
    State(state): State<ServerState>,
    payload: Result<Json<ExpenseNew>, JsonRejection>,
) -> Result<(StatusCode, Json<Message>), ServerError> {
    let Json(payload) = payload?;
    let cmd = create_expense_cmd(payload)?;
    state.engine.create_expense(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(Message {
            message: "Expense Created".to_string(),
        }),
    ))
}

/// Handle requests for listing every expense
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let expenses = state.engine.list_expenses().await?;
    Ok(Json(expenses.into_iter().map(expense_view).collect()))
}

/// Handle requests for listing the expenses paid by one user
pub async fn list_for_user(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let expenses = state.engine.list_expenses_for_user(&user_id).await?;
    Ok(Json(expenses.into_iter().map(expense_view).collect()))
}

fn create_expense_cmd(payload: ExpenseNew) -> Result<CreateExpenseCmd, EngineError> {
    let payer = payload
        .payer
        .filter(|payer| !payer.trim().is_empty())
        .ok_or_else(|| EngineError::MissingField("payer".to_string()))?;
    let amount = payload
        .amount
        .ok_or_else(|| EngineError::MissingField("amount".to_string()))?;
    let amount = Money::from_str(&amount.as_text())?;
    let split_type = payload
        .expense_type
        .ok_or_else(|| EngineError::MissingField("expense_type".to_string()))?;
    let split_type = SplitType::try_from(split_type.as_str())?;
    let participants = payload
        .participant_detail
        .ok_or_else(|| EngineError::MissingField("participant_detail".to_string()))?;

    let mut cmd = CreateExpenseCmd::new(payer.trim(), amount, split_type)
        .participants(participants.into_iter().map(participant_spec));
    if let Some(name) = payload.expense_name {
        cmd = cmd.name(name);
    }
    if let Some(note) = payload.note {
        cmd = cmd.note(note);
    }
    Ok(cmd)
}

fn participant_spec(detail: ParticipantDetail) -> ParticipantSpec {
    let mut spec = ParticipantSpec::new(detail.id);
    if let Some(amount) = detail.amount {
        spec = spec.amount(amount.as_text());
    }
    if let Some(percentage) = detail.percentage {
        spec = spec.percentage(percentage.as_text());
    }
    spec
}

fn expense_view(expense: Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        payer: expense.payer,
        amount: expense.amount.to_string(),
        expense_type: expense.split_type.as_str().to_string(),
        expense_name: expense.name,
        note: expense.note,
        created_at: expense.created_at,
        updated_at: expense.updated_at,
    }
}
