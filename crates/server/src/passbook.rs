//! Passbook API endpoints

use api_types::passbook::{PassbookEntryView, PassbookQuery, PassbookResponse, SimplifiedView};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use engine::{BalanceMode, BalanceView, Balances, LedgerEntry};

use crate::{ServerError, server::ServerState};

/// Handle requests for the balance view, raw or simplified (`?simplify=true`)
pub async fn get(
    State(state): State<ServerState>,
    Query(query): Query<PassbookQuery>,
) -> Result<Json<PassbookResponse>, ServerError> {
    let mode = BalanceMode::from_flag(query.wants_simplified());
    let response = match state.engine.balances(mode).await? {
        Balances::Raw(entries) => {
            PassbookResponse::Raw(entries.into_iter().map(entry_view).collect())
        }
        Balances::Simplified(view) => PassbookResponse::Simplified(simplified_view(view)),
    };
    Ok(Json(response))
}

/// Handle requests for the entries one user takes part in
pub async fn get_for_user(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<PassbookEntryView>>, ServerError> {
    let entries = state.engine.balances_for_user(&user_id).await?;
    Ok(Json(entries.into_iter().map(entry_view).collect()))
}

fn entry_view(entry: LedgerEntry) -> PassbookEntryView {
    PassbookEntryView {
        id: entry.id,
        expense_id: entry.expense_id,
        user: entry.debtor,
        owes_to: entry.creditor,
        amount: entry.amount.to_string(),
        created_at: entry.created_at,
    }
}

fn simplified_view(view: BalanceView) -> SimplifiedView {
    view.into_iter()
        .map(|(outer, row)| {
            let row = row
                .into_iter()
                .map(|(inner, amount)| (inner, amount.to_string()))
                .collect();
            (outer, row)
        })
        .collect()
}
