//! User API endpoints

use api_types::user::{UserNew, UserView};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use engine::{CreateUserCmd, User};

use crate::{ServerError, server::ServerState};

/// Handle requests for registering a user
pub async fn user_new(
    State(state): State<ServerState>,
    payload: Result<Json<UserNew>, JsonRejection>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let Json(payload) = payload?;
    let mut cmd = CreateUserCmd::new(payload.name, payload.email);
    if let Some(user_id) = payload.user_id {
        cmd = cmd.user_id(user_id);
    }
    if let Some(mobile_number) = payload.mobile_number {
        cmd = cmd.mobile_number(mobile_number);
    }

    let user = state.engine.create_user(cmd).await?;
    Ok((StatusCode::CREATED, Json(user_view(user))))
}

/// Handle requests for listing users
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<UserView>>, ServerError> {
    let users = state.engine.list_users().await?;
    Ok(Json(users.into_iter().map(user_view).collect()))
}

fn user_view(user: User) -> UserView {
    UserView {
        user_id: user.user_id,
        name: user.name,
        email: user.email,
        mobile_number: user.mobile_number,
    }
}
