//! Account bootstrap. Credentials are verified upstream, so registration only records
//! the user and gives them a team of their own.

use axum::{Json, Router, extract::State, response::Json as ResponseJson, routing::post};
use db::models::{
    team::Team,
    user::{CreateUser, User, UserRole},
};
use deployment::Deployment;
use serde::Deserialize;
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;
use utils::response::ApiResponse;

use super::required_text;
use crate::{DeploymentImpl, error::ApiError};

#[derive(Debug, Deserialize, TS)]
pub struct RegisterUser {
    pub email: String,
    pub name: String,
}

/// POST /api/auth/register
/// Returns the existing user for a known email; otherwise creates an admin with a new team.
pub async fn register(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<RegisterUser>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    let pool = &deployment.db().pool;
    let name = required_text(&payload.name, "name", 100)?;
    if let Some(user) = User::find_by_email(pool, &payload.email).await? {
        return Ok(ResponseJson(ApiResponse::success(user)));
    }
    if !payload.email.contains('@') {
        return Err(ApiError::BadRequest("A valid email is required".to_string()));
    }

    let team = Team::create(
        pool,
        Uuid::new_v4(),
        &format!("{name}'s Team"),
        Some("Default team"),
    )
    .await?;
    let data = CreateUser {
        email: payload.email,
        name,
        role: Some(UserRole::Admin),
        team_id: Some(team.id),
    };
    let user = User::create(pool, &data, Uuid::new_v4()).await?;
    Team::set_admin(pool, team.id, user.id).await?;
    info!(user_id = %user.id, team_id = %team.id, "Registered user with new team");

    Ok(ResponseJson(ApiResponse::success_with_message(
        user,
        "Registration successful",
    )))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route("/auth/register", post(register))
}
