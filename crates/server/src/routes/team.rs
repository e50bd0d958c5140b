use axum::{
    Json, Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::{
    team::Team,
    user::{CreateUser, User, UserRole},
};
use deployment::Deployment;
use serde::Deserialize;
use services::services::events::TeamEventPayload;
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;
use utils::response::ApiResponse;

use super::{optional_text, required_text};
use crate::{
    DeploymentImpl,
    error::ApiError,
    middleware::{Caller, require_role},
};

#[derive(Debug, Deserialize, TS)]
pub struct UpdateTeam {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
pub struct AddMember {
    pub email: String,
    pub name: Option<String>,
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize, TS)]
pub struct UpdateMember {
    pub role: UserRole,
}

fn valid_email(email: &str) -> Result<String, ApiError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(ApiError::BadRequest("A valid email is required".to_string())),
    }
}

/// GET /api/team
pub async fn get_team(
    State(deployment): State<DeploymentImpl>,
    Caller(caller): Caller,
) -> Result<ResponseJson<ApiResponse<Team>>, ApiError> {
    let team = Team::find_by_id(&deployment.db().pool, caller.team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(team)))
}

/// PUT /api/team (admins only)
pub async fn update_team(
    State(deployment): State<DeploymentImpl>,
    Caller(caller): Caller,
    Json(payload): Json<UpdateTeam>,
) -> Result<ResponseJson<ApiResponse<Team>>, ApiError> {
    require_role(&caller, &[UserRole::Admin])?;
    let pool = &deployment.db().pool;
    let team = Team::find_by_id(pool, caller.team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;

    let name = match payload.name {
        Some(name) => required_text(&name, "name", 100)?,
        None => team.name,
    };
    let description = match payload.description {
        Some(description) => optional_text(Some(description), "description", 500)?,
        None => team.description,
    };
    let team = Team::update(pool, caller.team_id, &name, description.as_deref()).await?;
    Ok(ResponseJson(ApiResponse::success(team)))
}

/// GET /api/team/members
pub async fn get_members(
    State(deployment): State<DeploymentImpl>,
    Caller(caller): Caller,
) -> Result<ResponseJson<ApiResponse<Vec<User>>>, ApiError> {
    let members = User::find_by_team_id(&deployment.db().pool, caller.team_id, None).await?;
    Ok(ResponseJson(ApiResponse::success(members)))
}

/// POST /api/team/members (admins and managers)
/// Adds an existing team-less user, or creates the user when the email is new.
pub async fn add_member(
    State(deployment): State<DeploymentImpl>,
    Caller(caller): Caller,
    Json(payload): Json<AddMember>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    require_role(&caller, &[UserRole::Admin, UserRole::Manager])?;
    let pool = &deployment.db().pool;
    let email = valid_email(&payload.email)?;
    let role = payload.role.unwrap_or_default();

    let member = match User::find_by_email(pool, &email).await? {
        Some(user) if user.team_id == Some(caller.team_id) => {
            return Err(ApiError::BadRequest(
                "User is already a member of this team".to_string(),
            ));
        }
        Some(user) if user.team_id.is_some() => {
            return Err(ApiError::BadRequest(
                "User already belongs to another team".to_string(),
            ));
        }
        Some(user) => User::join_team(pool, user.id, caller.team_id, role).await?,
        None => {
            let name = match payload.name.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => email.split('@').next().unwrap_or_default().to_string(),
            };
            let data = CreateUser {
                email,
                name,
                role: Some(role),
                team_id: Some(caller.team_id),
            };
            User::create(pool, &data, Uuid::new_v4()).await?
        }
    };
    info!(member_id = %member.id, team_id = %caller.team_id, role = %member.role, "Added team member");

    deployment
        .events()
        .emit(caller.team_id, TeamEventPayload::MemberAdded(member.clone()));
    Ok(ResponseJson(ApiResponse::success_with_message(
        member,
        "Member added to team",
    )))
}

/// PUT /api/team/members/{member_id} (admins only)
pub async fn update_member(
    State(deployment): State<DeploymentImpl>,
    Caller(caller): Caller,
    Path(member_id): Path<Uuid>,
    Json(payload): Json<UpdateMember>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    require_role(&caller, &[UserRole::Admin])?;
    let pool = &deployment.db().pool;
    User::find_in_team(pool, caller.team_id, member_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let member = User::update_role(pool, member_id, payload.role).await?;
    deployment
        .events()
        .emit(caller.team_id, TeamEventPayload::MemberUpdated(member.clone()));
    Ok(ResponseJson(ApiResponse::success(member)))
}

/// DELETE /api/team/members/{member_id} (admins only)
pub async fn remove_member(
    State(deployment): State<DeploymentImpl>,
    Caller(caller): Caller,
    Path(member_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    require_role(&caller, &[UserRole::Admin])?;
    let pool = &deployment.db().pool;
    User::find_in_team(pool, caller.team_id, member_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if member_id == caller.user_id {
        return Err(ApiError::BadRequest(
            "Cannot remove yourself from the team".to_string(),
        ));
    }
    let team = Team::find_by_id(pool, caller.team_id).await?;
    if team.and_then(|t| t.admin_id) == Some(member_id) {
        return Err(ApiError::BadRequest("Cannot remove team admin".to_string()));
    }

    User::leave_team(pool, member_id).await?;
    info!(%member_id, team_id = %caller.team_id, "Removed team member");
    deployment
        .events()
        .emit(caller.team_id, TeamEventPayload::MemberRemoved { member_id });
    Ok(ResponseJson(ApiResponse::success_with_message(
        (),
        "Member removed from team",
    )))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/team",
        Router::new()
            .route("/", get(get_team).put(update_team))
            .route("/members", get(get_members).post(add_member))
            .route(
                "/members/{member_id}",
                put(update_member).delete(remove_member),
            ),
    )
}
