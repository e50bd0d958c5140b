use axum::{
    Json, Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    project::{CreateProject, Project, UpdateProject},
    user::UserRole,
};
use deployment::Deployment;
use services::services::assistant::CallerContext;
use tracing::info;
use uuid::Uuid;
use utils::response::ApiResponse;

use super::{optional_text, required_text};
use crate::{
    DeploymentImpl,
    error::ApiError,
    middleware::{Caller, require_role},
};

const NAME_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 500;

/// Project by id, distinguishing "missing" from "another team's"
async fn load_project(
    deployment: &DeploymentImpl,
    caller: &CallerContext,
    project_id: Uuid,
) -> Result<Project, ApiError> {
    let project = Project::find_by_id(&deployment.db().pool, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;
    if project.team_id != caller.team_id {
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }
    Ok(project)
}

/// GET /api/projects
pub async fn get_projects(
    State(deployment): State<DeploymentImpl>,
    Caller(caller): Caller,
) -> Result<ResponseJson<ApiResponse<Vec<Project>>>, ApiError> {
    let projects = Project::find_by_team_id(&deployment.db().pool, caller.team_id).await?;
    Ok(ResponseJson(ApiResponse::success(projects)))
}

/// GET /api/projects/{project_id}
pub async fn get_project(
    State(deployment): State<DeploymentImpl>,
    Caller(caller): Caller,
    Path(project_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    let project = load_project(&deployment, &caller, project_id).await?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

/// POST /api/projects (admins and managers)
pub async fn create_project(
    State(deployment): State<DeploymentImpl>,
    Caller(caller): Caller,
    Json(payload): Json<CreateProject>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    require_role(&caller, &[UserRole::Admin, UserRole::Manager])?;
    let data = CreateProject {
        name: required_text(&payload.name, "name", NAME_MAX)?,
        description: optional_text(payload.description, "description", DESCRIPTION_MAX)?,
    };

    let project =
        Project::create(&deployment.db().pool, caller.team_id, &data, Uuid::new_v4()).await?;
    info!(project_id = %project.id, team_id = %caller.team_id, "Created project");
    Ok(ResponseJson(ApiResponse::success(project)))
}

/// PUT /api/projects/{project_id} (admins and managers)
pub async fn update_project(
    State(deployment): State<DeploymentImpl>,
    Caller(caller): Caller,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<UpdateProject>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    require_role(&caller, &[UserRole::Admin, UserRole::Manager])?;
    let existing = load_project(&deployment, &caller, project_id).await?;

    // An empty name keeps the current one
    let name = match payload.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => required_text(name, "name", NAME_MAX)?,
        _ => existing.name,
    };
    let description = match payload.description {
        Some(description) => optional_text(Some(description), "description", DESCRIPTION_MAX)?,
        None => existing.description,
    };

    let project = Project::update(
        &deployment.db().pool,
        project_id,
        &name,
        description.as_deref(),
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

/// DELETE /api/projects/{project_id} (admins only). Deletes the project's tasks too.
pub async fn delete_project(
    State(deployment): State<DeploymentImpl>,
    Caller(caller): Caller,
    Path(project_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    require_role(&caller, &[UserRole::Admin])?;
    load_project(&deployment, &caller, project_id).await?;

    Project::delete(&deployment.db().pool, project_id).await?;
    info!(%project_id, user_id = %caller.user_id, "Deleted project");
    Ok(ResponseJson(ApiResponse::success_with_message(
        (),
        "Project deleted successfully",
    )))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/projects",
        Router::new()
            .route("/", get(get_projects).post(create_project))
            .route(
                "/{project_id}",
                get(get_project).put(update_project).delete(delete_project),
            ),
    )
}
