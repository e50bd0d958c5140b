use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    notification::{CreateNotification, NotificationType},
    project::Project,
    task::{CreateTask, Task, TaskFilter, TaskOrder, TaskWithAssignee, UpdateTask},
    user::User,
};
use deployment::Deployment;
use serde::Deserialize;
use services::services::{assistant::CallerContext, events::TeamEventPayload};
use tracing::info;
use uuid::Uuid;
use utils::response::ApiResponse;

use super::{optional_text, required_text};
use crate::{DeploymentImpl, error::ApiError, middleware::Caller};

const TITLE_MAX: usize = 200;
const DESCRIPTION_MAX: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct TaskQuery {
    #[serde(default, alias = "projectId")]
    pub project_id: Option<Uuid>,
}

async fn load_task(
    deployment: &DeploymentImpl,
    caller: &CallerContext,
    task_id: Uuid,
) -> Result<TaskWithAssignee, ApiError> {
    Task::find_for_team(&deployment.db().pool, caller.team_id, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))
}

/// Assignees have to be on the caller's team
async fn check_assignee(
    deployment: &DeploymentImpl,
    caller: &CallerContext,
    assignee: Option<Uuid>,
) -> Result<(), ApiError> {
    let Some(user_id) = assignee else {
        return Ok(());
    };
    match User::find_in_team(&deployment.db().pool, caller.team_id, user_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::BadRequest(
            "Assignee is not a member of this team".to_string(),
        )),
    }
}

async fn notify_assignment(
    deployment: &DeploymentImpl,
    caller: &CallerContext,
    task: &Task,
    user_id: Uuid,
    title: &str,
) {
    deployment
        .notifications()
        .notify_user(
            caller.team_id,
            CreateNotification {
                user_id,
                notification_type: NotificationType::TaskAssigned,
                title: title.to_string(),
                message: format!("You have been assigned to task: {}", task.title),
                link: Some(format!("/tasks?taskId={}", task.id)),
                task_id: Some(task.id),
                project_id: Some(task.project_id),
            },
        )
        .await;
}

/// GET /api/tasks?project_id=
/// Team tasks, newest first. Members only see tasks assigned to them.
pub async fn get_tasks(
    State(deployment): State<DeploymentImpl>,
    Caller(caller): Caller,
    Query(query): Query<TaskQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<TaskWithAssignee>>>, ApiError> {
    if let Some(project_id) = query.project_id {
        Project::find_for_team(&deployment.db().pool, caller.team_id, project_id)
            .await?
            .ok_or_else(|| ApiError::Forbidden("Access denied".to_string()))?;
    }

    let filter = TaskFilter::for_team(caller.team_id)
        .in_project(query.project_id)
        .assigned_to(caller.visible_assignee());
    let tasks =
        Task::find_filtered(&deployment.db().pool, &filter, TaskOrder::NewestFirst, None).await?;
    Ok(ResponseJson(ApiResponse::success(tasks)))
}

/// GET /api/tasks/{task_id}
pub async fn get_task(
    State(deployment): State<DeploymentImpl>,
    Caller(caller): Caller,
    Path(task_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<TaskWithAssignee>>, ApiError> {
    let task = load_task(&deployment, &caller, task_id).await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

/// POST /api/tasks
pub async fn create_task(
    State(deployment): State<DeploymentImpl>,
    Caller(caller): Caller,
    Json(payload): Json<CreateTask>,
) -> Result<ResponseJson<ApiResponse<TaskWithAssignee>>, ApiError> {
    let pool = &deployment.db().pool;
    if Project::find_for_team(pool, caller.team_id, payload.project_id)
        .await?
        .is_none()
    {
        return Err(ApiError::Forbidden(
            "Access denied or project not found".to_string(),
        ));
    }
    check_assignee(&deployment, &caller, payload.assigned_to).await?;

    let data = CreateTask {
        title: required_text(&payload.title, "title", TITLE_MAX)?,
        description: optional_text(payload.description, "description", DESCRIPTION_MAX)?,
        ..payload
    };
    let task = Task::create(pool, &data, Uuid::new_v4()).await?;
    info!(task_id = %task.id, project_id = %task.project_id, user_id = %caller.user_id, "Created task");

    let detailed = load_task(&deployment, &caller, task.id).await?;
    deployment
        .events()
        .emit(caller.team_id, TeamEventPayload::TaskCreated(detailed.clone()));
    if let Some(assignee) = task.assigned_to {
        notify_assignment(&deployment, &caller, &task, assignee, "New Task Assigned").await;
    }

    Ok(ResponseJson(ApiResponse::success(detailed)))
}

/// PUT /api/tasks/{task_id}
/// Partial update; (re)assignment notifies the new assignee, unassignment the previous one.
pub async fn update_task(
    State(deployment): State<DeploymentImpl>,
    Caller(caller): Caller,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<UpdateTask>,
) -> Result<ResponseJson<ApiResponse<TaskWithAssignee>>, ApiError> {
    let existing = load_task(&deployment, &caller, task_id).await?.task;

    let title = match payload.title {
        Some(title) => required_text(&title, "title", TITLE_MAX)?,
        None => existing.title,
    };
    let description = match payload.description {
        Some(description) => optional_text(Some(description), "description", DESCRIPTION_MAX)?,
        None => existing.description,
    };
    let assigned_to = payload.assigned_to.unwrap_or(existing.assigned_to);
    check_assignee(&deployment, &caller, assigned_to).await?;

    let task = Task::update(
        &deployment.db().pool,
        task_id,
        title,
        description,
        payload.status.unwrap_or(existing.status),
        payload.priority.unwrap_or(existing.priority),
        assigned_to,
    )
    .await?;
    info!(%task_id, user_id = %caller.user_id, "Updated task");

    let detailed = load_task(&deployment, &caller, task_id).await?;
    deployment
        .events()
        .emit(caller.team_id, TeamEventPayload::TaskUpdated(detailed.clone()));

    match (existing.assigned_to, assigned_to) {
        (previous, Some(assignee)) if previous != Some(assignee) => {
            notify_assignment(&deployment, &caller, &task, assignee, "Task Assigned to You").await;
        }
        (Some(previous), None) => {
            deployment
                .notifications()
                .notify_user(
                    caller.team_id,
                    CreateNotification {
                        user_id: previous,
                        notification_type: NotificationType::TaskUpdated,
                        title: "Task Unassigned".to_string(),
                        message: format!("You have been unassigned from task: {}", task.title),
                        link: Some("/tasks".to_string()),
                        task_id: Some(task.id),
                        project_id: Some(task.project_id),
                    },
                )
                .await;
        }
        _ => {}
    }

    Ok(ResponseJson(ApiResponse::success(detailed)))
}

/// DELETE /api/tasks/{task_id} (admins and managers)
pub async fn delete_task(
    State(deployment): State<DeploymentImpl>,
    Caller(caller): Caller,
    Path(task_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    load_task(&deployment, &caller, task_id).await?;
    if caller.role.is_restricted() {
        return Err(ApiError::Forbidden(
            "Members are not allowed to delete tasks".to_string(),
        ));
    }

    Task::delete(&deployment.db().pool, task_id).await?;
    info!(%task_id, user_id = %caller.user_id, "Deleted task");
    deployment
        .events()
        .emit(caller.team_id, TeamEventPayload::TaskDeleted { task_id });

    Ok(ResponseJson(ApiResponse::success_with_message(
        (),
        "Task deleted successfully",
    )))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/tasks",
        Router::new()
            .route("/", get(get_tasks).post(create_task))
            .route(
                "/{task_id}",
                get(get_task).put(update_task).delete(delete_task),
            ),
    )
}
