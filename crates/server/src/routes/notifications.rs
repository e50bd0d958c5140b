use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::notification::NotificationFeed;
use deployment::Deployment;
use uuid::Uuid;
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError, middleware::Caller};

/// GET /api/notifications
pub async fn get_notifications(
    State(deployment): State<DeploymentImpl>,
    Caller(caller): Caller,
) -> Result<ResponseJson<ApiResponse<NotificationFeed>>, ApiError> {
    let feed = deployment.notifications().feed(caller.user_id).await?;
    Ok(ResponseJson(ApiResponse::success(feed)))
}

/// PUT /api/notifications/read-all
pub async fn mark_all_read(
    State(deployment): State<DeploymentImpl>,
    Caller(caller): Caller,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let updated = deployment
        .notifications()
        .mark_all_read(caller.user_id)
        .await?;
    tracing::debug!(user_id = %caller.user_id, updated, "Marked notifications read");
    Ok(ResponseJson(ApiResponse::success_with_message(
        (),
        "All notifications marked as read",
    )))
}

/// PUT /api/notifications/{notification_id}/read
pub async fn mark_read(
    State(deployment): State<DeploymentImpl>,
    Caller(caller): Caller,
    Path(notification_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let found = deployment
        .notifications()
        .mark_read(notification_id, caller.user_id)
        .await?;
    if !found {
        return Err(ApiError::NotFound("Notification not found".to_string()));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/notifications",
        Router::new()
            .route("/", get(get_notifications))
            .route("/read-all", put(mark_all_read))
            .route("/{notification_id}/read", put(mark_read)),
    )
}
