use axum::{Json, Router, extract::State, response::Json as ResponseJson, routing::post};
use deployment::Deployment;
use services::services::assistant::{CommandRequest, CommandResponse};
use tracing::debug;
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError, middleware::Caller};

/// POST /api/assistant/command
pub async fn process_command(
    State(deployment): State<DeploymentImpl>,
    Caller(caller): Caller,
    Json(payload): Json<CommandRequest>,
) -> Result<ResponseJson<ApiResponse<CommandResponse>>, ApiError> {
    let response = deployment.assistant().process(&caller, payload).await?;
    debug!(
        user_id = %caller.user_id,
        action = %response.action,
        "Processed assistant command"
    );
    Ok(ResponseJson(ApiResponse::success(response)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route("/assistant/command", post(process_command))
}
