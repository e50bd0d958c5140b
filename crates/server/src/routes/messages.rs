use axum::{
    Json, Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use chrono::{DateTime, Utc};
use db::models::message::{Message, MessageWithSender};
use deployment::Deployment;
use serde::Deserialize;
use services::services::events::TeamEventPayload;
use ts_rs::TS;
use utils::response::ApiResponse;

use super::required_text;
use crate::{DeploymentImpl, error::ApiError, middleware::Caller};

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;
const CONTENT_MAX: usize = 2000;

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub limit: Option<i64>,
    /// Only messages sent strictly before this instant
    pub before: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, TS)]
pub struct SendMessage {
    pub content: String,
}

/// GET /api/messages?limit=&before=
/// Latest team messages, oldest first.
pub async fn get_messages(
    State(deployment): State<DeploymentImpl>,
    Caller(caller): Caller,
    Query(query): Query<MessageQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<MessageWithSender>>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let messages =
        Message::find_recent_for_team(&deployment.db().pool, caller.team_id, query.before, limit)
            .await?;
    Ok(ResponseJson(ApiResponse::success(messages)))
}

/// POST /api/messages
pub async fn send_message(
    State(deployment): State<DeploymentImpl>,
    Caller(caller): Caller,
    Json(payload): Json<SendMessage>,
) -> Result<ResponseJson<ApiResponse<MessageWithSender>>, ApiError> {
    let content = required_text(&payload.content, "content", CONTENT_MAX)?;
    let message =
        Message::create(&deployment.db().pool, caller.team_id, caller.user_id, &content).await?;
    tracing::debug!(message_id = %message.message.id, team_id = %caller.team_id, "Sent team message");

    deployment
        .events()
        .emit(caller.team_id, TeamEventPayload::MessageNew(message.clone()));
    Ok(ResponseJson(ApiResponse::success(message)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route("/messages", get(get_messages).post(send_message))
}
