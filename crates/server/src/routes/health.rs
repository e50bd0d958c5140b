use axum::response::Json as ResponseJson;
use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

pub async fn health_check() -> ResponseJson<HealthStatus> {
    ResponseJson(HealthStatus {
        status: "ok".to_string(),
        timestamp: Utc::now(),
    })
}
