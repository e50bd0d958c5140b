use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationType {
    TaskAssigned,
    TaskUpdated,
    Message,
    TeamInvite,
    ProjectCreated,
    Mention,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub link: Option<String>,
    pub task_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateNotification {
    pub user_id: Uuid,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub task_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
}

/// Latest notifications plus the caller's unread count
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct NotificationFeed {
    pub notifications: Vec<Notification>,
    pub unread_count: i64,
}

impl Notification {
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateNotification,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"INSERT INTO notifications (id, user_id, notification_type, title, message, link, task_id, project_id, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING id, user_id, notification_type, title, message, is_read, link, task_id, project_id, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(data.notification_type)
        .bind(&data.title)
        .bind(&data.message)
        .bind(&data.link)
        .bind(data.task_id)
        .bind(data.project_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_user_id(
        pool: &SqlitePool,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"SELECT id, user_id, notification_type, title, message, is_read, link, task_id, project_id, created_at
               FROM notifications
               WHERE user_id = $1
               ORDER BY created_at DESC, rowid DESC
               LIMIT $2"#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn count_unread(pool: &SqlitePool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = 0",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Mark one notification read. Only the owner's rows are touched.
    pub async fn mark_read(pool: &SqlitePool, id: Uuid, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }

    pub async fn mark_all_read(pool: &SqlitePool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = $1 AND is_read = 0")
                .bind(user_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }
}
