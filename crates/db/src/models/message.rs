use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Message {
    pub id: Uuid,
    pub team_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Message with the sender's display fields
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct MessageWithSender {
    #[serde(flatten)]
    #[ts(flatten)]
    #[sqlx(flatten)]
    pub message: Message,
    pub sender_name: Option<String>,
    pub sender_email: Option<String>,
}

const MESSAGE_WITH_SENDER_SELECT: &str = r#"SELECT m.id, m.team_id, m.sender_id, m.content, m.created_at,
       u.name  AS sender_name,
       u.email AS sender_email
  FROM messages m
  LEFT JOIN users u ON u.id = m.sender_id"#;

impl Message {
    pub async fn create(
        pool: &SqlitePool,
        team_id: Uuid,
        sender_id: Uuid,
        content: &str,
    ) -> Result<MessageWithSender, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"INSERT INTO messages (id, team_id, sender_id, content, created_at)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(id)
        .bind(team_id)
        .bind(sender_id)
        .bind(content)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        let sql = format!("{MESSAGE_WITH_SENDER_SELECT}\n WHERE m.id = $1");
        sqlx::query_as::<_, MessageWithSender>(&sql)
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// The latest `limit` team messages sent before `before` (if given), oldest first.
    pub async fn find_recent_for_team(
        pool: &SqlitePool,
        team_id: Uuid,
        before: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<MessageWithSender>, sqlx::Error> {
        let sql = format!(
            r#"{MESSAGE_WITH_SENDER_SELECT}
 WHERE m.team_id = $1
   AND ($2 IS NULL OR m.created_at < $2)
 ORDER BY m.created_at DESC, m.rowid DESC
 LIMIT $3"#
        );
        let mut messages = sqlx::query_as::<_, MessageWithSender>(&sql)
            .bind(team_id)
            .bind(before)
            .bind(limit)
            .fetch_all(pool)
            .await?;
        messages.reverse();
        Ok(messages)
    }
}
