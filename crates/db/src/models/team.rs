use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub admin_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Team {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Team>(
            r#"SELECT id, name, description, admin_id, created_at, updated_at
               FROM teams
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        team_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Team>(
            r#"INSERT INTO teams (id, name, description, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $4)
               RETURNING id, name, description, admin_id, created_at, updated_at"#,
        )
        .bind(team_id)
        .bind(name)
        .bind(description)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Team>(
            r#"UPDATE teams SET name = $2, description = $3, updated_at = $4 WHERE id = $1
               RETURNING id, name, description, admin_id, created_at, updated_at"#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn set_admin(pool: &SqlitePool, id: Uuid, admin_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE teams SET admin_id = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(admin_id)
            .bind(Utc::now())
            .execute(pool)
            .await?;
        Ok(())
    }
}
