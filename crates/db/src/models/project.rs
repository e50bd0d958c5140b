use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Project {
    pub id: Uuid,
    pub team_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Project {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"SELECT id, team_id, name, description, created_at, updated_at
               FROM projects
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Project lookup that only succeeds when the project belongs to `team_id`
    pub async fn find_for_team(
        pool: &SqlitePool,
        team_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"SELECT id, team_id, name, description, created_at, updated_at
               FROM projects
               WHERE id = $1 AND team_id = $2"#,
        )
        .bind(id)
        .bind(team_id)
        .fetch_optional(pool)
        .await
    }

    /// All team projects, newest first
    pub async fn find_by_team_id(
        pool: &SqlitePool,
        team_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"SELECT id, team_id, name, description, created_at, updated_at
               FROM projects
               WHERE team_id = $1
               ORDER BY created_at DESC, rowid DESC"#,
        )
        .bind(team_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_latest_for_team(
        pool: &SqlitePool,
        team_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"SELECT id, team_id, name, description, created_at, updated_at
               FROM projects
               WHERE team_id = $1
               ORDER BY created_at DESC, rowid DESC
               LIMIT 1"#,
        )
        .bind(team_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        team_id: Uuid,
        data: &CreateProject,
        project_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"INSERT INTO projects (id, team_id, name, description, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $5)
               RETURNING id, team_id, name, description, created_at, updated_at"#,
        )
        .bind(project_id)
        .bind(team_id)
        .bind(&data.name)
        .bind(&data.description)
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
        sqlx::query_as::<_, Project>(
            r#"UPDATE projects SET name = $2, description = $3, updated_at = $4 WHERE id = $1
               RETURNING id, team_id, name, description, created_at, updated_at"#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    /// Removes the project; its tasks go with it through the foreign key cascade.
    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
