use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use utils::text::contains_ignore_case;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    Manager,
    #[default]
    Member,
}

impl UserRole {
    /// Restricted roles only see tasks assigned to them and cannot delete tasks
    pub fn is_restricted(self) -> bool {
        self == UserRole::Member
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub team_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateUser {
    pub email: String,
    pub name: String,
    pub role: Option<UserRole>,
    pub team_id: Option<Uuid>,
}

impl User {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, email, name, role, team_id, created_at, updated_at
               FROM users
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Team members in insertion order
    pub async fn find_by_team_id(
        pool: &SqlitePool,
        team_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, email, name, role, team_id, created_at, updated_at
               FROM users
               WHERE team_id = $1
               ORDER BY rowid ASC
               LIMIT $2"#,
        )
        .bind(team_id)
        .bind(limit.unwrap_or(-1))
        .fetch_all(pool)
        .await
    }

    /// First team member (insertion order) whose name contains `fragment`, case-insensitive
    pub async fn find_first_in_team_by_name(
        pool: &SqlitePool,
        team_id: Uuid,
        fragment: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        Ok(Self::find_by_team_id(pool, team_id, None)
            .await?
            .into_iter()
            .find(|u| contains_ignore_case(&u.name, fragment)))
    }

    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, email, name, role, team_id, created_at, updated_at
               FROM users
               WHERE email = $1"#,
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await
    }

    /// Member lookup that only succeeds when the user belongs to `team_id`
    pub async fn find_in_team(
        pool: &SqlitePool,
        team_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, email, name, role, team_id, created_at, updated_at
               FROM users
               WHERE id = $1 AND team_id = $2"#,
        )
        .bind(id)
        .bind(team_id)
        .fetch_optional(pool)
        .await
    }

    /// Move the user into `team_id` with the given role
    pub async fn join_team(
        pool: &SqlitePool,
        id: Uuid,
        team_id: Uuid,
        role: UserRole,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"UPDATE users SET team_id = $2, role = $3, updated_at = $4 WHERE id = $1
               RETURNING id, email, name, role, team_id, created_at, updated_at"#,
        )
        .bind(id)
        .bind(team_id)
        .bind(role)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn update_role(
        pool: &SqlitePool,
        id: Uuid,
        role: UserRole,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"UPDATE users SET role = $2, updated_at = $3 WHERE id = $1
               RETURNING id, email, name, role, team_id, created_at, updated_at"#,
        )
        .bind(id)
        .bind(role)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    /// Detach the user from their team. Their tasks keep the assignment.
    pub async fn leave_team(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET team_id = NULL, updated_at = $2 WHERE id = $1")
                .bind(id)
                .bind(Utc::now())
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateUser,
        user_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let role = data.role.unwrap_or_default();
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (id, email, name, role, team_id, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $6)
               RETURNING id, email, name, role, team_id, created_at, updated_at"#,
        )
        .bind(user_id)
        .bind(data.email.trim().to_lowercase())
        .bind(data.name.trim())
        .bind(role)
        .bind(data.team_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }
}
