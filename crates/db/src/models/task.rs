use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use utils::text::contains_ignore_case;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "task_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Task {
    pub id: Uuid,
    pub project_id: Uuid, // Foreign key to Project
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assigned_to: Option<Uuid>, // Foreign key to User
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Task joined with the display fields clients render next to it
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct TaskWithAssignee {
    #[serde(flatten)]
    #[ts(flatten)]
    #[sqlx(flatten)]
    pub task: Task,
    pub assignee_name: Option<String>,
    pub assignee_email: Option<String>,
    pub project_name: String,
}

impl std::ops::Deref for TaskWithAssignee {
    type Target = Task;
    fn deref(&self) -> &Self::Target {
        &self.task
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateTask {
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<Uuid>,
}

/// Partial update. Absent fields keep their stored value; `assigned_to: null` unassigns.
#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[serde(default, deserialize_with = "present")]
    #[ts(optional)]
    pub assigned_to: Option<Option<Uuid>>,
}

/// Marks a field as present even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl CreateTask {
    pub fn from_title_description(
        project_id: Uuid,
        title: String,
        description: Option<String>,
    ) -> Self {
        Self {
            project_id,
            title,
            description,
            status: Some(TaskStatus::Todo),
            priority: Some(TaskPriority::Medium),
            assigned_to: None,
        }
    }
}

/// Row ordering for filtered task listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOrder {
    /// High priority first, then newest first
    PriorityThenNewest,
    NewestFirst,
    /// Insertion order
    Stored,
}

impl TaskOrder {
    fn sql(self) -> &'static str {
        match self {
            TaskOrder::PriorityThenNewest => {
                "CASE t.priority WHEN 'high' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END ASC, t.created_at DESC, t.rowid DESC"
            }
            TaskOrder::NewestFirst => "t.created_at DESC, t.rowid DESC",
            TaskOrder::Stored => "t.rowid ASC",
        }
    }
}

/// Filter for team-scoped task reads. The team scope is always applied.
#[derive(Debug, Clone)]
pub struct TaskFilter {
    pub team_id: Uuid,
    pub project_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    /// Case-insensitive substring matched against title or description
    pub search: Option<String>,
}

impl TaskFilter {
    pub fn for_team(team_id: Uuid) -> Self {
        Self {
            team_id,
            project_id: None,
            assigned_to: None,
            search: None,
        }
    }

    pub fn in_project(mut self, project_id: Option<Uuid>) -> Self {
        self.project_id = project_id;
        self
    }

    pub fn assigned_to(mut self, user_id: Option<Uuid>) -> Self {
        self.assigned_to = user_id;
        self
    }

    pub fn matching(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }
}

const TASK_WITH_ASSIGNEE_SELECT: &str = r#"SELECT t.id, t.project_id, t.title, t.description, t.status, t.priority, t.assigned_to, t.created_at, t.updated_at,
       u.name  AS assignee_name,
       u.email AS assignee_email,
       p.name  AS project_name
  FROM tasks t
  JOIN projects p ON p.id = t.project_id
  LEFT JOIN users u ON u.id = t.assigned_to"#;

impl Task {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"SELECT id, project_id, title, description, status, priority, assigned_to, created_at, updated_at
               FROM tasks
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_with_assignee(
        pool: &SqlitePool,
        id: Uuid,
    ) -> Result<Option<TaskWithAssignee>, sqlx::Error> {
        let sql = format!("{TASK_WITH_ASSIGNEE_SELECT}\n WHERE t.id = $1");
        sqlx::query_as::<_, TaskWithAssignee>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Team-scoped listing. `limit` of `None` returns every matching row.
    pub async fn find_filtered(
        pool: &SqlitePool,
        filter: &TaskFilter,
        order: TaskOrder,
        limit: Option<usize>,
    ) -> Result<Vec<TaskWithAssignee>, sqlx::Error> {
        let sql = format!(
            r#"{TASK_WITH_ASSIGNEE_SELECT}
 WHERE p.team_id = $1
   AND ($2 IS NULL OR t.project_id = $2)
   AND ($3 IS NULL OR t.assigned_to = $3)
 ORDER BY {}"#,
            order.sql()
        );
        let mut tasks = sqlx::query_as::<_, TaskWithAssignee>(&sql)
            .bind(filter.team_id)
            .bind(filter.project_id)
            .bind(filter.assigned_to)
            .fetch_all(pool)
            .await?;

        if let Some(term) = filter.search.as_deref() {
            tasks.retain(|t| {
                contains_ignore_case(&t.title, term)
                    || t
                        .description
                        .as_deref()
                        .is_some_and(|d| contains_ignore_case(d, term))
            });
        }
        if let Some(limit) = limit {
            tasks.truncate(limit);
        }
        Ok(tasks)
    }

    /// Single task, only if it belongs to one of the team's projects
    pub async fn find_for_team(
        pool: &SqlitePool,
        team_id: Uuid,
        id: Uuid,
    ) -> Result<Option<TaskWithAssignee>, sqlx::Error> {
        let sql = format!("{TASK_WITH_ASSIGNEE_SELECT}\n WHERE t.id = $1 AND p.team_id = $2");
        sqlx::query_as::<_, TaskWithAssignee>(&sql)
            .bind(id)
            .bind(team_id)
            .fetch_optional(pool)
            .await
    }

    /// Tasks in the team whose title contains `fragment` (case-insensitive), in insertion order
    pub async fn find_by_title_containing(
        pool: &SqlitePool,
        team_id: Uuid,
        fragment: &str,
        limit: usize,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"SELECT t.id, t.project_id, t.title, t.description, t.status, t.priority, t.assigned_to, t.created_at, t.updated_at
               FROM tasks t
               JOIN projects p ON p.id = t.project_id
               WHERE p.team_id = $1
               ORDER BY t.rowid ASC"#,
        )
        .bind(team_id)
        .fetch_all(pool)
        .await?;
        Ok(tasks
            .into_iter()
            .filter(|t| contains_ignore_case(&t.title, fragment))
            .take(limit)
            .collect())
    }

    /// First task in insertion order whose title contains `fragment`.
    /// Ties between several matches are not ranked.
    pub async fn find_first_by_title(
        pool: &SqlitePool,
        team_id: Uuid,
        fragment: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        Ok(Self::find_by_title_containing(pool, team_id, fragment, 1)
            .await?
            .into_iter()
            .next())
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateTask,
        task_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let status = data.status.unwrap_or_default();
        let priority = data.priority.unwrap_or_default();
        let now = Utc::now();
        sqlx::query_as::<_, Task>(
            r#"INSERT INTO tasks (id, project_id, title, description, status, priority, assigned_to, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
               RETURNING id, project_id, title, description, status, priority, assigned_to, created_at, updated_at"#,
        )
        .bind(task_id)
        .bind(data.project_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(status)
        .bind(priority)
        .bind(data.assigned_to)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        title: String,
        description: Option<String>,
        status: TaskStatus,
        priority: TaskPriority,
        assigned_to: Option<Uuid>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"UPDATE tasks
               SET title = $2, description = $3, status = $4, priority = $5, assigned_to = $6, updated_at = $7
               WHERE id = $1
               RETURNING id, project_id, title, description, status, priority, assigned_to, created_at, updated_at"#,
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(status)
        .bind(priority)
        .bind(assigned_to)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn update_status(
        pool: &SqlitePool,
        id: Uuid,
        status: TaskStatus,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"UPDATE tasks SET status = $2, updated_at = $3 WHERE id = $1
               RETURNING id, project_id, title, description, status, priority, assigned_to, created_at, updated_at"#,
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn update_priority(
        pool: &SqlitePool,
        id: Uuid,
        priority: TaskPriority,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"UPDATE tasks SET priority = $2, updated_at = $3 WHERE id = $1
               RETURNING id, project_id, title, description, status, priority, assigned_to, created_at, updated_at"#,
        )
        .bind(id)
        .bind(priority)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn update_assignee(
        pool: &SqlitePool,
        id: Uuid,
        assigned_to: Option<Uuid>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"UPDATE tasks SET assigned_to = $2, updated_at = $3 WHERE id = $1
               RETURNING id, project_id, title, description, status, priority, assigned_to, created_at, updated_at"#,
        )
        .bind(id)
        .bind(assigned_to)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_for_team(pool: &SqlitePool, team_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM tasks t
               JOIN projects p ON p.id = t.project_id
               WHERE p.team_id = $1"#,
        )
        .bind(team_id)
        .fetch_one(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(TaskStatus::InProgress.to_string(), "in-progress");
        assert_eq!(TaskStatus::from_str("done").unwrap(), TaskStatus::Done);
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
    }

    #[test]
    fn test_update_distinguishes_null_from_absent_assignee() {
        let update: UpdateTask = serde_json::from_str(r#"{"title": "Renamed"}"#).unwrap();
        assert_eq!(update.title.as_deref(), Some("Renamed"));
        assert_eq!(update.assigned_to, None);

        let update: UpdateTask = serde_json::from_str(r#"{"assigned_to": null}"#).unwrap();
        assert_eq!(update.assigned_to, Some(None));

        let id = Uuid::new_v4();
        let update: UpdateTask =
            serde_json::from_value(serde_json::json!({ "assigned_to": id })).unwrap();
        assert_eq!(update.assigned_to, Some(Some(id)));
    }
}
