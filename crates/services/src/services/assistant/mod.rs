//! Rule-based assistant that turns short commands into task operations.
//!
//! A command is classified into an [`Intent`], the relevant fields are pulled out of the
//! text, and at most one task mutation is performed before the change is broadcast to
//! the caller's team. Every path produces a reply with follow-up suggestions; only store
//! failures surface as errors.

pub mod conversation;
pub mod extract;
pub mod format;
pub mod intent;
mod queries;
mod tasks;

use chrono::{Local, Timelike};
use db::models::{
    project::Project,
    task::{Task, TaskWithAssignee},
    user::{User, UserRole},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;
use ts_rs::TS;
use uuid::Uuid;

pub use self::intent::{Intent, classify};
use self::format::DayPeriod;
use super::{config::AssistantConfig, events::EventService, notification::NotificationService};

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Who is issuing the command. Built by the request layer after authentication.
#[derive(Debug, Clone)]
pub struct CallerContext {
    pub user_id: Uuid,
    pub name: String,
    pub role: UserRole,
    pub team_id: Uuid,
}

impl CallerContext {
    /// `None` when the user hasn't joined a team yet.
    pub fn from_user(user: &User) -> Option<Self> {
        let team_id = user.team_id?;
        let name = match user.name.trim() {
            "" => "there".to_string(),
            name => name.to_string(),
        };
        Some(Self {
            user_id: user.id,
            name,
            role: user.role,
            team_id,
        })
    }

    /// Assignee filter for task reads; restricted roles only see their own work.
    pub fn visible_assignee(&self) -> Option<Uuid> {
        self.role.is_restricted().then_some(self.user_id)
    }
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CommandRequest {
    pub message: String,
    #[serde(default, alias = "projectId")]
    pub project_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct MemberSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<User> for MemberSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct ProjectOverview {
    pub total: i64,
    pub todo_count: i64,
    pub in_progress_count: i64,
    pub done_count: i64,
    /// Rounded percentage of done tasks
    pub completion_rate: i64,
    pub high_priority_tasks: Vec<TaskWithAssignee>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[serde(untagged)]
pub enum CommandData {
    Task(TaskWithAssignee),
    Tasks(Vec<TaskWithAssignee>),
    Projects(Vec<Project>),
    Members(Vec<MemberSummary>),
    Overview(ProjectOverview),
    Deleted { task_id: Uuid },
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct CommandResponse {
    pub action: Intent,
    pub response: String,
    pub data: Option<CommandData>,
    pub suggestions: Vec<String>,
}

impl CommandResponse {
    pub fn reply(action: Intent, response: impl Into<String>) -> Self {
        Self {
            action,
            response: response.into(),
            data: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_data(mut self, data: CommandData) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions = suggestions.into_iter().map(Into::into).collect();
        self
    }
}

/// Outcome of resolving a task name fragment against the caller's team
pub(crate) enum TaskLookup {
    Found(Task),
    /// Up to three tasks sharing the fragment's first word
    Missing { similar: Vec<Task> },
}

#[derive(Clone)]
pub struct AssistantService {
    pool: SqlitePool,
    events: EventService,
    notifications: NotificationService,
    config: AssistantConfig,
}

impl AssistantService {
    pub fn new(
        pool: SqlitePool,
        events: EventService,
        notifications: NotificationService,
        config: AssistantConfig,
    ) -> Self {
        Self {
            pool,
            events,
            notifications,
            config,
        }
    }

    pub async fn process(
        &self,
        caller: &CallerContext,
        request: CommandRequest,
    ) -> Result<CommandResponse, AssistantError> {
        let intent = classify(&request.message);
        debug!(user_id = %caller.user_id, %intent, "Classified assistant command");

        let input = request.message.as_str();
        match intent {
            Intent::CreateTask => self.create_task(caller, input, request.project_id).await,
            Intent::AssignTask => self.assign_task(caller, input).await,
            Intent::UpdateStatus => self.update_status(caller, input).await,
            Intent::UpdatePriority => self.update_priority(caller, input).await,
            Intent::DeleteTask => self.delete_task(caller, input).await,
            Intent::MyTasks => self.my_tasks(caller).await,
            Intent::ListTasks => self.list_tasks(caller, request.project_id).await,
            Intent::ListProjects => self.list_projects(caller).await,
            Intent::ListMembers => self.list_members(caller).await,
            Intent::ProjectStatus => self.project_status(caller).await,
            Intent::SearchTasks => self.search_tasks(caller, input).await,
            Intent::Greeting | Intent::Thanks | Intent::Help | Intent::Unknown => {
                Ok(converse(intent, caller))
            }
        }
    }

    async fn resolve_task(&self, team_id: Uuid, fragment: &str) -> Result<TaskLookup, sqlx::Error> {
        if let Some(task) = Task::find_first_by_title(&self.pool, team_id, fragment).await? {
            return Ok(TaskLookup::Found(task));
        }
        let similar = match utils::text::first_word(fragment) {
            Some(word) => Task::find_by_title_containing(&self.pool, team_id, word, 3).await?,
            None => Vec::new(),
        };
        Ok(TaskLookup::Missing { similar })
    }

    async fn load_detailed(&self, task_id: Uuid) -> Result<TaskWithAssignee, sqlx::Error> {
        Task::find_with_assignee(&self.pool, task_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }
}

/// Replies that need no store access. Anything that isn't a greeting, thanks or a
/// help request gets the fallback reply.
fn converse(intent: Intent, caller: &CallerContext) -> CommandResponse {
    let mut rng = rand::thread_rng();
    let name = caller.name.as_str();
    match intent {
        Intent::Greeting => {
            let period = DayPeriod::from_hour(Local::now().hour());
            CommandResponse::reply(intent, conversation::greeting(name, period, &mut rng))
                .with_suggestions(["Show my tasks", "Create a new task", "Project overview"])
        }
        Intent::Thanks => CommandResponse::reply(intent, conversation::thanks(name, &mut rng)),
        Intent::Help => CommandResponse::reply(intent, conversation::help(name))
            .with_suggestions(["Show my tasks", "Create a task", "Project overview"]),
        _ => CommandResponse::reply(Intent::Unknown, conversation::unknown(name, &mut rng))
            .with_suggestions(["Help", "Show my tasks", "Project overview"]),
    }
}

/// Reply for a fragment that matched no task, listing close matches when there are any.
fn task_not_found(
    action: Intent,
    fragment: &str,
    similar: &[Task],
    suggest: impl Fn(&Task) -> String,
) -> CommandResponse {
    let mut response = format!("I couldn't find a task matching \"{fragment}\".");
    if similar.is_empty() {
        return CommandResponse::reply(action, response).with_suggestions(["Show all tasks"]);
    }
    response.push_str("\n\n**Did you mean one of these?**\n");
    response.push_str(&format::bullets(similar.iter().map(|t| t.title.as_str())));
    CommandResponse::reply(action, response).with_suggestions(similar.iter().map(suggest))
}
