//! Handlers that write a task row.

use db::models::{
    notification::{CreateNotification, NotificationType},
    project::Project,
    task::{CreateTask, Task, TaskFilter, TaskOrder, TaskStatus},
    user::User,
};
use tracing::info;
use uuid::Uuid;

use super::{
    AssistantError, AssistantService, CallerContext, CommandData, CommandResponse, Intent,
    TaskLookup,
    extract::{
        assign_task_fragment, assignee_fragment, delete_task_fragment, extract_task_fields,
        priority_task_fragment, status_task_fragment, target_priority, target_status,
    },
    format::{bullets, format_priority, format_status},
    task_not_found,
};
use crate::services::events::TeamEventPayload;

impl AssistantService {
    pub(super) async fn create_task(
        &self,
        caller: &CallerContext,
        input: &str,
        project_id: Option<Uuid>,
    ) -> Result<CommandResponse, AssistantError> {
        let action = Intent::CreateTask;
        let fields = extract_task_fields(input);
        let Some(title) = fields.title else {
            return Ok(CommandResponse::reply(
                action,
                "I'd love to create a task for you! Could you tell me what to call it?\n\n\
                 **Try something like:**\n\
                 • \"Create a task called Review PR #42\"\n\
                 • \"Add new task 'Update documentation' with high priority\"",
            )
            .with_suggestions(["Create task \"Example task\"", "Add new urgent task"]));
        };

        let project = match project_id {
            Some(id) => match Project::find_for_team(&self.pool, caller.team_id, id).await? {
                Some(project) => project,
                None => {
                    return Ok(CommandResponse::reply(
                        action,
                        "I couldn't find that project in your team. Pick one of your projects and try again.",
                    )
                    .with_suggestions(["List projects"]));
                }
            },
            None => match Project::find_latest_for_team(&self.pool, caller.team_id).await? {
                Some(project) => project,
                None => {
                    return Ok(CommandResponse::reply(
                        action,
                        "I noticed you don't have any projects yet. Let's create one first, or you can specify which project this task belongs to.",
                    )
                    .with_suggestions(["List projects"]));
                }
            },
        };

        let data = CreateTask {
            project_id: project.id,
            title: title.clone(),
            description: fields.description,
            status: Some(fields.status),
            priority: Some(fields.priority),
            assigned_to: None,
        };
        let task = Task::create(&self.pool, &data, Uuid::new_v4()).await?;
        info!(task_id = %task.id, project_id = %project.id, user_id = %caller.user_id, "Assistant created task");

        let detailed = self.load_detailed(task.id).await?;
        self.events
            .emit(caller.team_id, TeamEventPayload::TaskCreated(detailed.clone()));

        let response = format!(
            "Great! I've created the task **\"{title}\"** in {}.\n\n\
             • **Status:** {}\n\
             • **Priority:** {}\n\n\
             Would you like to assign it to someone?",
            project.name,
            format_status(task.status),
            format_priority(task.priority),
        );
        Ok(CommandResponse::reply(action, response)
            .with_data(CommandData::Task(detailed))
            .with_suggestions([
                format!("Assign \"{title}\" to"),
                "Create another task".to_string(),
                "Show all tasks".to_string(),
            ]))
    }

    pub(super) async fn assign_task(
        &self,
        caller: &CallerContext,
        input: &str,
    ) -> Result<CommandResponse, AssistantError> {
        let action = Intent::AssignTask;
        let (Some(fragment), Some(assignee)) = (assign_task_fragment(input), assignee_fragment(input))
        else {
            let recent = Task::find_filtered(
                &self.pool,
                &TaskFilter::for_team(caller.team_id),
                TaskOrder::Stored,
                Some(3),
            )
            .await?;
            return Ok(CommandResponse::reply(
                action,
                "I can help you assign a task! Just tell me which task and who should work on it.\n\n\
                 **Example:**\n\
                 • \"Assign task 'Fix login bug' to Sarah\"\n\
                 • \"Give the API integration task to John\"",
            )
            .with_suggestions(recent.iter().map(|t| format!("Assign \"{}\" to", t.title))));
        };

        let task = match self.resolve_task(caller.team_id, &fragment).await? {
            TaskLookup::Found(task) => task,
            TaskLookup::Missing { similar } => {
                return Ok(task_not_found(action, &fragment, &similar, |t| {
                    format!("Assign \"{}\" to {assignee}", t.title)
                }));
            }
        };

        let Some(user) =
            User::find_first_in_team_by_name(&self.pool, caller.team_id, &assignee).await?
        else {
            let members = User::find_by_team_id(&self.pool, caller.team_id, Some(5)).await?;
            let mut response = format!("I couldn't find anyone named \"{assignee}\" on your team.");
            if !members.is_empty() {
                response.push_str("\n\n**Team members:**\n");
                response.push_str(&bullets(members.iter().map(|m| m.name.as_str())));
            }
            return Ok(CommandResponse::reply(action, response).with_suggestions(
                members
                    .iter()
                    .map(|m| format!("Assign \"{}\" to {}", task.title, m.name)),
            ));
        };

        let task = Task::update_assignee(&self.pool, task.id, Some(user.id)).await?;
        info!(task_id = %task.id, assignee = %user.id, user_id = %caller.user_id, "Assistant assigned task");

        let detailed = self.load_detailed(task.id).await?;
        self.events
            .emit(caller.team_id, TeamEventPayload::TaskUpdated(detailed.clone()));
        self.notifications
            .notify_user(
                caller.team_id,
                CreateNotification {
                    user_id: user.id,
                    notification_type: NotificationType::TaskAssigned,
                    title: "Task Assigned to You".to_string(),
                    message: format!("You have been assigned to task: {}", task.title),
                    link: Some(format!("/tasks?taskId={}", task.id)),
                    task_id: Some(task.id),
                    project_id: Some(task.project_id),
                },
            )
            .await;

        let response = format!(
            "Done! I've assigned **\"{}\"** to **{}**. They'll be able to see it in their task list now.",
            task.title, user.name
        );
        Ok(CommandResponse::reply(action, response)
            .with_data(CommandData::Task(detailed))
            .with_suggestions([
                "Show all tasks".to_string(),
                format!("Move \"{}\" to in-progress", task.title),
            ]))
    }

    pub(super) async fn update_status(
        &self,
        caller: &CallerContext,
        input: &str,
    ) -> Result<CommandResponse, AssistantError> {
        let action = Intent::UpdateStatus;
        let new_status = target_status(input);

        let Some(fragment) = status_task_fragment(input) else {
            let recent = Task::find_filtered(
                &self.pool,
                &TaskFilter::for_team(caller.team_id),
                TaskOrder::Stored,
                Some(3),
            )
            .await?;
            return Ok(CommandResponse::reply(
                action,
                "Which task would you like to update?\n\n\
                 **Try:**\n\
                 • \"Move 'Design review' to done\"\n\
                 • \"Mark task 'API setup' as in-progress\"",
            )
            .with_suggestions(recent.iter().map(|t| {
                let next = match t.status {
                    TaskStatus::Done => TaskStatus::Todo,
                    _ => TaskStatus::Done,
                };
                format!("Move \"{}\" to {next}", t.title)
            })));
        };

        let task = match self.resolve_task(caller.team_id, &fragment).await? {
            TaskLookup::Found(task) => task,
            TaskLookup::Missing { similar } => {
                return Ok(task_not_found(action, &fragment, &similar, |t| {
                    format!("Move \"{}\" to {new_status}", t.title)
                }));
            }
        };

        // Repeating a command still writes and broadcasts.
        let old_status = task.status;
        let task = Task::update_status(&self.pool, task.id, new_status).await?;
        info!(task_id = %task.id, from = %old_status, to = %new_status, "Assistant updated task status");

        let detailed = self.load_detailed(task.id).await?;
        self.events
            .emit(caller.team_id, TeamEventPayload::TaskUpdated(detailed.clone()));

        let cheer = match new_status {
            TaskStatus::Done => " 🎉 Great job!",
            TaskStatus::InProgress => " Let's get it done!",
            TaskStatus::Todo => "",
        };
        let response = format!(
            "Updated **\"{}\"** from {} → {}.{cheer}",
            task.title,
            format_status(old_status),
            format_status(new_status),
        );
        Ok(CommandResponse::reply(action, response).with_data(CommandData::Task(detailed)))
    }

    pub(super) async fn update_priority(
        &self,
        caller: &CallerContext,
        input: &str,
    ) -> Result<CommandResponse, AssistantError> {
        let action = Intent::UpdatePriority;
        let new_priority = target_priority(input);

        let Some(fragment) = priority_task_fragment(input) else {
            return Ok(CommandResponse::reply(
                action,
                "Which task's priority would you like to change?\n\n\
                 **Example:** \"Set 'Bug fix' priority to high\"",
            ));
        };

        let task = match self.resolve_task(caller.team_id, &fragment).await? {
            TaskLookup::Found(task) => task,
            TaskLookup::Missing { similar } => {
                return Ok(task_not_found(action, &fragment, &similar, |t| {
                    format!("Set \"{}\" priority to {new_priority}", t.title)
                }));
            }
        };

        let old_priority = task.priority;
        let task = Task::update_priority(&self.pool, task.id, new_priority).await?;
        info!(task_id = %task.id, from = %old_priority, to = %new_priority, "Assistant updated task priority");

        let detailed = self.load_detailed(task.id).await?;
        self.events
            .emit(caller.team_id, TeamEventPayload::TaskUpdated(detailed.clone()));

        let response = format!(
            "Updated **\"{}\"** priority: {} → {}",
            task.title,
            format_priority(old_priority),
            format_priority(new_priority),
        );
        Ok(CommandResponse::reply(action, response).with_data(CommandData::Task(detailed)))
    }

    pub(super) async fn delete_task(
        &self,
        caller: &CallerContext,
        input: &str,
    ) -> Result<CommandResponse, AssistantError> {
        let action = Intent::DeleteTask;
        if caller.role.is_restricted() {
            return Ok(CommandResponse::reply(
                action,
                "Only admins and managers can delete tasks. Ask one of them to remove it for you.",
            )
            .with_suggestions(["Show my tasks"]));
        }

        let Some(fragment) = delete_task_fragment(input) else {
            return Ok(CommandResponse::reply(
                action,
                "Which task would you like to delete?\n\n**Example:** \"Delete task 'Old feature'\"",
            ));
        };

        let task = match self.resolve_task(caller.team_id, &fragment).await? {
            TaskLookup::Found(task) => task,
            TaskLookup::Missing { similar } => {
                return Ok(task_not_found(action, &fragment, &similar, |t| {
                    format!("Delete task \"{}\"", t.title)
                }));
            }
        };

        Task::delete(&self.pool, task.id).await?;
        info!(task_id = %task.id, user_id = %caller.user_id, "Assistant deleted task");
        self.events
            .emit(caller.team_id, TeamEventPayload::TaskDeleted { task_id: task.id });

        Ok(CommandResponse::reply(
            action,
            format!("Deleted task **\"{}\"**. It's gone for good!", task.title),
        )
        .with_data(CommandData::Deleted { task_id: task.id }))
    }
}
