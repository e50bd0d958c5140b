//! Read-only handlers. All reads are scoped to the caller's team.

use db::models::{
    project::Project,
    task::{Task, TaskFilter, TaskOrder, TaskPriority, TaskStatus, TaskWithAssignee},
    user::User,
};
use uuid::Uuid;

use super::{
    AssistantError, AssistantService, CallerContext, CommandData, CommandResponse, Intent,
    MemberSummary, ProjectOverview,
    extract::search_term,
    format::{bullets, format_status},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct StatusCounts {
    todo: i64,
    in_progress: i64,
    done: i64,
}

impl StatusCounts {
    fn tally<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut counts = Self::default();
        for task in tasks {
            match task.status {
                TaskStatus::Todo => counts.todo += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Done => counts.done += 1,
            }
        }
        counts
    }

    fn total(self) -> i64 {
        self.todo + self.in_progress + self.done
    }

    /// Rounded percentage of done tasks, 0 when there are none
    fn completion_rate(self) -> i64 {
        match self.total() {
            0 => 0,
            total => ((self.done as f64 / total as f64) * 100.0).round() as i64,
        }
    }
}

fn in_status(tasks: &[TaskWithAssignee], status: TaskStatus) -> Vec<&TaskWithAssignee> {
    tasks.iter().filter(|t| t.status == status).collect()
}

fn with_assignee(task: &TaskWithAssignee) -> String {
    match &task.assignee_name {
        Some(name) => format!("{} _({name})_", task.title),
        None => task.title.clone(),
    }
}

impl AssistantService {
    pub(super) async fn my_tasks(
        &self,
        caller: &CallerContext,
    ) -> Result<CommandResponse, AssistantError> {
        let action = Intent::MyTasks;
        let filter = TaskFilter::for_team(caller.team_id).assigned_to(Some(caller.user_id));
        let tasks =
            Task::find_filtered(&self.pool, &filter, TaskOrder::PriorityThenNewest, None).await?;

        if tasks.is_empty() {
            return Ok(CommandResponse::reply(
                action,
                format!(
                    "You don't have any tasks assigned to you yet, {}. Time to relax... or pick up some work!",
                    caller.name
                ),
            )
            .with_data(CommandData::Tasks(tasks))
            .with_suggestions(["Show all tasks", "Create a task"]));
        }

        let counts = StatusCounts::tally(tasks.iter().map(|t| &t.task));
        let page = self.config.my_tasks_page_size;
        let lines = bullets(tasks.iter().take(page).map(|t| {
            let flag = if t.priority == TaskPriority::High { " 🔴" } else { "" };
            format!("**{}** - {}{flag}", t.title, format_status(t.status))
        }));

        let mut response = format!(
            "Here are your {} task(s), {}:\n\n📊 **Overview:** {} to do, {} in progress, {} done\n\n{lines}",
            tasks.len(),
            caller.name,
            counts.todo,
            counts.in_progress,
            counts.done,
        );
        if tasks.len() > page {
            response.push_str(&format!("\n\n_...and {} more tasks_", tasks.len() - page));
        }

        Ok(CommandResponse::reply(action, response).with_data(CommandData::Tasks(tasks)))
    }

    pub(super) async fn list_tasks(
        &self,
        caller: &CallerContext,
        project_id: Option<Uuid>,
    ) -> Result<CommandResponse, AssistantError> {
        let action = Intent::ListTasks;
        let filter = TaskFilter::for_team(caller.team_id)
            .in_project(project_id)
            .assigned_to(caller.visible_assignee());
        let mut tasks =
            Task::find_filtered(&self.pool, &filter, TaskOrder::PriorityThenNewest, None).await?;

        if tasks.is_empty() {
            return Ok(CommandResponse::reply(
                action,
                "No tasks found. Ready to create the first one?",
            )
            .with_data(CommandData::Tasks(tasks))
            .with_suggestions(["Create a task"]));
        }

        let total = tasks.len();
        tasks.truncate(self.config.page_size);

        let mut sections = Vec::new();
        let in_progress = in_status(&tasks, TaskStatus::InProgress);
        if !in_progress.is_empty() {
            sections.push(format!(
                "**🔄 In Progress:**\n{}",
                bullets(in_progress.iter().map(|t| with_assignee(t)))
            ));
        }
        let todo = in_status(&tasks, TaskStatus::Todo);
        if !todo.is_empty() {
            sections.push(format!(
                "**📋 To Do:**\n{}",
                bullets(todo.iter().map(|t| with_assignee(t)))
            ));
        }
        let done = in_status(&tasks, TaskStatus::Done);
        if !done.is_empty() {
            sections.push(format!(
                "**✅ Done:**\n{}",
                bullets(done.iter().map(|t| t.title.as_str()))
            ));
        }

        let mut response = format!("Found {total} task(s):\n\n{}", sections.join("\n\n"));
        if total > tasks.len() {
            response.push_str(&format!("\n\n_...and {} more tasks_", total - tasks.len()));
        }

        Ok(CommandResponse::reply(action, response).with_data(CommandData::Tasks(tasks)))
    }

    pub(super) async fn list_projects(
        &self,
        caller: &CallerContext,
    ) -> Result<CommandResponse, AssistantError> {
        let action = Intent::ListProjects;
        let projects = Project::find_by_team_id(&self.pool, caller.team_id).await?;
        if projects.is_empty() {
            return Ok(CommandResponse::reply(
                action,
                "No projects found yet. Create one to get started!",
            )
            .with_data(CommandData::Projects(projects)));
        }

        let lines = projects
            .iter()
            .map(|p| match p.description.as_deref().filter(|d| !d.is_empty()) {
                Some(description) => format!("📁 **{}** - {description}", p.name),
                None => format!("📁 **{}**", p.name),
            })
            .collect::<Vec<_>>()
            .join("\n");
        let suggestions: Vec<String> = projects
            .iter()
            .map(|p| format!("Show tasks in {}", p.name))
            .collect();

        Ok(CommandResponse::reply(
            action,
            format!("You have {} project(s):\n\n{lines}", projects.len()),
        )
        .with_data(CommandData::Projects(projects))
        .with_suggestions(suggestions))
    }

    pub(super) async fn list_members(
        &self,
        caller: &CallerContext,
    ) -> Result<CommandResponse, AssistantError> {
        let action = Intent::ListMembers;
        let members: Vec<MemberSummary> = User::find_by_team_id(&self.pool, caller.team_id, None)
            .await?
            .into_iter()
            .map(MemberSummary::from)
            .collect();

        if members.is_empty() {
            return Ok(CommandResponse::reply(action, "No team members found.")
                .with_data(CommandData::Members(members)));
        }

        let lines = members
            .iter()
            .map(|m| format!("👤 **{}** - {}", m.name, m.email))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(CommandResponse::reply(
            action,
            format!("Your team has {} member(s):\n\n{lines}", members.len()),
        )
        .with_data(CommandData::Members(members)))
    }

    pub(super) async fn project_status(
        &self,
        caller: &CallerContext,
    ) -> Result<CommandResponse, AssistantError> {
        let action = Intent::ProjectStatus;
        if Project::find_latest_for_team(&self.pool, caller.team_id)
            .await?
            .is_none()
        {
            return Ok(CommandResponse::reply(
                action,
                "No projects found to show status for.",
            ));
        }

        let filter = TaskFilter::for_team(caller.team_id).assigned_to(caller.visible_assignee());
        let tasks =
            Task::find_filtered(&self.pool, &filter, TaskOrder::PriorityThenNewest, None).await?;

        let counts = StatusCounts::tally(tasks.iter().map(|t| &t.task));
        let high_priority_tasks: Vec<TaskWithAssignee> = tasks
            .into_iter()
            .filter(|t| t.priority == TaskPriority::High && t.status != TaskStatus::Done)
            .collect();

        let mut response = format!(
            "**📊 Project Overview**\n\n\
             • **Total Tasks:** {}\n\
             • **Completion Rate:** {}%\n\n\
             **Status Breakdown:**\n\
             📋 To Do: {}\n\
             🔄 In Progress: {}\n\
             ✅ Done: {}\n",
            counts.total(),
            counts.completion_rate(),
            counts.todo,
            counts.in_progress,
            counts.done,
        );
        if !high_priority_tasks.is_empty() {
            response.push_str(&format!(
                "\n**⚠️ High Priority Items ({}):**\n{}",
                high_priority_tasks.len(),
                bullets(high_priority_tasks.iter().take(5).map(|t| t.title.as_str()))
            ));
        }

        let overview = ProjectOverview {
            total: counts.total(),
            todo_count: counts.todo,
            in_progress_count: counts.in_progress,
            done_count: counts.done,
            completion_rate: counts.completion_rate(),
            high_priority_tasks,
        };
        Ok(CommandResponse::reply(action, response).with_data(CommandData::Overview(overview)))
    }

    pub(super) async fn search_tasks(
        &self,
        caller: &CallerContext,
        input: &str,
    ) -> Result<CommandResponse, AssistantError> {
        let action = Intent::SearchTasks;
        let Some(term) = search_term(input) else {
            return Ok(CommandResponse::reply(
                action,
                "What would you like to search for?\n\n**Example:** \"Search for login bug\"",
            ));
        };

        let filter = TaskFilter::for_team(caller.team_id)
            .assigned_to(caller.visible_assignee())
            .matching(term.clone());
        let tasks = Task::find_filtered(&self.pool, &filter, TaskOrder::Stored, Some(10)).await?;

        if tasks.is_empty() {
            return Ok(CommandResponse::reply(
                action,
                format!("No tasks found matching \"{term}\". Try a different search term."),
            )
            .with_data(CommandData::Tasks(tasks))
            .with_suggestions(["Show all tasks"]));
        }

        let lines = bullets(tasks.iter().map(|t| {
            let status = format_status(t.status);
            match &t.assignee_name {
                Some(name) => format!("**{}** - {status} _({name})_", t.title),
                None => format!("**{}** - {status}", t.title),
            }
        }));
        Ok(CommandResponse::reply(
            action,
            format!(
                "Found {} task(s) matching \"{term}\":\n\n{lines}",
                tasks.len()
            ),
        )
        .with_data(CommandData::Tasks(tasks)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_rate_rounds() {
        let counts = StatusCounts {
            todo: 2,
            in_progress: 0,
            done: 1,
        };
        assert_eq!(counts.total(), 3);
        assert_eq!(counts.completion_rate(), 33);

        let counts = StatusCounts {
            todo: 1,
            in_progress: 0,
            done: 2,
        };
        assert_eq!(counts.completion_rate(), 67);
        assert_eq!(StatusCounts::default().completion_rate(), 0);
    }
}
