use db::models::task::{TaskPriority, TaskStatus};

pub fn format_status(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "📋 To Do",
        TaskStatus::InProgress => "🔄 In Progress",
        TaskStatus::Done => "✅ Done",
    }
}

pub fn format_priority(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::High => "🔴 High",
        TaskPriority::Medium => "🟡 Medium",
        TaskPriority::Low => "🟢 Low",
    }
}

/// Part of the day used to phrase greetings, from the local hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPeriod {
    Morning,
    Afternoon,
    Evening,
}

impl DayPeriod {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=11 => DayPeriod::Morning,
            12..=16 => DayPeriod::Afternoon,
            _ => DayPeriod::Evening,
        }
    }

    pub fn greeting(self) -> &'static str {
        match self {
            DayPeriod::Morning => "Good morning",
            DayPeriod::Afternoon => "Good afternoon",
            DayPeriod::Evening => "Good evening",
        }
    }
}

pub fn help_text(name: &str) -> String {
    format!(
        "Here's what I can help you with, {name}:\n\n\
         **📝 Task Management**\n\
         • \"Create a task called [name]\" - Add a new task\n\
         • \"Assign [task] to [person]\" - Delegate work\n\
         • \"Move [task] to done\" - Update task status\n\
         • \"Set [task] priority to high\" - Change priority\n\
         • \"Delete task [name]\" - Remove a task\n\n\
         **📋 Viewing & Search**\n\
         • \"Show my tasks\" - See tasks assigned to you\n\
         • \"List all tasks\" - View all team tasks\n\
         • \"Search for [keyword]\" - Find specific tasks\n\
         • \"Project overview\" - Get a status summary\n\n\
         **💡 Tips:** You can use natural language - I'll understand variations like \"add\", \"new\", \"give\", etc."
    )
}

pub const QUICK_COMMANDS: &str = "**Quick Commands:**\n\
    • \"Create a task called [name]\" - Add a new task\n\
    • \"Show my tasks\" - See your assigned tasks\n\
    • \"Move [task] to done\" - Update task status\n\
    • \"Project overview\" - See project summary\n\n\
    Type **\"help\"** for the full list of commands!";

/// Bullet list, one line per item.
pub fn bullets<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| format!("• {}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}
