//! Field and fragment extraction for task commands.
//!
//! Each extractor is an ordered list of patterns; the first one that matches wins.
//! Nothing here touches the store, so a miss is always `None` and the dispatcher
//! decides how to ask for clarification.

use db::models::task::{TaskPriority, TaskStatus};
use once_cell::sync::Lazy;
use regex::Regex;

/// Fields pulled from a create-task command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFields {
    pub title: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub description: Option<String>,
}

static TITLE_AFTER_KEYWORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:called|named|titled?|")\s*["']?([^"'\n]+?)["']?(?:\s+with|\s+as|\s*$)"#)
        .expect("valid title keyword regex")
});
static TITLE_QUOTED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)task\s+["']([^"']+)["']"#).expect("valid quoted title regex")
});
static TITLE_BARE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)task\s+(\w+(?:\s+\w+)*?)(?:\s+with|\s+as|\s+to|\s*$)")
        .expect("valid bare title regex")
});
static DESCRIPTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:description|desc|details?):\s*["']?([^"'\n]+)["']?"#)
        .expect("valid description regex")
});

static ASSIGN_TASK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:assign|give)\s+(?:task\s+)?["']?([^"'\n]+?)["']?\s+to\b"#)
        .expect("valid assign regex")
});
static QUOTED_BEFORE_TO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)["']([^"']+)["']\s+to\b"#).expect("valid quoted assign regex")
});
static ASSIGNEE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bto\s+["']?(\w+(?:\s+\w+)?)["']?"#).expect("valid assignee regex")
});
static STATUS_TASK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(?:move|update|change|set|mark)\s+(?:task\s+)?["']?([^"'\n]+?)["']?\s+(?:to|as)\b"#,
    )
    .expect("valid status regex")
});
static ANY_QUOTED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"["']([^"']+)["']"#).expect("valid quoted regex"));
static PRIORITY_TASK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:set|change|update)\s+(?:task\s+)?["']?([^"'\n]+?)["']?\s+priority"#)
        .expect("valid priority regex")
});
static PRIORITY_OF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)priority\s+(?:of|for)\s+["']?([^"'\n]+?)["']?(?:\s+to\b|\s*$)"#)
        .expect("valid priority-of regex")
});
static HIGH_PRIORITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:high|urgent|critical)\b").expect("valid high regex"));
static LOW_PRIORITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:low|minor)\b").expect("valid low regex"));
static QUOTED_SPAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""[^"]*"|'[^']*'"#).expect("valid quoted span regex"));
static DELETE_TASK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:delete|remove)\s+(?:task\s+)?["']?([^"'\n]+)["']?"#)
        .expect("valid delete regex")
});
static SEARCH_TERM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:search|find)\s+(?:for\s+)?["']?([^"'\n]+)["']?"#)
        .expect("valid search regex")
});

fn first_capture(patterns: &[&Lazy<Regex>], text: &str) -> Option<String> {
    patterns
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn extract_task_fields(input: &str) -> TaskFields {
    let lower = input.to_lowercase();

    let title = first_capture(
        &[&TITLE_AFTER_KEYWORD_RE, &TITLE_QUOTED_RE, &TITLE_BARE_RE],
        input,
    )
    .map(|raw| raw.replace(['"', '\''], "").trim().to_string())
    .filter(|title| !title.is_empty());

    let status = if utils::text::contains_any(&lower, &["in progress", "in-progress", "started"]) {
        TaskStatus::InProgress
    } else if utils::text::contains_any(&lower, &["done", "complete", "finished"]) {
        TaskStatus::Done
    } else {
        TaskStatus::Todo
    };

    let priority = if utils::text::contains_any(
        &lower,
        &["high priority", "urgent", "critical", "important"],
    ) {
        TaskPriority::High
    } else if utils::text::contains_any(&lower, &["low priority", "minor"]) {
        TaskPriority::Low
    } else {
        TaskPriority::Medium
    };

    let description = first_capture(&[&DESCRIPTION_RE], input);

    TaskFields {
        title,
        status,
        priority,
        description,
    }
}

/// Status named by an update-status command. Falls back to `todo`.
pub fn target_status(input: &str) -> TaskStatus {
    let lower = input.to_lowercase();
    if utils::text::contains_any(&lower, &["in progress", "in-progress", "start", "working"]) {
        TaskStatus::InProgress
    } else if utils::text::contains_any(&lower, &["done", "complete", "finish", "close"]) {
        TaskStatus::Done
    } else {
        TaskStatus::Todo
    }
}

/// Priority named by an update-priority command. Falls back to `medium`.
///
/// Quoted task names are ignored and the words after "priority" win, so neither
/// "Follow up" nor "Highway signs" is read as a priority keyword.
pub fn target_priority(input: &str) -> TaskPriority {
    let lower = input.to_lowercase();
    let unquoted = QUOTED_SPAN_RE.replace_all(&lower, " ");
    unquoted
        .rfind("priority")
        .and_then(|at| priority_keyword(&unquoted[at + "priority".len()..]))
        .or_else(|| priority_keyword(&unquoted))
        .unwrap_or(TaskPriority::Medium)
}

fn priority_keyword(text: &str) -> Option<TaskPriority> {
    if HIGH_PRIORITY_RE.is_match(text) {
        Some(TaskPriority::High)
    } else if LOW_PRIORITY_RE.is_match(text) {
        Some(TaskPriority::Low)
    } else {
        None
    }
}

/// Quoted names are tried first so a title containing "to" survives intact.
pub fn assign_task_fragment(input: &str) -> Option<String> {
    first_capture(&[&QUOTED_BEFORE_TO_RE, &ASSIGN_TASK_RE], input)
}

/// Name after the last `to`, so titles containing "to" don't swallow the assignee.
pub fn assignee_fragment(input: &str) -> Option<String> {
    ASSIGNEE_RE
        .captures_iter(input)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn status_task_fragment(input: &str) -> Option<String> {
    first_capture(&[&STATUS_TASK_RE, &ANY_QUOTED_RE], input)
}

pub fn priority_task_fragment(input: &str) -> Option<String> {
    first_capture(&[&PRIORITY_TASK_RE, &PRIORITY_OF_RE], input)
}

pub fn delete_task_fragment(input: &str) -> Option<String> {
    first_capture(&[&DELETE_TASK_RE], input)
}

pub fn search_term(input: &str) -> Option<String> {
    first_capture(&[&SEARCH_TERM_RE], input)
}
