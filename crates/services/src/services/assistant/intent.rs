//! Ordered keyword classifier for assistant commands.
//!
//! Rules are evaluated top to bottom against the lowercased, trimmed input and the
//! first match wins. The order is part of the contract: for example "mark task done"
//! has to resolve to [`Intent::UpdateStatus`] before any listing rule sees it.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Intent {
    Greeting,
    Thanks,
    Help,
    CreateTask,
    AssignTask,
    UpdateStatus,
    UpdatePriority,
    MyTasks,
    ListTasks,
    ListProjects,
    ListMembers,
    DeleteTask,
    ProjectStatus,
    SearchTasks,
    Unknown,
}

const GREETINGS: &[&str] = &[
    "hello",
    "hi",
    "hey",
    "greetings",
    "good morning",
    "good afternoon",
    "good evening",
];
const THANKS: &[&str] = &["thank", "thanks", "thx", "appreciate"];
const HELP_WORDS: &[&str] = &["help", "what can you do", "commands", "how do i", "how to"];
const CREATE_WORDS: &[&str] = &["create", "add", "new"];
const ASSIGN_WORDS: &[&str] = &["assign", "give"];
const ASSIGN_TARGETS: &[&str] = &["task", "to"];
const STATUS_VERBS: &[&str] = &["move", "update", "change", "set", "mark"];
const STATUS_WORDS: &[&str] = &["status", "progress", "done", "todo", "complete", "finish"];
const PRIORITY_VERBS: &[&str] = &["set", "change", "update"];
const LIST_WORDS: &[&str] = &["list", "show", "get", "display", "what are"];
const MY_TASK_WORDS: &[&str] = &["my task", "assigned to me"];
const MEMBER_WORDS: &[&str] = &["team", "member"];
const DELETE_WORDS: &[&str] = &["delete", "remove"];
const OVERVIEW_WORDS: &[&str] = &["status", "summary", "overview"];
const SEARCH_WORDS: &[&str] = &["search", "find"];

enum Matcher {
    StartsWithAny(&'static [&'static str]),
    ContainsAny(&'static [&'static str]),
    All(&'static [Matcher]),
}

impl Matcher {
    fn matches(&self, text: &str) -> bool {
        match self {
            Matcher::StartsWithAny(prefixes) => prefixes.iter().any(|p| text.starts_with(p)),
            Matcher::ContainsAny(needles) => utils::text::contains_any(text, needles),
            Matcher::All(matchers) => matchers.iter().all(|m| m.matches(text)),
        }
    }
}

struct Rule {
    matcher: Matcher,
    intent: Intent,
}

static RULES: &[Rule] = &[
    Rule {
        matcher: Matcher::StartsWithAny(GREETINGS),
        intent: Intent::Greeting,
    },
    Rule {
        matcher: Matcher::ContainsAny(THANKS),
        intent: Intent::Thanks,
    },
    Rule {
        matcher: Matcher::ContainsAny(HELP_WORDS),
        intent: Intent::Help,
    },
    Rule {
        matcher: Matcher::All(&[
            Matcher::ContainsAny(CREATE_WORDS),
            Matcher::ContainsAny(&["task"]),
        ]),
        intent: Intent::CreateTask,
    },
    Rule {
        matcher: Matcher::All(&[
            Matcher::ContainsAny(ASSIGN_WORDS),
            Matcher::ContainsAny(ASSIGN_TARGETS),
        ]),
        intent: Intent::AssignTask,
    },
    Rule {
        matcher: Matcher::All(&[
            Matcher::ContainsAny(STATUS_VERBS),
            Matcher::ContainsAny(STATUS_WORDS),
        ]),
        intent: Intent::UpdateStatus,
    },
    Rule {
        matcher: Matcher::All(&[
            Matcher::ContainsAny(PRIORITY_VERBS),
            Matcher::ContainsAny(&["priority"]),
        ]),
        intent: Intent::UpdatePriority,
    },
    // Listing family: only when a listing verb is present, otherwise fall through.
    Rule {
        matcher: Matcher::All(&[
            Matcher::ContainsAny(LIST_WORDS),
            Matcher::ContainsAny(MY_TASK_WORDS),
        ]),
        intent: Intent::MyTasks,
    },
    Rule {
        matcher: Matcher::All(&[
            Matcher::ContainsAny(LIST_WORDS),
            Matcher::ContainsAny(&["task"]),
        ]),
        intent: Intent::ListTasks,
    },
    Rule {
        matcher: Matcher::All(&[
            Matcher::ContainsAny(LIST_WORDS),
            Matcher::ContainsAny(&["project"]),
        ]),
        intent: Intent::ListProjects,
    },
    Rule {
        matcher: Matcher::All(&[
            Matcher::ContainsAny(LIST_WORDS),
            Matcher::ContainsAny(MEMBER_WORDS),
        ]),
        intent: Intent::ListMembers,
    },
    Rule {
        matcher: Matcher::All(&[
            Matcher::ContainsAny(DELETE_WORDS),
            Matcher::ContainsAny(&["task"]),
        ]),
        intent: Intent::DeleteTask,
    },
    Rule {
        matcher: Matcher::ContainsAny(OVERVIEW_WORDS),
        intent: Intent::ProjectStatus,
    },
    Rule {
        matcher: Matcher::ContainsAny(SEARCH_WORDS),
        intent: Intent::SearchTasks,
    },
];

/// Classify free text into an [`Intent`]. Pure: identical input always yields the same intent.
pub fn classify(input: &str) -> Intent {
    let text = input.trim().to_lowercase();
    if text.is_empty() {
        return Intent::Unknown;
    }

    RULES
        .iter()
        .find(|rule| rule.matcher.matches(&text))
        .map(|rule| rule.intent)
        .unwrap_or(Intent::Unknown)
}

/// Intents in the order their rules are evaluated
pub fn precedence() -> Vec<Intent> {
    RULES.iter().map(|rule| rule.intent).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_phrasings() {
        assert_eq!(classify("thanks so much"), Intent::Thanks);
        assert_eq!(classify("Show my tasks"), Intent::MyTasks);
        assert_eq!(classify(""), Intent::Unknown);
        assert_eq!(classify("   "), Intent::Unknown);
    }

    #[test]
    fn test_rule_order_is_stable() {
        assert_eq!(
            precedence(),
            vec![
                Intent::Greeting,
                Intent::Thanks,
                Intent::Help,
                Intent::CreateTask,
                Intent::AssignTask,
                Intent::UpdateStatus,
                Intent::UpdatePriority,
                Intent::MyTasks,
                Intent::ListTasks,
                Intent::ListProjects,
                Intent::ListMembers,
                Intent::DeleteTask,
                Intent::ProjectStatus,
                Intent::SearchTasks,
            ]
        );
    }

    #[test]
    fn test_each_intent_reachable() {
        let cases = [
            ("Hello there", Intent::Greeting),
            ("good evening team", Intent::Greeting),
            ("I appreciate it", Intent::Thanks),
            ("what can you do?", Intent::Help),
            ("Create a task called Review PR #42", Intent::CreateTask),
            ("Assign 'Fix login bug' to Sarah", Intent::AssignTask),
            ("Move 'Design review' to done", Intent::UpdateStatus),
            ("Set 'Bug fix' priority to high", Intent::UpdatePriority),
            ("what are my tasks", Intent::MyTasks),
            ("List all tasks", Intent::ListTasks),
            ("list projects", Intent::ListProjects),
            ("display team members", Intent::ListMembers),
            ("Delete task 'Old feature'", Intent::DeleteTask),
            ("Project overview", Intent::ProjectStatus),
            ("search for login bug", Intent::SearchTasks),
            ("bake a cake", Intent::Unknown),
        ];
        for (input, expected) in cases {
            assert_eq!(classify(input), expected, "input: {input:?}");
        }
    }

    #[test]
    fn test_status_words_win_over_listing() {
        assert_eq!(classify("mark the login task done"), Intent::UpdateStatus);
        assert_eq!(classify("update task status to done"), Intent::UpdateStatus);
        // "show" alone would list tasks, but the status rule comes first
        assert_eq!(classify("show and mark task done"), Intent::UpdateStatus);
    }

    #[test]
    fn test_status_and_priority_keywords_resolve_to_status() {
        // both rules match; status is evaluated first
        assert_eq!(
            classify("set 'API setup' priority high and status done"),
            Intent::UpdateStatus
        );
        assert_eq!(classify("change priority of API setup"), Intent::UpdatePriority);
        assert_eq!(
            classify("change priority of API setup to complete"),
            Intent::UpdateStatus
        );
    }

    #[test]
    fn test_create_beats_assign() {
        // contains "add" + "task" and also "to"; create comes first
        assert_eq!(classify("add a task and give it to Sam"), Intent::CreateTask);
    }

    #[test]
    fn test_listing_falls_through_to_later_rules() {
        // listing verb without a listing target
        assert_eq!(classify("show the summary"), Intent::ProjectStatus);
        assert_eq!(classify("get me something"), Intent::Unknown);
    }

    #[test]
    fn test_assigned_to_me_is_claimed_by_assign_rule() {
        assert_eq!(classify("show tasks assigned to me"), Intent::AssignTask);
    }

    #[test]
    fn test_greeting_is_prefix_only() {
        assert_eq!(classify("well hello"), Intent::Unknown);
        assert_eq!(classify("  HEY assistant"), Intent::Greeting);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let input = "Set task 'Deploy' to in progress with high priority";
        let first = classify(input);
        for _ in 0..10 {
            assert_eq!(classify(input), first);
        }
        assert_eq!(first, Intent::UpdateStatus);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(Intent::CreateTask.to_string(), "create_task");
        assert_eq!(
            serde_json::to_string(&Intent::ProjectStatus).unwrap(),
            "\"project_status\""
        );
    }
}
