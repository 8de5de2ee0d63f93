//! Task record model and input normalization
//!
//! Input JSON is loosely structured: the same concept may appear under
//! snake_case or camelCase keys, and a task may be a bare string instead of
//! an object. This module normalizes all of that into a fully-typed [`Task`]
//! with a fixed alias precedence per field.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single to-do item to be created in Basecamp.
///
/// The metadata fields (`source_file`, `source_line`, `priority`, `category`)
/// are tracked locally for reporting and are never transmitted to the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Task title. Required by the API, but tolerated empty at parse time;
    /// validation happens at submission.
    pub content: String,
    /// Rich-text notes (HTML supported by Basecamp).
    pub description: String,
    /// Due date (YYYY-MM-DD).
    pub due_on: Option<String>,
    /// Start date (YYYY-MM-DD).
    pub starts_on: Option<String>,
    /// Basecamp user IDs to assign.
    pub assignee_ids: Vec<u64>,
    /// Whether to notify assignees on creation.
    pub notify: bool,
    pub source_file: Option<String>,
    pub source_line: Option<u64>,
    pub priority: String,
    pub category: Option<String>,
}

impl Default for Task {
    fn default() -> Self {
        Self {
            content: String::new(),
            description: String::new(),
            due_on: None,
            starts_on: None,
            assignee_ids: Vec::new(),
            notify: false,
            source_file: None,
            source_line: None,
            priority: "normal".to_string(),
            category: None,
        }
    }
}

/// API-facing subset of a task. Only populated optional fields are
/// serialized; `content` and `description` are always present.
#[derive(Debug, Clone, Serialize)]
pub struct TodoPayload {
    pub content: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_on: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assignee_ids: Vec<u64>,
    #[serde(skip_serializing_if = "is_false")]
    pub notify: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_on: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Task {
    /// Create a task whose title is the given text, everything else default.
    pub fn from_title(title: impl Into<String>) -> Self {
        Self {
            content: title.into(),
            ..Self::default()
        }
    }

    /// Build a task from a JSON object, normalizing key aliases.
    ///
    /// Each field has a fixed precedence list (snake_case first, then
    /// camelCase), matched case-insensitively. A missing title yields an
    /// empty `content` rather than an error.
    pub fn from_value(data: &Map<String, Value>) -> Self {
        Self {
            content: lookup_str(data, &["content", "title"]).unwrap_or_default(),
            description: lookup_str(data, &["description"]).unwrap_or_default(),
            due_on: lookup_str(data, &["due_on", "dueOn"]),
            starts_on: lookup_str(data, &["starts_on", "startsOn"]),
            assignee_ids: lookup_ids(data, &["assignee_ids", "assigneeIds"]),
            notify: lookup(data, &["notify"])
                .and_then(Value::as_bool)
                .unwrap_or(false),
            source_file: lookup_str(data, &["source_file", "sourceFile"]),
            source_line: lookup(data, &["source_line", "sourceLine"]).and_then(Value::as_u64),
            priority: lookup_str(data, &["priority"]).unwrap_or_else(|| "normal".to_string()),
            category: lookup_str(data, &["category"]),
        }
    }

    /// The outbound create payload for this task.
    pub fn payload(&self) -> TodoPayload {
        TodoPayload {
            content: self.content.clone(),
            description: self.description.clone(),
            due_on: self.due_on.clone(),
            assignee_ids: self.assignee_ids.clone(),
            notify: self.notify,
            starts_on: self.starts_on.clone(),
        }
    }
}

/// Find the first alias present in the map with a non-null value.
fn lookup<'a>(data: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    for alias in aliases {
        let found = data
            .iter()
            .find(|(key, value)| key.eq_ignore_ascii_case(alias) && !value.is_null());
        if let Some((_, value)) = found {
            return Some(value);
        }
    }
    None
}

fn lookup_str(data: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    lookup(data, aliases).and_then(|v| v.as_str().map(str::to_string))
}

/// Assignee IDs arrive as JSON numbers or numeric strings.
fn lookup_ids(data: &Map<String, Value>, aliases: &[&str]) -> Vec<u64> {
    let Some(Value::Array(items)) = lookup(data, aliases) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_from_value_snake_case_fields() {
        let task = Task::from_value(&object(json!({
            "content": "Write report",
            "description": "<b>Quarterly</b>",
            "due_on": "2024-12-31",
            "starts_on": "2024-12-01",
            "assignee_ids": [101, 102],
            "notify": true,
            "priority": "high",
            "category": "backend"
        })));

        assert_eq!(task.content, "Write report");
        assert_eq!(task.description, "<b>Quarterly</b>");
        assert_eq!(task.due_on.as_deref(), Some("2024-12-31"));
        assert_eq!(task.starts_on.as_deref(), Some("2024-12-01"));
        assert_eq!(task.assignee_ids, vec![101, 102]);
        assert!(task.notify);
        assert_eq!(task.priority, "high");
        assert_eq!(task.category.as_deref(), Some("backend"));
    }

    #[test]
    fn test_from_value_camel_case_aliases() {
        let task = Task::from_value(&object(json!({
            "title": "Buy milk",
            "dueOn": "2024-12-31",
            "assigneeIds": ["7"],
            "startsOn": "2024-12-01",
            "sourceFile": "notes.md",
            "sourceLine": 12
        })));

        assert_eq!(task.content, "Buy milk");
        assert_eq!(task.due_on.as_deref(), Some("2024-12-31"));
        assert_eq!(task.starts_on.as_deref(), Some("2024-12-01"));
        assert_eq!(task.assignee_ids, vec![7]);
        assert_eq!(task.source_file.as_deref(), Some("notes.md"));
        assert_eq!(task.source_line, Some(12));
    }

    #[test]
    fn test_snake_case_takes_precedence_over_camel_case() {
        let task = Task::from_value(&object(json!({
            "content": "primary",
            "title": "secondary",
            "due_on": "2024-01-01",
            "dueOn": "2025-01-01"
        })));

        assert_eq!(task.content, "primary");
        assert_eq!(task.due_on.as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn test_aliases_match_case_insensitively() {
        let task = Task::from_value(&object(json!({
            "Content": "Shifted keys",
            "DUE_ON": "2024-06-01"
        })));

        assert_eq!(task.content, "Shifted keys");
        assert_eq!(task.due_on.as_deref(), Some("2024-06-01"));
    }

    #[test]
    fn test_missing_title_becomes_empty_not_error() {
        let task = Task::from_value(&object(json!({ "description": "orphan" })));
        assert_eq!(task.content, "");
        assert_eq!(task.description, "orphan");
        assert_eq!(task.priority, "normal");
    }

    #[test]
    fn test_null_values_are_ignored() {
        let task = Task::from_value(&object(json!({
            "content": null,
            "title": "fallback",
            "due_on": null
        })));
        assert_eq!(task.content, "fallback");
        assert_eq!(task.due_on, None);
    }

    #[test]
    fn test_from_title_defaults() {
        let task = Task::from_title("Simple task");
        assert_eq!(task.content, "Simple task");
        assert_eq!(task.description, "");
        assert_eq!(task.due_on, None);
        assert!(task.assignee_ids.is_empty());
        assert!(!task.notify);
        assert_eq!(task.priority, "normal");
    }

    #[test]
    fn test_payload_omits_defaults() {
        let payload = serde_json::to_value(Task::from_title("Bare").payload()).unwrap();
        let keys: Vec<&str> = payload
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["content", "description"]);
        assert_eq!(payload["description"], "");
    }

    #[test]
    fn test_payload_includes_populated_fields() {
        let task = Task {
            content: "Full".to_string(),
            due_on: Some("2024-12-31".to_string()),
            starts_on: Some("2024-12-01".to_string()),
            assignee_ids: vec![5],
            notify: true,
            ..Task::default()
        };
        let payload = serde_json::to_value(task.payload()).unwrap();

        assert_eq!(payload["due_on"], "2024-12-31");
        assert_eq!(payload["starts_on"], "2024-12-01");
        assert_eq!(payload["assignee_ids"], json!([5]));
        assert_eq!(payload["notify"], true);
    }

    #[test]
    fn test_payload_never_carries_local_metadata() {
        let task = Task {
            content: "Tracked".to_string(),
            priority: "critical".to_string(),
            category: Some("infra".to_string()),
            source_file: Some("tasks.json".to_string()),
            source_line: Some(3),
            ..Task::default()
        };
        let payload = serde_json::to_value(task.payload()).unwrap();
        let body = payload.as_object().unwrap();

        assert!(!body.contains_key("priority"));
        assert!(!body.contains_key("category"));
        assert!(!body.contains_key("source_file"));
        assert!(!body.contains_key("source_line"));
    }
}
