//! Task input loading and source resolution
//!
//! A task source can be a file path, a raw JSON string, an already-parsed
//! JSON value, or piped stdin. Resolution order for strings: JSON parse
//! first, then fall back to treating the string as a file path.

use crate::task::Task;
use serde_json::Value;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Could not parse tasks from source: {reason}")]
    Parse { reason: String },

    #[error("No input provided via stdin")]
    EmptyStdin,

    #[error("IO error reading input: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert a parsed JSON value into task records.
///
/// A list is used directly; an object with a `tasks` array unwraps to that
/// array; any other object is treated as a single task. Within the list,
/// objects become full records, strings become title-only records, and
/// anything else is skipped.
pub fn tasks_from_value(value: Value) -> Vec<Task> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("tasks") {
            Some(Value::Array(items)) => items,
            _ => vec![Value::Object(map)],
        },
        other => vec![other],
    };

    let mut tasks = Vec::with_capacity(items.len());
    for item in &items {
        match item {
            Value::Object(map) => tasks.push(Task::from_value(map)),
            Value::String(text) => tasks.push(Task::from_title(text.clone())),
            other => {
                warn!("skipping non-task element in input: {other}");
            }
        }
    }
    tasks
}

/// Load tasks from a string that is either inline JSON or a file path.
pub fn load_tasks(source: &str) -> Result<Vec<Task>, InputError> {
    if let Ok(value) = serde_json::from_str::<Value>(source) {
        debug!("parsed task source as inline JSON");
        return Ok(tasks_from_value(value));
    }

    let path = Path::new(source);
    if !path.exists() {
        return Err(InputError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    debug!("reading task source from file: {}", path.display());
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content).map_err(|err| InputError::Parse {
        reason: format!("{}: {err}", path.display()),
    })?;
    Ok(tasks_from_value(value))
}

/// Load tasks from piped stdin. Fails when stdin is an interactive terminal.
pub fn load_tasks_from_stdin() -> Result<Vec<Task>, InputError> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(InputError::EmptyStdin);
    }

    let mut content = String::new();
    stdin.lock().read_to_string(&mut content)?;

    let value: Value = serde_json::from_str(&content).map_err(|err| InputError::Parse {
        reason: format!("stdin: {err}"),
    })?;
    Ok(tasks_from_value(value))
}
