//! # bctask
//!
//! Create Basecamp to-dos from a JSON task list.
//!
//! The crate reads heterogeneous JSON task representations (objects with
//! snake_case or camelCase keys, or bare strings), normalizes them into
//! typed records, and creates them sequentially through the Basecamp 3 API
//! with retry, rate-limit throttling, and optional duplicate skipping.
//!
//! ## Architecture Overview
//!
//! - **[`task`]**: normalized task records built from loosely-structured input
//! - **[`input`]**: input loading from files, inline JSON, or stdin
//! - **[`config`]**: connection settings from environment or a JSON file
//! - **[`client`]**: authenticated Basecamp API calls with retry and throttle
//! - **[`processor`]**: per-task create-or-skip flow and run statistics
//! - **[`cli`]**: command-line argument surface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bctask::{BasecampClient, Config, TaskProcessor, load_tasks};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = BasecampClient::new(config)?;
//!
//!     let tasks = load_tasks("tasks.json")?;
//!     let mut processor = TaskProcessor::new(Some(&client), false, true);
//!     let results = processor.process_tasks(&tasks).await;
//!
//!     println!("created {} of {}", processor.stats().created, results.len());
//!     Ok(())
//! }
//! ```

/// Normalized task records and the API-facing payload subset.
pub mod task;

/// Input loading: file path, raw JSON, in-memory value, or stdin.
pub mod input;

/// Connection configuration from environment variables or a JSON file.
pub mod config;

/// Basecamp 3 API client with retry and request throttling.
pub mod client;

/// Sequential task processing and result aggregation.
pub mod processor;

/// Command-line interface.
pub mod cli;

pub use client::{ApiError, BasecampClient, CreatedTodo, Project, Todo, Todolist};
pub use config::{Config, ConfigError};
pub use input::{InputError, load_tasks, load_tasks_from_stdin, tasks_from_value};
pub use processor::{RunReport, RunStats, TaskProcessor, TaskResult, TaskStatus};
pub use task::Task;
