//! Task processing and result aggregation
//!
//! Drives the create-or-skip decision per task, accumulates run statistics,
//! and renders the machine-readable result report. Each task's outcome is
//! independent; a failure never aborts the remaining queue.

use crate::client::BasecampClient;
use crate::task::Task;
use chrono::Utc;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Outcome of one task. Serialized with the wire spellings used in the
/// result report (`dry_run` for simulated creations).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Created,
    Skipped,
    Failed,
    DryRun,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskResult {
    /// The original task title.
    pub task: String,
    pub status: TaskStatus,
    pub basecamp_id: Option<u64>,
    pub url: Option<String>,
    pub error: Option<String>,
}

/// Counters accumulated across a run. `total` always equals the input
/// count; every record lands in exactly one of the other buckets, with
/// dry-run simulations counted as created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub total: usize,
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Machine-readable run report written to the `--output` file.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub timestamp: String,
    pub stats: RunStats,
    pub results: Vec<TaskResult>,
}

impl RunReport {
    pub fn new(stats: RunStats, results: Vec<TaskResult>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            stats,
            results,
        }
    }

    pub fn write_to_file(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }
}

/// Sequentially processes tasks against the Basecamp API.
///
/// Without a client the processor always runs in dry-run mode, simulating
/// creations with no network calls.
pub struct TaskProcessor<'a> {
    client: Option<&'a BasecampClient>,
    dry_run: bool,
    skip_duplicates: bool,
    stats: RunStats,
}

impl<'a> TaskProcessor<'a> {
    pub fn new(client: Option<&'a BasecampClient>, dry_run: bool, skip_duplicates: bool) -> Self {
        Self {
            dry_run: dry_run || client.is_none(),
            client,
            skip_duplicates,
            stats: RunStats::default(),
        }
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Process all tasks in input order, printing progress and a summary.
    pub async fn process_tasks(&mut self, tasks: &[Task]) -> Vec<TaskResult> {
        self.stats.total = tasks.len();

        let line = "=".repeat(60);
        println!("\n{line}");
        println!("Processing {} task(s)...", tasks.len());
        if self.dry_run {
            println!("🔍 DRY RUN MODE - No tasks will be created");
        }
        println!("{line}\n");

        let mut results = Vec::with_capacity(tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            results.push(self.process_single(task, i + 1, tasks.len()).await);
        }

        self.print_summary();
        results
    }

    async fn process_single(&mut self, task: &Task, index: usize, total: usize) -> TaskResult {
        let mut result = TaskResult {
            task: task.content.clone(),
            status: TaskStatus::Pending,
            basecamp_id: None,
            url: None,
            error: None,
        };

        println!("[{index}/{total}] {}", truncate(&task.content, 50));

        // Duplicate detection is best-effort: lookup failures inside
        // todo_exists read as "no duplicate" and creation proceeds.
        if self.skip_duplicates && !self.dry_run {
            if let Some(client) = self.client {
                if client.todo_exists(&task.content).await {
                    println!("  ⏭️  Skipped (duplicate)");
                    result.status = TaskStatus::Skipped;
                    self.stats.skipped += 1;
                    return result;
                }
            }
        }

        if self.dry_run {
            println!("  🔍 Would create task");
            if let Some(due) = &task.due_on {
                println!("      Due: {due}");
            }
            if !task.description.is_empty() {
                println!("      Description: {}", truncate(&task.description, 50));
            }
            result.status = TaskStatus::DryRun;
            self.stats.created += 1;
            return result;
        }

        // new() forces dry_run whenever there is no client
        let Some(client) = self.client else {
            result.status = TaskStatus::DryRun;
            self.stats.created += 1;
            return result;
        };

        match client.create_todo(task).await {
            Ok(created) => {
                println!("  ✅ Created (ID: {})", created.id);
                debug!("created todo {} for '{}'", created.id, task.content);
                result.status = TaskStatus::Created;
                result.basecamp_id = Some(created.id);
                result.url = created.app_url;
                self.stats.created += 1;
            }
            Err(err) => {
                println!("  ❌ Failed: {err}");
                result.status = TaskStatus::Failed;
                result.error = Some(err.to_string());
                self.stats.failed += 1;
            }
        }

        result
    }

    fn print_summary(&self) {
        let line = "=".repeat(60);
        println!("\n{line}");
        println!("Summary");
        println!("{line}");
        println!("  Total tasks:   {}", self.stats.total);
        println!("  ✅ Created:    {}", self.stats.created);
        println!("  ⏭️  Skipped:    {}", self.stats.skipped);
        println!("  ❌ Failed:     {}", self.stats.failed);
        println!("{line}\n");
    }
}

/// Truncate to a character budget with a trailing ellipsis.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    }
}
