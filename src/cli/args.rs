//! Command line argument parsing
//!
//! Exactly one input source must be given: a positional JSON file path (which
//! may also be inline JSON) or `--stdin`. The utility flags (`--list-projects`,
//! `--list-todolists`, `--test-connection`) short-circuit the create flow.

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "bctask")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Create Basecamp to-dos from a JSON task list")]
#[command(group = ArgGroup::new("input").required(true).args(["json_file", "stdin"]))]
#[command(after_help = "\
Examples:
  bctask tasks.json
  bctask tasks.json --dry-run
  cat tasks.json | bctask --stdin
  bctask tasks.json --config basecamp_config.json

JSON format:
  [
    {
      \"content\": \"Task title (required)\",
      \"description\": \"Optional description (HTML supported)\",
      \"due_on\": \"2024-12-31\",
      \"priority\": \"high\",
      \"category\": \"backend\"
    },
    \"Simple task as string\"
  ]

Environment variables:
  BASECAMP_ACCOUNT_ID    - Your Basecamp account ID
  BASECAMP_ACCESS_TOKEN  - OAuth2 access token
  BASECAMP_PROJECT_ID    - Target project ID
  BASECAMP_TODOLIST_ID   - Target todolist ID
  BASECAMP_USER_AGENT    - Custom User-Agent (optional)")]
pub struct Args {
    /// Path to JSON file containing tasks
    #[arg(value_name = "JSON_FILE")]
    pub json_file: Option<String>,

    /// Read JSON from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Path to JSON config file (alternative to env vars)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Override Basecamp project ID
    #[arg(long = "project-id")]
    pub project_id: Option<String>,

    /// Override Basecamp todolist ID
    #[arg(long = "todolist-id")]
    pub todolist_id: Option<String>,

    /// Preview tasks without creating them
    #[arg(short = 'n', long = "dry-run")]
    pub dry_run: bool,

    /// Create tasks even if they already exist
    #[arg(long = "allow-duplicates")]
    pub allow_duplicates: bool,

    /// Write results to JSON file
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// List all available projects and exit
    #[arg(long = "list-projects")]
    pub list_projects: bool,

    /// List all todolists in the configured project and exit
    #[arg(long = "list-todolists")]
    pub list_todolists: bool,

    /// Test API connection and exit
    #[arg(long = "test-connection")]
    pub test_connection: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Args {
    /// Whether a utility action short-circuits the create flow.
    pub fn is_utility_action(&self) -> bool {
        self.list_projects || self.list_todolists || self.test_connection
    }
}
