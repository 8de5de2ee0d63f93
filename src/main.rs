use bctask::cli::Args;
use bctask::processor::truncate;
use bctask::{ApiError, BasecampClient, Config, ConfigError, RunReport, Task, TaskProcessor};
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("bctask=info")
        .init();

    let args = Args::parse();
    std::process::exit(run(args).await);
}

async fn run(args: Args) -> i32 {
    // Resolve configuration: explicit file, else environment. A creation run
    // with --dry-run may proceed without any configuration; everything else
    // terminates immediately.
    let config = match resolve_config(&args) {
        Ok(config) => Some(config),
        Err(err) if args.dry_run && !args.is_utility_action() => {
            println!("⚠️  Warning: {err}");
            println!("Running in dry-run mode without API connection.\n");
            None
        }
        Err(err) => {
            eprintln!("❌ Configuration Error: {err}");
            return 1;
        }
    };

    let client = match &config {
        Some(config) => match BasecampClient::new(config.clone()) {
            Ok(client) => Some(client),
            Err(err) => {
                eprintln!("❌ Failed to initialize API client: {err}");
                return 1;
            }
        },
        None => None,
    };

    if args.is_utility_action() {
        // config errors for utility actions already exited above
        let (Some(config), Some(client)) = (&config, &client) else {
            return 1;
        };
        return run_utility(&args, config, client).await;
    }

    let tasks = match load_input(&args) {
        Ok(tasks) => tasks,
        Err(err) => {
            eprintln!("❌ Error loading tasks: {err}");
            return 1;
        }
    };

    if tasks.is_empty() {
        println!("⚠️  No tasks found in input");
        return 0;
    }

    if args.verbose {
        println!("📝 Loaded {} task(s)", tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            println!("  📋 {}: {}", i + 1, truncate(&task.content, 100));
        }
    }

    let mut processor = TaskProcessor::new(client.as_ref(), args.dry_run, !args.allow_duplicates);
    let results = processor.process_tasks(&tasks).await;

    if let Some(path) = &args.output {
        let report = RunReport::new(processor.stats().clone(), results);
        match report.write_to_file(path) {
            Ok(()) => println!("📄 Results written to {}", path.display()),
            Err(err) => {
                eprintln!("❌ Failed to write results to {}: {err}", path.display());
                return 1;
            }
        }
    }

    if processor.stats().failed > 0 { 1 } else { 0 }
}

fn resolve_config(args: &Args) -> Result<Config, ConfigError> {
    let mut config = match &args.config {
        Some(path) => {
            info!("loading configuration from {}", path.display());
            Config::from_file(path)?
        }
        None => Config::from_env()?,
    };
    config.apply_overrides(args.project_id.as_deref(), args.todolist_id.as_deref());
    Ok(config)
}

fn load_input(args: &Args) -> anyhow::Result<Vec<Task>> {
    if args.stdin {
        return Ok(bctask::load_tasks_from_stdin()?);
    }
    // clap's input group guarantees a positional source when --stdin is absent
    let Some(source) = &args.json_file else {
        anyhow::bail!("no input source provided");
    };
    Ok(bctask::load_tasks(source)?)
}

async fn run_utility(args: &Args, config: &Config, client: &BasecampClient) -> i32 {
    if args.test_connection {
        println!("Testing Basecamp API connection...");
        return if client.test_connection().await {
            println!("✅ Connection successful!");
            0
        } else {
            println!("❌ Connection failed!");
            1
        };
    }

    if args.list_projects {
        return match list_projects(client).await {
            Ok(()) => 0,
            Err(err) => {
                eprintln!("❌ Failed to list projects: {err}");
                1
            }
        };
    }

    match list_todolists(client, &config.project_id).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("❌ Failed to list todolists: {err}");
            1
        }
    }
}

async fn list_projects(client: &BasecampClient) -> Result<(), ApiError> {
    println!("Fetching projects...");
    let projects = client.get_projects().await?;

    println!("\nFound {} project(s):\n", projects.len());
    for project in &projects {
        println!("  ID: {}", project.id);
        println!("  Name: {}", project.name);
        println!("  URL: {}", project.app_url.as_deref().unwrap_or("N/A"));
        println!();
    }
    Ok(())
}

async fn list_todolists(client: &BasecampClient, project_id: &str) -> Result<(), ApiError> {
    println!("Fetching todolists for project {project_id}...");
    let todolists = client.get_todolists(project_id).await?;

    println!("\nFound {} todolist(s):\n", todolists.len());
    for todolist in &todolists {
        println!("  ID: {}", todolist.id);
        println!("  Name: {}", todolist.name);
        match todolist.todos_count {
            Some(count) => println!("  Count: {count} todos"),
            None => println!("  Count: N/A todos"),
        }
        println!();
    }
    Ok(())
}
