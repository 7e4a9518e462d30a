//! # Tasker
//!
//! Terminal task list with a built-in work timer.
//!
//! ## Usage
//!
//! ```bash
//! # Pick an open task (or create one) and work it for an hour
//! tasker
//! tasker todo --duration 25m
//!
//! # Manage tasks
//! tasker new "Write report"
//! tasker list --sort worked --reverse false
//! tasker complete 3
//! tasker delete        # choose from a list
//!
//! # Plain countdown
//! tasker countdown 2m30s --title "Tea"
//! ```
//!
//! ## Data Storage
//!
//! Tasks are saved in your local data directory:
//! *   Linux: `~/.local/share/tasker/tasks.json`
//! *   macOS: `~/Library/Application Support/tasker/tasks.json`
//! *   Windows: `%LOCALAPPDATA%\tasker\tasks.json`
//!
//! Override with `--db <PATH>` or the `TASKER_DB` environment variable. A
//! `tasks.csv` file from older versions next to it is converted on first use.
//!
//! Set `RUST_LOG=tasker=debug` to see what the store is doing.

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tasker::commands::*;
use tasker::config::Config;
use tasker::countdown::TerminalCountdown;
use tasker::error::{exit_codes, Result};
use tasker::prompt::StdinPrompter;
use tasker::storage::FileStorage;
use tasker::store::{SortKey, TaskStore};
use tasker::tracking::SystemClock;

const DEFAULT_SESSION: &str = "60m";

#[derive(Parser)]
#[command(name = "tasker")]
#[command(about = "Task list with a built-in work timer", long_about = None)]
struct Cli {
    /// Task store file
    #[arg(long, global = true, env = "TASKER_DB")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick an open task (or create one) and work on it
    Todo {
        /// Session length, e.g. 25m, 1h, 1h30m
        #[arg(short, long, default_value = DEFAULT_SESSION)]
        duration: String,
    },
    /// Add a new task
    New {
        /// Task text (quoted if it has spaces); asked for when omitted
        text: Option<String>,
    },
    /// Remove a task
    Delete {
        /// Task id; choose from a list when omitted
        id: Option<i64>,
    },
    /// Show every task
    List {
        /// Column to sort by
        #[arg(short, long, value_enum, default_value_t = SortKey::Created)]
        sort: SortKey,
        /// Sort descending
        #[arg(short, long, default_value_t = true, action = clap::ArgAction::Set)]
        reverse: bool,
    },
    /// Mark a task as complete
    Complete {
        /// Task id; choose from open tasks when omitted
        id: Option<i64>,
    },
    /// Count down from DURATION to zero
    ///
    /// DURATION is a number followed by d, h, m or s, e.g. 5m, 45s, 2m30s.
    Countdown {
        duration: String,
        /// Title shown above the clock
        #[arg(short, long)]
        title: Option<String>,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
}

fn init_tracing() {
    // Opt-in via RUST_LOG; ignore filters that do not parse.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::resolve(cli.db);
    let store = TaskStore::new(FileStorage::from_config(&config));
    let mut prompter = StdinPrompter;

    match cli.command {
        Some(Commands::Todo { duration }) => {
            cmd_todo(&store, &duration, &SystemClock, &mut TerminalCountdown, &mut prompter)
        }
        None => cmd_todo(&store, DEFAULT_SESSION, &SystemClock, &mut TerminalCountdown, &mut prompter),
        Some(Commands::New { text }) => cmd_new(&store, text, &mut prompter).map(|_| ()),
        Some(Commands::Delete { id }) => cmd_delete(&store, id, &mut prompter).map(|_| ()),
        Some(Commands::List { sort, reverse }) => cmd_list(&store, sort, reverse, &mut prompter),
        Some(Commands::Complete { id }) => cmd_complete(&store, id, &mut prompter).map(|_| ()),
        Some(Commands::Countdown { duration, title }) => {
            cmd_countdown(&duration, title, &mut TerminalCountdown)
        }
        Some(Commands::Completions { shell }) => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => {
                    eprintln!("Unsupported shell: {}", shell);
                    std::process::exit(exit_codes::USER_ERROR);
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "tasker", &mut io::stdout());
            Ok(())
        }
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("{}", err.diagnostic());
        std::process::exit(err.exit_code());
    }
}
