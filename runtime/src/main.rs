// Copyright 2026 Record Scout Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use record_scout_runtime::cli::{self, output};
use record_scout_runtime::cli::run_cmd::RunOptions;
use record_scout_runtime::config::Overrides;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "record-scout",
    about = "Record Scout: find catalog maps whose leaderboard lists a tracked player",
    version,
    after_help = "Run 'record-scout <command> --help' for details on each command.\nRun 'record-scout' with no command to start a run with default settings."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Log filter (e.g. "debug", "record_scout=trace"); overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the catalog, gate by record count, and search leaderboards
    Run(RunArgs),
    /// Inspect or extend the persisted exclusion list
    Exclusions {
        #[command(subcommand)]
        action: ExclusionsAction,
    },
    /// Check environment and diagnose issues
    Doctor {
        /// Configuration file to check
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[derive(Args, Default)]
struct RunArgs {
    /// Configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Player to search for on each leaderboard
    #[arg(long)]
    tracked: Option<String>,
    /// Lowest eligible record count (inclusive)
    #[arg(long)]
    min: Option<u64>,
    /// Highest eligible record count (inclusive)
    #[arg(long)]
    max: Option<u64>,
    /// First upload date (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Last upload date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    end: Option<NaiveDate>,
    /// Months before the end date when no start is given
    #[arg(long)]
    months: Option<u32>,
    /// Extra days before the end date when no start is given
    #[arg(long)]
    days: Option<u64>,
    /// Exclusion list file
    #[arg(long)]
    exclusions: Option<PathBuf>,
    /// Directory for the report file
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Maximum "load more" clicks per leaderboard
    #[arg(long)]
    max_expansions: Option<u32>,
    /// Show the browser window
    #[arg(long)]
    headful: bool,
}

impl From<RunArgs> for RunOptions {
    fn from(args: RunArgs) -> Self {
        Self {
            config: args.config,
            overrides: Overrides {
                tracked: args.tracked,
                min: args.min,
                max: args.max,
                start: args.start,
                end: args.end,
                months: args.months,
                days: args.days,
                exclusions: args.exclusions,
                output_dir: args.output_dir,
                max_expansions: args.max_expansions,
            },
            headful: args.headful,
        }
    }
}

#[derive(Subcommand)]
enum ExclusionsAction {
    /// Print every listed identity
    List {
        /// Configuration file naming the list
        #[arg(long)]
        config: Option<PathBuf>,
        /// List file (overrides the configuration)
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Add an identity to the list
    Add {
        /// Map name to exclude
        name: String,
        /// Configuration file naming the list
        #[arg(long)]
        config: Option<PathBuf>,
        /// List file (overrides the configuration)
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var(output::JSON_ENV, "1");
    }
    if cli.quiet {
        std::env::set_var(output::QUIET_ENV, "1");
    }
    cli::logging::init(cli.json, cli.quiet, cli.verbose, cli.log_level.as_deref());

    let result = match cli.command {
        None => cli::run_cmd::run(RunOptions::default()).await,
        Some(Commands::Run(args)) => cli::run_cmd::run(args.into()).await,
        Some(Commands::Exclusions { action }) => match action {
            ExclusionsAction::List { config, file } => {
                cli::exclusions_cmd::run_list(config.as_deref(), file.as_deref()).await
            }
            ExclusionsAction::Add { name, config, file } => {
                cli::exclusions_cmd::run_add(config.as_deref(), file.as_deref(), &name).await
            }
        },
        Some(Commands::Doctor { config }) => cli::doctor::run(config.as_deref()).await,
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "record-scout", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if output::is_json() {
            output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        } else if !output::is_quiet() {
            eprintln!("  Error: {e:#}");
        }
        std::process::exit(1);
    }

    result
}
