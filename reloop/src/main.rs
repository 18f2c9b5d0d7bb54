//! Recursive self-refinement loop runner CLI.
//!
//! `reloop run` executes one task through the generate → critique → refine →
//! decide cycle and prints the final solution to stdout. Diagnostics go to
//! stderr; the exit code encodes why the run halted (see [`exit_codes`]).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use reloop::core::decide::HaltReason;
use reloop::exit_codes;
use reloop::io::config::{RunnerConfig, load_config, write_config};
use reloop::io::oracle::CommandOracle;
use reloop::io::transcript::write_transcript;
use reloop::logging;
use reloop::looping::run_loop;

#[derive(Parser)]
#[command(
    name = "reloop",
    version,
    about = "Recursive self-refinement loop runner"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default `reloop.toml` config file.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Run the refinement loop on a single task.
    Run {
        /// Task text.
        #[arg(long, conflicts_with = "task_file")]
        task: Option<String>,
        /// Read the task from a file instead.
        #[arg(long)]
        task_file: Option<PathBuf>,
        /// Config file path.
        #[arg(long, default_value = "reloop.toml")]
        config: PathBuf,
        /// Override the configured step ceiling.
        #[arg(long)]
        max_steps: Option<u32>,
        /// Write run artifacts (meta, solutions, critiques) to this directory.
        #[arg(long)]
        transcript_dir: Option<PathBuf>,
    },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Init { force } => cmd_init(force),
        Command::Run {
            task,
            task_file,
            config,
            max_steps,
            transcript_dir,
        } => cmd_run(task, task_file, &config, max_steps, transcript_dir.as_deref()),
    }
}

fn cmd_init(force: bool) -> Result<i32> {
    let path = Path::new("reloop.toml");
    if path.exists() && !force {
        bail!("reloop.toml already exists (use --force to overwrite)");
    }
    write_config(path, &RunnerConfig::default())?;
    Ok(exit_codes::OK)
}

fn cmd_run(
    task: Option<String>,
    task_file: Option<PathBuf>,
    config_path: &Path,
    max_steps: Option<u32>,
    transcript_dir: Option<&Path>,
) -> Result<i32> {
    let mut cfg = load_config(config_path)?;
    if let Some(ceiling) = max_steps {
        cfg.max_steps = ceiling;
        cfg.validate()?;
    }

    let task = resolve_task(task, task_file.as_deref())?;

    let oracle = CommandOracle::new(
        cfg.oracle.command.clone(),
        Duration::from_secs(cfg.oracle.timeout_secs),
        cfg.oracle.output_limit_bytes,
    )?;

    let outcome = run_loop(&oracle, &task, cfg.max_steps, &cfg.policy(), |cycle| {
        info!(
            step = cycle.step,
            severity = ?cycle.severity,
            improvement_delta = ?cycle.improvement_delta,
            "cycle complete"
        );
    })?;

    if let Some(dir) = transcript_dir {
        write_transcript(dir, &outcome.state, outcome.halt)
            .with_context(|| format!("write transcript {}", dir.display()))?;
    }

    println!("{}", outcome.final_solution());
    info!(
        steps = outcome.state.step_count(),
        versions = outcome.state.solution_history.len(),
        reason = outcome.halt.as_str(),
        "run finished"
    );

    Ok(match outcome.halt {
        HaltReason::Converged => exit_codes::OK,
        HaltReason::CeilingReached => exit_codes::CEILING,
        HaltReason::Degenerated => exit_codes::STALLED,
    })
}

fn resolve_task(task: Option<String>, task_file: Option<&Path>) -> Result<String> {
    let text = match (task, task_file) {
        (Some(text), None) => text,
        (None, Some(path)) => {
            fs::read_to_string(path).with_context(|| format!("read task {}", path.display()))?
        }
        (None, None) => bail!("a task is required (--task or --task-file)"),
        (Some(_), Some(_)) => bail!("--task and --task-file are mutually exclusive"),
    };
    if text.trim().is_empty() {
        bail!("task must be non-empty");
    }
    Ok(text)
}
