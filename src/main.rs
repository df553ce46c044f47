//! CLI entry point for hotstring
//!
//! Provides a command-line interface for checking hotstring scripts,
//! listing and searching definitions, and trying expansions.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::*;
use hotstring_engine::config::{expand_path, EngineConfig};
use hotstring_engine::core::{find_conflicts, HotstringSummary};
use hotstring_engine::core::import::{ImportOptions, ImportReport};
use hotstring_engine::watch::ScriptWatcher;
use hotstring_engine::{Engine, MemoryHost, Replacement};
use regex::Regex;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "hotstring")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a script and report errors and shadowed triggers
    Check {
        /// Path to hotstring script
        script: PathBuf,

        /// Abort at the first bad line
        #[arg(long)]
        stop_on_error: bool,
    },

    /// List all definitions in a script
    List {
        /// Path to hotstring script
        script: PathBuf,

        /// Print definitions and their options as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find definitions whose replacement contains a query
    Search {
        /// Path to hotstring script
        script: PathBuf,

        /// Text to look for (case-insensitive)
        query: String,

        /// Treat the query as a regular expression
        #[arg(long)]
        regex: bool,
    },

    /// Type text into an in-memory field and print the result
    Expand {
        /// Path to hotstring script
        script: PathBuf,

        /// Text to type
        text: String,

        /// Engine configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Finish timed typing without waiting between characters
        #[arg(long)]
        no_delay: bool,
    },

    /// Re-check a script every time it is saved
    Watch {
        /// Path to hotstring script
        script: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check {
            script,
            stop_on_error,
        } => {
            if !check_script(&script, stop_on_error)? {
                std::process::exit(1);
            }
        }
        Commands::List { script, json } => list_definitions(&script, json)?,
        Commands::Search {
            script,
            query,
            regex,
        } => search_definitions(&script, &query, regex)?,
        Commands::Expand {
            script,
            text,
            config,
            no_delay,
        } => expand_text(&script, &text, config.as_deref(), no_delay)?,
        Commands::Watch { script } => watch_script(&script)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Read a script, expanding `~` in its path
fn read_script(script_path: &Path) -> anyhow::Result<(PathBuf, String)> {
    let path = expand_path(script_path)?;
    let content = fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    Ok((path, content))
}

/// Build an engine from a script, collecting per-line errors
fn load_engine(
    script_path: &Path,
    config: EngineConfig,
) -> anyhow::Result<(Engine<MemoryHost>, ImportReport)> {
    let (path, content) = read_script(script_path)?;
    debug!(path = %path.display(), "importing script");

    let mut engine = Engine::with_config(MemoryHost::new(), config);
    let report = engine.import_script(&content, ImportOptions::default())?;
    Ok((engine, report))
}

/// Import a script and print problems; returns false when any were found
fn check_script(script_path: &Path, stop_on_error: bool) -> anyhow::Result<bool> {
    let (path, content) = read_script(script_path)?;
    println!("{} Importing script: {}", "→".cyan(), path.display());

    let mut engine = Engine::new(MemoryHost::new());
    let report = match engine.import_script(&content, ImportOptions { stop_on_error }) {
        Ok(report) => report,
        Err(err) => {
            println!("{} {}", "✗".red().bold(), err);
            println!(
                "{} {} definitions registered before the error",
                "⚠".yellow(),
                engine.registry().len()
            );
            return Ok(false);
        }
    };

    println!("{} Registered {} definitions\n", "✓".green(), report.added);

    for error in &report.errors {
        println!("  {} {}", "✗".red(), error);
    }
    if !report.errors.is_empty() {
        println!();
    }

    let conflicts = find_conflicts(engine.registry());
    for (i, conflict) in conflicts.iter().enumerate() {
        println!(
            "{} {}",
            format!("Conflict {}", i + 1).yellow().bold(),
            conflict.trigger.cyan()
        );
        println!("  {} {}", "wins:".dimmed(), conflict.winner.green());
        for shadowed in &conflict.shadowed {
            println!("  {} {}", "never fires:".dimmed(), shadowed.magenta());
        }
        println!();
    }

    let clean = report.errors.is_empty() && conflicts.is_empty();
    if clean {
        println!("{} {}", "✓".green().bold(), "Script is clean!".bold());
    } else {
        println!(
            "{} {} error{}, {} conflict{}",
            "⚠".yellow(),
            report.errors.len(),
            if report.errors.len() == 1 { "" } else { "s" },
            conflicts.len(),
            if conflicts.len() == 1 { "" } else { "s" }
        );
    }

    Ok(clean)
}

/// List every definition in registry order
fn list_definitions(script_path: &Path, json: bool) -> anyhow::Result<()> {
    let (engine, report) = load_engine(script_path, EngineConfig::default())?;

    if json {
        let summaries: Vec<HotstringSummary> = engine
            .registry()
            .iter()
            .map(|hotstring| HotstringSummary::from(hotstring.as_ref()))
            .collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!(
        "{}",
        format!("Hotstrings from: {}\n", script_path.display()).bold()
    );

    for hotstring in engine.registry().iter() {
        let label = hotstring.display_label().cyan().bold();
        let output = match &hotstring.replacement {
            Replacement::Text(text) => text.escape_debug().to_string().green(),
            Replacement::Callback(callback) => callback.description().magenta(),
        };

        println!("{} → {}", label, output);
    }

    println!("\n{} Total: {} definitions", "✓".green(), engine.registry().len());
    if !report.errors.is_empty() {
        println!(
            "{} {} line{} skipped, run `check` for details",
            "⚠".yellow(),
            report.errors.len(),
            if report.errors.len() == 1 { "" } else { "s" }
        );
    }

    Ok(())
}

fn search_definitions(script_path: &Path, query: &str, regex: bool) -> anyhow::Result<()> {
    let (engine, _) = load_engine(script_path, EngineConfig::default())?;

    let labels = if regex {
        let pattern = Regex::new(query)
            .map_err(|e| anyhow::anyhow!("Invalid search pattern: {}", e))?;
        engine.search_regex(&pattern)
    } else {
        engine.search(query)
    };

    if labels.is_empty() {
        println!("{} No definitions match {:?}", "✗".red(), query);
        return Ok(());
    }

    for label in &labels {
        println!("  {}", label.cyan());
    }
    println!("\n{} {} match{}", "✓".green(), labels.len(), if labels.len() == 1 { "" } else { "es" });

    Ok(())
}

/// Feed `text` through the engine one character at a time
fn expand_text(
    script_path: &Path,
    text: &str,
    config_path: Option<&Path>,
    no_delay: bool,
) -> anyhow::Result<()> {
    let config = match config_path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let (mut engine, _) = load_engine(script_path, config)?;

    let mut buf = [0u8; 4];
    for ch in text.chars() {
        for outcome in engine.simulate_typing(ch.encode_utf8(&mut buf))? {
            println!(
                "{} {} {}",
                "→".cyan(),
                outcome.label.cyan(),
                format!("({:?})", outcome.delivery).dimmed()
            );
        }

        if engine.is_typing() {
            if no_delay {
                engine.run_typing(|_| {});
            } else {
                engine.run_typing(std::thread::sleep);
            }
        }
    }

    println!("{}", engine.host().text());
    Ok(())
}

fn watch_script(script_path: &Path) -> anyhow::Result<()> {
    let path = expand_path(script_path)?;
    let watcher = ScriptWatcher::new(&path)?;

    check_script(&path, false)?;
    println!("\n{} Watching {} (Ctrl+C to stop)", "→".cyan(), watcher.path().display());

    loop {
        if watcher.wait_for_change(Duration::from_secs(1)) {
            println!("\n{} Script changed\n", "↻".cyan());
            check_script(&path, false)?;
        }
    }
}
