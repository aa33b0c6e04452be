//! # FAQ Harness CLI (`faq`)
//!
//! ## Usage
//!
//! ```bash
//! faq [--config ./config/faq.toml] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `faq ask <user> <question>` | Answer one question and save it to the user's history |
//! | `faq batch <user> <file\|->` | Answer one question per line, in order |
//! | `faq chat [--user <id>]` | Interactive prompt loop |
//! | `faq demo` | Run the built-in demo questions |
//! | `faq context <question>` | Show the retrieval context for a question |
//! | `faq history <user>` | Show a user's saved exchanges |
//! | `faq functions list` | List the callable side functions |
//! | `faq functions call <name> --arg k=v` | Invoke a side function |
//! | `faq status` | Show the effective configuration and loaded tables |
//!
//! Set `RUST_LOG=info` (or `debug`) to see diagnostics on stderr.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use faq_harness::commands;
use faq_harness::config::{self, Config};

/// FAQ Harness CLI: a bilingual FAQ assistant with keyword-scored
/// context retrieval.
#[derive(Parser)]
#[command(
    name = "faq",
    about = "FAQ Harness: a bilingual FAQ assistant with keyword-scored context retrieval",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// When omitted, built-in defaults are used.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question and save the exchange to the user's history.
    Ask {
        /// User id.
        user: String,
        /// The question. Multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
        /// Print the full turn as JSON.
        #[arg(long)]
        json: bool,
        /// Show intent, context status, and function calls.
        #[arg(long, short)]
        verbose: bool,
    },

    /// Answer every non-blank line of a file (`-` for stdin), in order.
    Batch {
        /// User id.
        user: String,
        /// Questions file, one question per line.
        input: PathBuf,
        /// Print the turns as a JSON array.
        #[arg(long)]
        json: bool,
    },

    /// Interactive chat. Type `exit` to quit.
    Chat {
        /// User id.
        #[arg(long, default_value = "default_user")]
        user: String,
    },

    /// Run the built-in demo questions.
    Demo {
        /// User id the demo history is saved under.
        #[arg(long, default_value = "demo_user")]
        user: String,
    },

    /// Show the retrieval context for a question.
    Context {
        /// The question.
        query: String,
        /// Maximum number of matches (defaults to `[retrieval].top_k`).
        #[arg(long)]
        top_k: Option<usize>,
        /// Print the normalized query and a per-signal score breakdown.
        #[arg(long)]
        explain: bool,
        /// Print the context result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show a user's saved exchanges.
    History {
        /// User id.
        user: String,
        #[arg(long)]
        json: bool,
    },

    /// List or call the side functions.
    Functions {
        #[command(subcommand)]
        action: FunctionsAction,
    },

    /// Show the effective configuration and loaded tables.
    Status,
}

#[derive(Subcommand)]
enum FunctionsAction {
    /// List functions, or print their JSON-schema definitions with `--json`.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Invoke a function.
    Call {
        /// Function name (e.g. `get_weather_info`).
        name: String,
        /// Arguments as `key=value` pairs.
        #[arg(long = "arg", value_parser = parse_key_val)]
        args: Vec<(String, String)>,
    },
}

/// Parse a `key=value` pair for `--arg` arguments.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Functions {
        action: FunctionsAction::List { json },
    } = &cli.command
    {
        return commands::run_functions_list(*json);
    }

    let cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::minimal(),
    };

    match cli.command {
        Commands::Ask {
            user,
            question,
            json,
            verbose,
        } => {
            commands::run_ask(&cfg, &user, &question.join(" "), json, verbose).await?;
        }
        Commands::Batch { user, input, json } => {
            commands::run_batch(&cfg, &user, &input, json).await?;
        }
        Commands::Chat { user } => {
            commands::run_chat(&cfg, &user).await?;
        }
        Commands::Demo { user } => {
            commands::run_demo(&cfg, &user).await?;
        }
        Commands::Context {
            query,
            top_k,
            explain,
            json,
        } => {
            commands::run_context(&cfg, &query, top_k, explain, json)?;
        }
        Commands::History { user, json } => {
            commands::run_history(&cfg, &user, json).await?;
        }
        Commands::Functions { action } => match action {
            FunctionsAction::Call { name, args } => {
                commands::run_function_call(&cfg, &name, args)?;
            }
            FunctionsAction::List { .. } => {
                // Handled above (before config loading)
                unreachable!()
            }
        },
        Commands::Status => {
            commands::run_status(&cfg)?;
        }
    }

    Ok(())
}
