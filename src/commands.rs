//! CLI command implementations.
//!
//! Each `run_*` function backs one `faq` subcommand and prints to stdout.
//! Diagnostics go through `tracing` to stderr, so stdout stays parseable
//! when `--json` is used.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};

use crate::chat::{Assistant, Turn, DEMO_QUESTIONS};
use crate::config::Config;
use crate::functions::{self, FunctionCall, FunctionName};
use crate::knowledge::KnowledgeBase;

/// Answer one question.
pub async fn run_ask(
    config: &Config,
    user_id: &str,
    question: &str,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let assistant = Assistant::from_config(config)?;
    let turn = assistant.ask(user_id, question).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&turn)?);
    } else {
        if verbose {
            print_turn_details(&turn);
        }
        println!("{}", turn.answer);
    }
    Ok(())
}

/// Answer every non-blank line of `input` (`-` reads stdin), in order.
pub async fn run_batch(config: &Config, user_id: &str, input: &Path, json: bool) -> Result<()> {
    let text = if input == Path::new("-") {
        io::read_to_string(io::stdin()).context("Failed to read questions from stdin")?
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read questions file: {}", input.display()))?
    };
    let questions: Vec<&str> = text.lines().collect();

    let assistant = Assistant::from_config(config)?;
    let turns = assistant.ask_batch(user_id, &questions).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&turns)?);
        return Ok(());
    }
    if turns.is_empty() {
        println!("No questions.");
        return Ok(());
    }
    for (i, turn) in turns.iter().enumerate() {
        println!("{}. Q: {}", i + 1, turn.question);
        println!("   A: {}", turn.answer);
        println!();
    }
    Ok(())
}

/// Interactive prompt loop. Prompts are only printed when stdin is a TTY.
pub async fn run_chat(config: &Config, user_id: &str) -> Result<()> {
    let assistant = Assistant::from_config(config)?;
    let interactive = atty::is(atty::Stream::Stdin);

    if interactive {
        println!("FAQ assistant ({}). Type 'exit' to quit.", user_id);
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            print!("you> ");
            io::stdout().flush()?;
        }
        let line = match lines.next() {
            Some(line) => line.context("Failed to read from stdin")?,
            None => break,
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question.to_lowercase().as_str(), "exit" | "quit" | "thoát") {
            break;
        }

        let turn = assistant.ask(user_id, question).await?;
        if interactive {
            println!("bot> {}", turn.answer);
        } else {
            println!("{}", turn.answer);
        }
    }
    Ok(())
}

/// Walk through the built-in demo questions.
pub async fn run_demo(config: &Config, user_id: &str) -> Result<()> {
    let assistant = Assistant::from_config(config)?;
    println!(
        "Corpus: {} ({} entries)",
        assistant.knowledge().source(),
        assistant
            .knowledge()
            .corpus()
            .map(|c| c.entries.len())
            .unwrap_or(0)
    );
    println!();

    for (i, question) in DEMO_QUESTIONS.iter().enumerate() {
        let turn = assistant.ask(user_id, question).await?;
        println!("--- {} ---", i + 1);
        println!("Q: {}", turn.question);
        print_turn_details(&turn);
        println!("A: {}", turn.answer);
        println!();
    }
    Ok(())
}

/// Show the retrieval context for a query, optionally with score breakdowns.
pub fn run_context(
    config: &Config,
    query: &str,
    top_k: Option<usize>,
    explain: bool,
    json: bool,
) -> Result<()> {
    let top_k = top_k.unwrap_or(config.retrieval.top_k);
    if top_k < 1 {
        bail!("--top-k must be >= 1");
    }

    let kb = KnowledgeBase::load(config);
    let result = kb.context(query, top_k);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Status: {}", result.status);
    if explain {
        println!("Normalized: {}", kb.normalize(query));
        if result.matches.is_empty() {
            println!("No matches.");
        }
        for (i, m) in result.matches.iter().enumerate() {
            let b = &m.breakdown;
            println!(
                "{}. [{}] {} score={} (raw={} normalized={} answer={} what_is={} domain={} topic={})",
                i + 1,
                m.source_kind,
                m.label,
                m.score,
                b.raw_keyword,
                b.normalized_keyword,
                b.answer_overlap,
                b.what_is,
                b.domain,
                b.topic_keywords
            );
        }
        println!();
    }
    if result.is_found() {
        print!("{}", result.context);
        if !result.context.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}

/// Print a user's saved exchanges.
pub async fn run_history(config: &Config, user_id: &str, json: bool) -> Result<()> {
    let store = crate::store::create_store(&config.storage)?;
    let entries = store.entries(user_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("No history for {}.", user_id);
        return Ok(());
    }
    for (i, e) in entries.iter().enumerate() {
        if e.timestamp.is_empty() {
            println!("{}. Q: {}", i + 1, e.question);
        } else {
            println!("{}. [{}] Q: {}", i + 1, e.timestamp, e.question);
        }
        println!("   A: {}", e.answer);
    }
    Ok(())
}

pub fn run_functions_list(json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&functions::definitions())?
        );
        return Ok(());
    }
    for f in FunctionName::ALL {
        println!("{:<22} {}", f.as_str(), f.description());
    }
    Ok(())
}

/// Invoke one function with `key=value` arguments.
pub fn run_function_call(config: &Config, name: &str, args: Vec<(String, String)>) -> Result<()> {
    let arguments: Map<String, Value> = args
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();
    let call = FunctionCall::parse(name, &Value::Object(arguments))?;
    let kb = KnowledgeBase::load(config);
    println!("{}", functions::execute(&call, &kb, config.retrieval.top_k));
    Ok(())
}

/// Summarize the effective configuration and loaded tables.
pub fn run_status(config: &Config) -> Result<()> {
    let kb = KnowledgeBase::load(config);
    let entries = kb.corpus().map(|c| c.entries.len()).unwrap_or(0);

    println!("corpus:           {}", kb.source());
    println!("entries:          {}", entries);
    println!("topics:           {}", kb.topics().len());
    println!("terms:            {}", kb.terms().len());
    println!("top_k:            {}", config.retrieval.top_k);
    println!(
        "storage:          {} ({})",
        config.storage.backend,
        config.storage.path.display()
    );
    println!("generator:        {}", config.generator.provider);
    println!(
        "function calling: {}",
        if config.generator.function_calling {
            "on"
        } else {
            "off"
        }
    );
    Ok(())
}

fn print_turn_details(turn: &Turn) {
    println!(
        "   intent: {} ({}, confidence {:.2})",
        turn.intent.intent, turn.intent.language, turn.intent.confidence
    );
    println!(
        "   context: {} ({} matches)",
        turn.context_status,
        turn.matches.len()
    );
    for call in &turn.function_calls {
        println!("   function: {}({})", call.name, call.arguments);
    }
}
