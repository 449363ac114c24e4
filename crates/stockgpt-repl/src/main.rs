use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use stockgpt_core::assistant::{AssistantClient, Conversation};
use stockgpt_core::config::{default_data_dir, CoreConfig};
use stockgpt_core::news::NewsClient;
use stockgpt_core::store::ThreadStore;
use tokio::io::{AsyncBufReadExt, BufReader};

mod commands;
mod format;
mod state;

use commands::{handle_command, parse_command, CommandResult};
use format::{format_message, print_error_raw, print_system_raw};
use state::ReplState;

// ANSI color codes
pub(crate) const CYAN: &str = "\x1b[36m";
pub(crate) const GREEN: &str = "\x1b[32m";
pub(crate) const YELLOW: &str = "\x1b[33m";
pub(crate) const RED: &str = "\x1b[31m";
pub(crate) const WHITE_BOLD: &str = "\x1b[1;37m";
pub(crate) const DIM: &str = "\x1b[2m";
pub(crate) const RESET: &str = "\x1b[0m";

#[derive(Parser, Debug)]
#[command(name = "stockgpt-repl")]
#[command(about = "Stock GPT terminal client: assistant chat, economic calendar and market news")]
struct Args {
    /// Directory for the saved conversation list (defaults to $STOCKGPT_BASE_DIR or the OS data dir)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn print_lines(lines: &[String]) {
    let mut out = std::io::stdout();
    for line in lines {
        writeln!(out, "{}", line).ok();
    }
    out.flush().ok();
}

fn prompt() {
    let mut out = std::io::stdout();
    write!(out, "{CYAN}›{RESET} ").ok();
    out.flush().ok();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    stockgpt_core::tracing_setup::init_tracing();

    let data_dir = args.data_dir.unwrap_or_else(default_data_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    let config = CoreConfig::from_env(&data_dir);
    if config.assistant.api_key.is_none() || config.assistant.assistant_id.is_none() {
        println!(
            "{}",
            print_system_raw("Assistant credentials missing: set STOCKGPT_OPENAI_API_KEY and STOCKGPT_ASSISTANT_ID.")
        );
    }
    if config.news.api_key.is_none() {
        println!("{}", print_system_raw("News API key missing: set STOCKGPT_NEWS_API_KEY."));
    }

    let conversation = Conversation::new(
        AssistantClient::new(&config.assistant),
        ThreadStore::new(&config.data_dir),
    );
    let mut state = ReplState::new(conversation, NewsClient::new(&config.news));

    if let Err(e) = state.conversation.initialize(&mut state.session).await {
        println!("{}", print_error_raw(&format!("Could not restore a conversation: {}", e)));
    }

    println!();
    println!("{WHITE_BOLD}stockgpt{RESET} {DIM}type /help for commands{RESET}");
    println!();
    let history: Vec<String> = state.session.messages.iter().map(format_message).collect();
    print_lines(&history);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt();

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read input")?,
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        };
        let Some(line) = line else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                print_lines(&[print_error_raw(&message)]);
                continue;
            }
        };

        match handle_command(command, &mut state).await {
            CommandResult::Lines(output) => print_lines(&output),
            CommandResult::Quit => break,
        }
    }

    Ok(())
}
