use chrono::{Datelike, Local};
use stockgpt_core::assistant::ConversationError;
use stockgpt_core::calendar;
use stockgpt_core::models::NewsCategory;
use tokio_util::sync::CancellationToken;

use crate::format::{
    format_event, format_message, format_news_item, format_thread_line, print_error_raw, print_help_raw,
    print_system_raw,
};
use crate::state::ReplState;
use crate::{DIM, RESET, WHITE_BOLD};

const UPCOMING_LIMIT: usize = 5;

// ─── Parsing ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Empty,
    Send(String),
    New,
    Threads,
    Open(usize),
    Delete(usize),
    /// Month to show; current month when absent
    Calendar(Option<(i32, u32)>),
    Upcoming,
    /// Switch to a category; keep the current one when absent
    News(Option<NewsCategory>),
    More,
    Help,
    Quit,
}

pub(crate) enum CommandResult {
    Lines(Vec<String>),
    Quit,
}

pub(crate) fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Empty);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Send(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (rest, None),
    };

    match (name, arg) {
        ("new", None) => Ok(Command::New),
        ("threads", None) => Ok(Command::Threads),
        ("open", Some(n)) => parse_index(n).map(Command::Open),
        ("delete", Some(n)) => parse_index(n).map(Command::Delete),
        ("open" | "delete", None) => Err(format!("Usage: /{} N", name)),
        ("calendar", None) => Ok(Command::Calendar(None)),
        ("calendar", Some(month)) => parse_month(month).map(|m| Command::Calendar(Some(m))),
        ("upcoming", None) => Ok(Command::Upcoming),
        ("news", None) => Ok(Command::News(None)),
        ("news", Some(category)) => category.parse::<NewsCategory>().map(|c| Command::News(Some(c))),
        ("more", None) => Ok(Command::More),
        ("help", _) => Ok(Command::Help),
        ("quit" | "exit", _) => Ok(Command::Quit),
        _ => Err(format!("Unknown command: /{} (try /help)", rest)),
    }
}

fn parse_index(arg: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("Expected a thread number, got {:?}", arg)),
    }
}

fn parse_month(arg: &str) -> Result<(i32, u32), String> {
    let parsed = arg
        .split_once('-')
        .and_then(|(y, m)| Some((y.parse::<i32>().ok()?, m.parse::<u32>().ok()?)));
    match parsed {
        Some((year, month)) if (1..=12).contains(&month) => Ok((year, month)),
        _ => Err(format!("Expected YYYY-MM, got {:?}", arg)),
    }
}

// ─── Handlers ───────────────────────────────────────────────────────────────

pub(crate) async fn handle_command(command: Command, state: &mut ReplState) -> CommandResult {
    let lines = match command {
        Command::Empty => Vec::new(),
        Command::Send(text) => handle_send_message(&text, state).await,
        Command::New => handle_new_command(state).await,
        Command::Threads => handle_threads_command(state),
        Command::Open(n) => handle_open_command(n, state).await,
        Command::Delete(n) => handle_delete_command(n, state).await,
        Command::Calendar(month) => handle_calendar_command(month),
        Command::Upcoming => handle_upcoming_command(),
        Command::News(category) => handle_news_command(category, state).await,
        Command::More => handle_more_command(state).await,
        Command::Help => vec![print_help_raw()],
        Command::Quit => return CommandResult::Quit,
    };
    CommandResult::Lines(lines)
}

/// Send a chat message. Ctrl-C while waiting cancels the exchange.
pub(crate) async fn handle_send_message(text: &str, state: &mut ReplState) -> Vec<String> {
    println!("{DIM}…{RESET}");

    let cancel = CancellationToken::new();
    let result = {
        let send = state.conversation.send_message(&mut state.session, text, &cancel);
        tokio::pin!(send);

        tokio::select! {
            result = &mut send => result,
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
                send.await
            }
        }
    };

    match result {
        Ok(Some(reply)) => vec![format_message(&reply.message)],
        Ok(None) => Vec::new(),
        Err(ConversationError::Cancelled) => vec![print_system_raw("Cancelled.")],
        Err(e) => {
            tracing::debug!("send failed: {}", e);
            let mut lines = Vec::new();
            if let Some(last) = state.session.messages.last() {
                lines.push(format_message(last));
            }
            lines.push(print_error_raw(&e.to_string()));
            lines
        }
    }
}

async fn handle_new_command(state: &mut ReplState) -> Vec<String> {
    match state.conversation.new_conversation(&mut state.session).await {
        Ok(_) => vec![print_system_raw("New conversation started.")],
        Err(e) => vec![print_error_raw(&e.to_string())],
    }
}

fn handle_threads_command(state: &ReplState) -> Vec<String> {
    let threads = state.conversation.threads();
    if threads.is_empty() {
        return vec![print_system_raw("No conversations yet.")];
    }

    let active = state.session.active_thread_id.as_deref();
    let mut output = vec![format!("{WHITE_BOLD}Conversations:{RESET}")];
    for (i, thread) in threads.iter().enumerate() {
        output.push(format_thread_line(i + 1, thread, active == Some(thread.id.as_str())));
    }
    output
}

async fn handle_open_command(index: usize, state: &mut ReplState) -> Vec<String> {
    let Some(thread_id) = state.thread_id_at(index) else {
        return vec![print_error_raw(&format!("No conversation #{}", index))];
    };

    match state.conversation.select_thread(&mut state.session, &thread_id).await {
        Ok(()) => {
            let mut output = vec![print_system_raw(&format!("Opened conversation #{}.", index))];
            output.extend(state.session.messages.iter().map(format_message));
            output
        }
        Err(e) => vec![print_error_raw(&e.to_string())],
    }
}

async fn handle_delete_command(index: usize, state: &mut ReplState) -> Vec<String> {
    let Some(thread_id) = state.thread_id_at(index) else {
        return vec![print_error_raw(&format!("No conversation #{}", index))];
    };

    let was_active = state.session.active_thread_id.as_deref() == Some(thread_id.as_str());
    match state.conversation.delete_thread(&mut state.session, &thread_id).await {
        Ok(()) => {
            let mut output = vec![print_system_raw(&format!("Deleted conversation #{}.", index))];
            if was_active {
                output.extend(state.session.messages.iter().map(format_message));
            }
            output
        }
        Err(e) => vec![print_error_raw(&e.to_string())],
    }
}

fn handle_calendar_command(month: Option<(i32, u32)>) -> Vec<String> {
    let (year, month) = month.unwrap_or_else(|| {
        let today = Local::now().date_naive();
        (today.year(), today.month())
    });

    let events = calendar::events_in_month(year, month);
    if events.is_empty() {
        return vec![print_system_raw(&format!("No events in {}-{:02}.", year, month))];
    }

    let mut output = vec![format!("{WHITE_BOLD}{}-{:02}{RESET}", year, month)];
    output.extend(events.into_iter().map(format_event));
    output
}

fn handle_upcoming_command() -> Vec<String> {
    let today = Local::now().date_naive();
    let events = calendar::upcoming(today, UPCOMING_LIMIT);
    if events.is_empty() {
        return vec![print_system_raw("No upcoming events.")];
    }
    events.into_iter().map(format_event).collect()
}

async fn handle_news_command(category: Option<NewsCategory>, state: &mut ReplState) -> Vec<String> {
    if let Some(category) = category {
        state.feed.set_category(category);
    }

    let now = chrono::Utc::now();
    if state.feed.page_count() > 0 && !state.feed.is_stale(now) {
        return news_lines(state, 0);
    }

    match state.feed.refresh(&state.news).await {
        Ok(()) => news_lines(state, 0),
        Err(e) => vec![print_error_raw(&e.to_string())],
    }
}

async fn handle_more_command(state: &mut ReplState) -> Vec<String> {
    let shown = state.feed.items().len();
    match state.feed.load_more(&state.news).await {
        Ok(true) => news_lines(state, shown),
        Ok(false) => vec![print_system_raw("No more news.")],
        Err(e) => vec![print_error_raw(&e.to_string())],
    }
}

fn news_lines(state: &ReplState, skip: usize) -> Vec<String> {
    let category = state.feed.category();
    let items = state.feed.items();
    let mut output = Vec::new();
    if skip == 0 {
        output.push(format!("{WHITE_BOLD}{}{RESET}", category.label()));
    }
    output.extend(
        items
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(i, item)| format_news_item(i + 1, item)),
    );
    if state.feed.has_more() {
        output.push(format!("{DIM}/more for older news{RESET}"));
    }
    output
}
