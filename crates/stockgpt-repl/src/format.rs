use chrono::{DateTime, Local, Utc};
use stockgpt_core::models::{CalendarEvent, ConversationThread, EventType, Message, NewsItem};

use crate::{CYAN, DIM, GREEN, RED, RESET, WHITE_BOLD, YELLOW};

const THREAD_PREVIEW_CHARS: usize = 40;

pub(crate) fn print_error_raw(msg: &str) -> String {
    format!("{RED}error:{RESET} {msg}")
}

pub(crate) fn print_system_raw(msg: &str) -> String {
    format!("{YELLOW}{msg}{RESET}")
}

pub(crate) fn print_help_raw() -> String {
    format!(
        "{WHITE_BOLD}Commands:{RESET}\n\
         \x20 <text>               Ask the assistant\n\
         \x20 /new                 Start a new conversation\n\
         \x20 /threads             List conversations\n\
         \x20 /open N              Open conversation N\n\
         \x20 /delete N            Delete conversation N\n\
         \x20 /calendar [YYYY-MM]  Economic events for a month\n\
         \x20 /upcoming            Next economic events\n\
         \x20 /news [category]     Market news (all, us_market, us_tech, kr_kospi, ...)\n\
         \x20 /more                Load more news\n\
         \x20 /help                Show this help\n\
         \x20 /quit                Exit\n\
         {DIM}Ctrl-C while waiting for a reply cancels it.{RESET}"
    )
}

fn local_time(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%m-%d %H:%M").to_string()
}

pub(crate) fn format_message(message: &Message) -> String {
    if message.is_user {
        return format!("{WHITE_BOLD}you ›{RESET} {}", message.text);
    }

    let mut out = format!("{GREEN}stockgpt ›{RESET} {}", message.text);
    for link in &message.links {
        out.push_str(&format!("\n  {CYAN}↗ {}{RESET} {DIM}{}{RESET}", link.text, link.url));
    }
    out
}

pub(crate) fn format_thread_line(index: usize, thread: &ConversationThread, active: bool) -> String {
    let marker = if active {
        format!("{GREEN}*{RESET}")
    } else {
        " ".to_string()
    };
    let title = if thread.has_title() {
        thread.title.clone()
    } else {
        "새 대화".to_string()
    };
    let preview = thread
        .last_message
        .as_deref()
        .map(|m| truncate(m.lines().next().unwrap_or(""), THREAD_PREVIEW_CHARS))
        .unwrap_or_default();

    format!(
        "{marker} {index:>2}. {WHITE_BOLD}{title}{RESET} {DIM}{} {preview}{RESET}",
        local_time(&thread.created_at)
    )
}

pub(crate) fn format_event(event: &CalendarEvent) -> String {
    let color = match event.event_type {
        EventType::Fomc => RED,
        EventType::Earnings => GREEN,
        EventType::Economic => CYAN,
        EventType::Other => DIM,
    };
    format!(
        "{} {color}[{}]{RESET} {WHITE_BOLD}{}{RESET} {DIM}{}{RESET}",
        event.date.format("%Y-%m-%d"),
        event.event_type.as_str(),
        event.title,
        event.description
    )
}

pub(crate) fn format_news_item(index: usize, item: &NewsItem) -> String {
    format!(
        "{index:>3}. {WHITE_BOLD}{}{RESET}\n     {}\n     {DIM}{} · {} · {}{RESET}",
        item.title, item.summary, item.source, item.date, item.url
    )
}

/// Truncate to `max` characters, marking the cut with an ellipsis
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("삼성전자 실적", 10), "삼성전자 실적");
        assert_eq!(truncate("삼성전자 실적 발표 전망", 5), "삼성전자…");
    }

    #[test]
    fn test_assistant_message_lists_links() {
        let message = Message::assistant("m1", "[IR](https://ir.example.com)", Utc::now());
        let out = format_message(&message);
        assert!(out.contains("stockgpt ›"));
        assert!(out.contains("https://ir.example.com"));
    }

    #[test]
    fn test_untitled_thread_gets_placeholder() {
        let thread = ConversationThread::new("thread_1");
        assert!(format_thread_line(1, &thread, true).contains("새 대화"));
    }
}
