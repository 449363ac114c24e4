//! Compiled-in economic events calendar.
//!
//! The schedule is static data shipped with the app; it is parsed once on
//! first access and never mutated.

use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};

use crate::models::{CalendarEvent, EventType};

type RawEvent = (&'static str, &'static str, &'static str, EventType);

// 2025 schedule: FOMC, Bank of Korea rate meetings, US CPI / GDP / unemployment releases
const EVENTS_2025: &[RawEvent] = &[
    ("2025-01-29", "FOMC 회의", "1월 연방공개시장위원회(FOMC) 정례회의 및 기준금리 결정", EventType::Fomc),
    ("2025-03-19", "FOMC 회의", "3월 연방공개시장위원회(FOMC) 정례회의 및 기준금리 결정", EventType::Fomc),
    ("2025-05-07", "FOMC 회의", "5월 연방공개시장위원회(FOMC) 정례회의 및 기준금리 결정", EventType::Fomc),
    ("2025-06-18", "FOMC 회의", "6월 연방공개시장위원회(FOMC) 정례회의 및 기준금리 결정", EventType::Fomc),
    ("2025-07-30", "FOMC 회의", "7월 연방공개시장위원회(FOMC) 정례회의 및 기준금리 결정", EventType::Fomc),
    ("2025-09-17", "FOMC 회의", "9월 연방공개시장위원회(FOMC) 정례회의 및 기준금리 결정", EventType::Fomc),
    ("2025-11-10", "FOMC 회의", "11월 연방공개시장위원회(FOMC) 정례회의 및 기준금리 결정", EventType::Fomc),
    ("2025-12-29", "FOMC 회의", "12월 연방공개시장위원회(FOMC) 정례회의 및 기준금리 결정", EventType::Fomc),
    ("2025-01-16", "한국 금통위", "한국은행 금융통화위원회 본회의 및 기준금리 결정", EventType::Fomc),
    ("2025-02-25", "한국 금통위", "한국은행 금융통화위원회 본회의 및 기준금리 결정", EventType::Fomc),
    ("2025-04-17", "한국 금통위", "한국은행 금융통화위원회 본회의 및 기준금리 결정", EventType::Fomc),
    ("2025-05-29", "한국 금통위", "한국은행 금융통화위원회 본회의 및 기준금리 결정", EventType::Fomc),
    ("2025-07-10", "한국 금통위", "한국은행 금융통화위원회 본회의 및 기준금리 결정", EventType::Fomc),
    ("2025-08-28", "한국 금통위", "한국은행 금융통화위원회 본회의 및 기준금리 결정", EventType::Fomc),
    ("2025-10-23", "한국 금통위", "한국은행 금융통화위원회 본회의 및 기준금리 결정", EventType::Fomc),
    ("2025-11-27", "한국 금통위", "한국은행 금융통화위원회 본회의 및 기준금리 결정", EventType::Fomc),
    ("2025-01-14", "미국 CPI 발표", "2024년 12월 소비자물가지수(CPI) 발표", EventType::Economic),
    ("2025-02-13", "미국 CPI 발표", "2025년 1월 소비자물가지수(CPI) 발표", EventType::Economic),
    ("2025-03-13", "미국 CPI 발표", "2025년 2월 소비자물가지수(CPI) 발표", EventType::Economic),
    ("2025-04-11", "미국 CPI 발표", "2025년 3월 소비자물가지수(CPI) 발표", EventType::Economic),
    ("2025-05-13", "미국 CPI 발표", "2025년 4월 소비자물가지수(CPI) 발표", EventType::Economic),
    ("2025-06-12", "미국 CPI 발표", "2025년 5월 소비자물가지수(CPI) 발표", EventType::Economic),
    ("2025-07-11", "미국 CPI 발표", "2025년 6월 소비자물가지수(CPI) 발표", EventType::Economic),
    ("2025-08-13", "미국 CPI 발표", "2025년 7월 소비자물가지수(CPI) 발표", EventType::Economic),
    ("2025-09-12", "미국 CPI 발표", "2025년 8월 소비자물가지수(CPI) 발표", EventType::Economic),
    ("2025-10-14", "미국 CPI 발표", "2025년 9월 소비자물가지수(CPI) 발표", EventType::Economic),
    ("2025-11-13", "미국 CPI 발표", "2025년 10월 소비자물가지수(CPI) 발표", EventType::Economic),
    ("2025-12-11", "미국 CPI 발표", "2025년 11월 소비자물가지수(CPI) 발표", EventType::Economic),
    ("2025-01-30", "미국 GDP 발표", "2024년 4분기 GDP 속보치 발표", EventType::Economic),
    ("2025-02-27", "미국 GDP 발표", "2024년 4분기 GDP 수정치 발표", EventType::Economic),
    ("2025-03-27", "미국 GDP 발표", "2024년 4분기 GDP 확정치 발표", EventType::Economic),
    ("2025-04-24", "미국 GDP 발표", "2025년 1분기 GDP 속보치 발표", EventType::Economic),
    ("2025-05-29", "미국 GDP 발표", "2025년 1분기 GDP 수정치 발표", EventType::Economic),
    ("2025-06-26", "미국 GDP 발표", "2025년 1분기 GDP 확정치 발표", EventType::Economic),
    ("2025-07-24", "미국 GDP 발표", "2025년 2분기 GDP 속보치 발표", EventType::Economic),
    ("2025-08-28", "미국 GDP 발표", "2025년 2분기 GDP 수정치 발표", EventType::Economic),
    ("2025-09-25", "미국 GDP 발표", "2025년 2분기 GDP 확정치 발표", EventType::Economic),
    ("2025-10-29", "미국 GDP 발표", "2025년 3분기 GDP 속보치 발표", EventType::Economic),
    ("2025-11-26", "미국 GDP 발표", "2025년 3분기 GDP 수정치 발표", EventType::Economic),
    ("2025-12-23", "미국 GDP 발표", "2025년 3분기 GDP 확정치 발표", EventType::Economic),
    ("2025-01-03", "미국 실업률 발표", "2024년 12월 실업률 발표", EventType::Economic),
    ("2025-02-07", "미국 실업률 발표", "2025년 1월 실업률 발표", EventType::Economic),
    ("2025-03-07", "미국 실업률 발표", "2025년 2월 실업률 발표", EventType::Economic),
    ("2025-04-04", "미국 실업률 발표", "2025년 3월 실업률 발표", EventType::Economic),
    ("2025-05-02", "미국 실업률 발표", "2025년 4월 실업률 발표", EventType::Economic),
    ("2025-06-06", "미국 실업률 발표", "2025년 5월 실업률 발표", EventType::Economic),
    ("2025-07-03", "미국 실업률 발표", "2025년 6월 실업률 발표", EventType::Economic),
    ("2025-08-01", "미국 실업률 발표", "2025년 7월 실업률 발표", EventType::Economic),
    ("2025-09-05", "미국 실업률 발표", "2025년 8월 실업률 발표", EventType::Economic),
    ("2025-10-03", "미국 실업률 발표", "2025년 9월 실업률 발표", EventType::Economic),
    ("2025-11-07", "미국 실업률 발표", "2025년 10월 실업률 발표", EventType::Economic),
    ("2025-12-05", "미국 실업률 발표", "2025년 11월 실업률 발표", EventType::Economic),
];

static EVENTS: OnceLock<Vec<CalendarEvent>> = OnceLock::new();

/// All events, sorted by date (stable for events on the same day).
pub fn all_events() -> &'static [CalendarEvent] {
    EVENTS.get_or_init(|| {
        let mut events: Vec<CalendarEvent> = EVENTS_2025
            .iter()
            .filter_map(|&(date, title, description, event_type)| {
                match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
                    Ok(date) => Some(CalendarEvent {
                        date,
                        title,
                        description,
                        event_type,
                    }),
                    Err(e) => {
                        tracing::warn!("calendar: skipping event {:?} with bad date: {}", title, e);
                        None
                    }
                }
            })
            .collect();
        events.sort_by_key(|e| e.date);
        events
    })
}

pub fn events_in_month(year: i32, month: u32) -> Vec<&'static CalendarEvent> {
    all_events()
        .iter()
        .filter(|e| e.date.year() == year && e.date.month() == month)
        .collect()
}

pub fn events_on(date: NaiveDate) -> Vec<&'static CalendarEvent> {
    all_events().iter().filter(|e| e.date == date).collect()
}

/// Events on or after `from`, earliest first.
pub fn upcoming(from: NaiveDate, limit: usize) -> Vec<&'static CalendarEvent> {
    all_events()
        .iter()
        .filter(|e| e.date >= from)
        .take(limit)
        .collect()
}

pub fn events_of_type(event_type: EventType) -> Vec<&'static CalendarEvent> {
    all_events()
        .iter()
        .filter(|e| e.event_type == event_type)
        .collect()
}
