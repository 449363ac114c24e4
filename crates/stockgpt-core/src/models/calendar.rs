use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventType {
    /// Central bank rate decisions (FOMC and the Bank of Korea board)
    #[serde(rename = "FOMC")]
    Fomc,
    #[serde(rename = "earnings")]
    Earnings,
    #[serde(rename = "economic")]
    Economic,
    #[serde(rename = "other")]
    Other,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Fomc => "FOMC",
            EventType::Earnings => "earnings",
            EventType::Economic => "economic",
            EventType::Other => "other",
        }
    }
}

/// An entry in the economic events calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    pub date: NaiveDate,
    pub title: &'static str,
    pub description: &'static str,
    pub event_type: EventType,
}
