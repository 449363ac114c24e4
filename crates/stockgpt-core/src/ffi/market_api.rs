use super::*;

use chrono::Local;

use crate::calendar;
use crate::news::fetch_news_page;

#[uniffi::export]
impl StockGptCore {
    /// Calendar events in a month, by date
    pub fn calendar_month(&self, year: i32, month: u32) -> Vec<FfiCalendarEvent> {
        calendar::events_in_month(year, month)
            .into_iter()
            .map(FfiCalendarEvent::from)
            .collect()
    }

    /// The next `limit` events from today
    pub fn upcoming_events(&self, limit: u32) -> Vec<FfiCalendarEvent> {
        let today = Local::now().date_naive();
        calendar::upcoming(today, limit as usize)
            .into_iter()
            .map(FfiCalendarEvent::from)
            .collect()
    }

    /// News tabs in display order
    pub fn news_categories(&self) -> Vec<FfiNewsCategory> {
        NewsCategory::ALL.into_iter().map(FfiNewsCategory::from).collect()
    }

    /// Fetch one page (1-based) of a news category by id.
    pub fn fetch_news(&self, category: String, page: u32) -> Result<FfiNewsPage, StockGptError> {
        let client = self.news_client()?;
        let category: NewsCategory = category
            .parse()
            .map_err(|message| StockGptError::InvalidArgument { message })?;
        if page == 0 {
            return Err(StockGptError::InvalidArgument {
                message: "pages start at 1".to_string(),
            });
        }

        let page = get_tokio_runtime().block_on(fetch_news_page(client.as_ref(), category, page))?;
        Ok(page.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calendar_month_formats_events() {
        let core = StockGptCore::new();
        let events = core.calendar_month(2025, 5);
        assert!(!events.is_empty());
        assert!(events.iter().all(|e| e.date.starts_with("2025-05-")));
        assert!(events.iter().any(|e| e.event_type == "FOMC"));
    }

    #[test]
    fn test_news_categories_in_tab_order() {
        let core = StockGptCore::new();
        let categories = core.news_categories();
        assert_eq!(categories.len(), 7);
        assert_eq!(categories[0].id, "all");
        assert_eq!(categories[0].label, "전체");
        assert_eq!(categories[6].id, "crypto_altcoin");
    }
}
