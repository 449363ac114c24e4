pub mod calendar;
pub mod message;
pub mod news;
pub mod run;
pub mod thread;

pub use calendar::{CalendarEvent, EventType};
pub use message::{Message, MessageLink};
pub use news::{NewsCategory, NewsItem};
pub use run::RunStatus;
pub use thread::ConversationThread;
