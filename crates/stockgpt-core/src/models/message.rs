use chrono::{DateTime, Utc};
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A link attached to a chat message (rendered as a tappable button)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLink {
    pub text: String,
    pub url: String,
}

/// A chat message held in session state.
///
/// Messages are not persisted locally; the assistant service is the source of
/// truth and history is re-fetched when a thread is reopened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub is_user: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub links: Vec<MessageLink>,
}

impl Message {
    /// A message typed by the user (local id until the service echoes it back)
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: local_id(),
            text: text.into(),
            is_user: true,
            created_at: Utc::now(),
            links: Vec::new(),
        }
    }

    /// An assistant reply; markdown links in the text become `links`.
    pub fn assistant(id: impl Into<String>, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        let text = text.into();
        let links = extract_links(&text);
        Self {
            id: id.into(),
            text,
            is_user: false,
            created_at,
            links,
        }
    }

    /// Synthetic assistant-side message shown when a reply could not be obtained.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            id: local_id(),
            text: text.into(),
            is_user: false,
            created_at: Utc::now(),
            links: Vec::new(),
        }
    }
}

fn local_id() -> String {
    format!("local-{}", Uuid::new_v4())
}

/// Collect inline markdown links (`[text](url)`) in document order.
///
/// Links with an empty destination are skipped; a link without visible text
/// uses its url as the label. Duplicate urls are kept once.
pub fn extract_links(markdown: &str) -> Vec<MessageLink> {
    let mut links: Vec<MessageLink> = Vec::new();
    let mut current: Option<(String, String)> = None;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Link { dest_url, .. }) => {
                current = Some((dest_url.to_string(), String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, label)) = current.as_mut() {
                    label.push_str(&text);
                }
            }
            Event::End(TagEnd::Link) => {
                if let Some((url, label)) = current.take() {
                    if url.is_empty() || links.iter().any(|l| l.url == url) {
                        continue;
                    }
                    let text = if label.trim().is_empty() {
                        url.clone()
                    } else {
                        label.trim().to_string()
                    };
                    links.push(MessageLink { text, url });
                }
            }
            _ => {}
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_links_in_order() {
        let text = "삼성전자 관련 정보입니다.\n\n\
            - [삼성전자 주가 정보](https://finance.naver.com/item/main.naver?code=005930)\n\
            - [투자자 분석 리포트](https://finance.naver.com/research/)";
        let links = extract_links(text);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].text, "삼성전자 주가 정보");
        assert_eq!(
            links[0].url,
            "https://finance.naver.com/item/main.naver?code=005930"
        );
        assert_eq!(links[1].text, "투자자 분석 리포트");
    }

    #[test]
    fn test_extract_links_dedups_and_labels() {
        let text = "[a](https://x.example) [b](https://x.example) [`code`](https://y.example)";
        let links = extract_links(text);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].text, "a");
        assert_eq!(links[1].text, "code");
    }

    #[test]
    fn test_extract_links_ignores_plain_text() {
        assert!(extract_links("링크가 없는 답변입니다.").is_empty());
    }

    #[test]
    fn test_assistant_message_carries_links() {
        let msg = Message::assistant("msg_1", "[공시](https://dart.fss.or.kr)", Utc::now());
        assert!(!msg.is_user);
        assert_eq!(msg.links.len(), 1);
    }

    #[test]
    fn test_user_messages_get_unique_local_ids() {
        let a = Message::user("hi");
        let b = Message::user("hi");
        assert!(a.is_user);
        assert!(a.id.starts_with("local-"));
        assert_ne!(a.id, b.id);
    }
}
