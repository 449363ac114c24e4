use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::api::{ApiError, AssistantApi, RemoteMessage, RunInfo, RunLastError, RATE_LIMIT_CODE};
use crate::config::AssistantConfig;
use crate::models::RunStatus;

const ASSISTANTS_BETA_HEADER: (&str, &str) = ("OpenAI-Beta", "assistants=v2");

#[derive(Debug, Deserialize)]
struct ThreadObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TextContent {
    value: String,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    text: Option<TextContent>,
}

#[derive(Debug, Deserialize)]
struct MessageObject {
    id: String,
    role: String,
    #[serde(default)]
    created_at: i64,
    #[serde(default)]
    content: Vec<ContentPart>,
}

impl From<MessageObject> for RemoteMessage {
    fn from(message: MessageObject) -> Self {
        let text = message
            .content
            .into_iter()
            .filter(|part| part.kind == "text")
            .filter_map(|part| part.text.map(|t| t.value))
            .collect::<Vec<_>>()
            .join("\n");

        RemoteMessage {
            id: message.id,
            role: message.role,
            text,
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessageList {
    data: Vec<MessageObject>,
}

#[derive(Debug, Deserialize)]
struct LastErrorObject {
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct RunObject {
    id: String,
    status: RunStatus,
    last_error: Option<LastErrorObject>,
}

impl From<RunObject> for RunInfo {
    fn from(run: RunObject) -> Self {
        RunInfo {
            id: run.id,
            status: run.status,
            last_error: run.last_error.map(|e| RunLastError {
                code: e.code,
                message: e.message,
            }),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<String>,
}

/// Map a non-success response to an [`ApiError`].
///
/// HTTP 429 is a rate limit unless the body says the quota is exhausted
/// (waiting won't help there). A `rate_limit_exceeded` code is a rate limit
/// regardless of status.
fn error_from_response(status: StatusCode, body: &str) -> ApiError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_default();

    let message = if detail.message.is_empty() {
        body.trim().to_string()
    } else {
        detail.message
    };

    let code = detail.code.as_deref().or(detail.kind.as_deref());
    let quota_exhausted = code == Some("insufficient_quota");
    let rate_limited =
        code == Some(RATE_LIMIT_CODE) || (status == StatusCode::TOO_MANY_REQUESTS && !quota_exhausted);

    if rate_limited {
        ApiError::RateLimited { message }
    } else {
        ApiError::Http {
            status: status.as_u16(),
            message,
        }
    }
}

/// Assistants v2 HTTP client
pub struct AssistantClient {
    api_base: String,
    api_key: Option<String>,
    assistant_id: Option<String>,
    client: reqwest::Client,
}

impl AssistantClient {
    pub fn new(config: &AssistantConfig) -> Self {
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            assistant_id: config.assistant_id.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ApiError::MissingCredentials("assistant API key"))?;

        Ok(request
            .bearer_auth(api_key)
            .header(ASSISTANTS_BETA_HEADER.0, ASSISTANTS_BETA_HEADER.1))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T, ApiError> {
        let response = self
            .authorized(request)?
            .send()
            .await
            .map_err(|e| ApiError::Network(format!("{}: {}", what, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_response(status, &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(format!("{}: {}", what, e)))
    }
}

#[async_trait]
impl AssistantApi for AssistantClient {
    async fn create_thread(&self) -> Result<String, ApiError> {
        let request = self
            .client
            .post(self.url("/threads"))
            .json(&serde_json::json!({}));
        let thread: ThreadObject = self.send_json(request, "create thread").await?;
        tracing::info!("assistant: created thread {}", thread.id);
        Ok(thread.id)
    }

    async fn create_message(&self, thread_id: &str, text: &str) -> Result<RemoteMessage, ApiError> {
        let request = self
            .client
            .post(self.url(&format!("/threads/{}/messages", thread_id)))
            .json(&serde_json::json!({
                "role": "user",
                "content": text,
            }));
        let message: MessageObject = self.send_json(request, "create message").await?;
        Ok(message.into())
    }

    async fn create_run(&self, thread_id: &str) -> Result<RunInfo, ApiError> {
        let assistant_id = self
            .assistant_id
            .as_deref()
            .ok_or(ApiError::MissingCredentials("assistant id"))?;

        let request = self
            .client
            .post(self.url(&format!("/threads/{}/runs", thread_id)))
            .json(&serde_json::json!({ "assistant_id": assistant_id }));
        let run: RunObject = self.send_json(request, "create run").await?;
        tracing::debug!("assistant: started run {} on {}", run.id, thread_id);
        Ok(run.into())
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<RunInfo, ApiError> {
        let request = self
            .client
            .get(self.url(&format!("/threads/{}/runs/{}", thread_id, run_id)));
        let run: RunObject = self.send_json(request, "retrieve run").await?;
        Ok(run.into())
    }

    async fn list_messages(&self, thread_id: &str, limit: u32) -> Result<Vec<RemoteMessage>, ApiError> {
        let request = self
            .client
            .get(self.url(&format!("/threads/{}/messages", thread_id)))
            .query(&[("order", "desc".to_string()), ("limit", limit.to_string())]);
        let list: MessageList = self.send_json(request, "list messages").await?;
        Ok(list.data.into_iter().map(RemoteMessage::from).collect())
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<(), ApiError> {
        let request = self
            .client
            .delete(self.url(&format!("/threads/{}", thread_id)));
        let _: serde_json::Value = self.send_json(request, "delete thread").await?;
        tracing::info!("assistant: deleted thread {}", thread_id);
        Ok(())
    }
}
