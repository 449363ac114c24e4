//! In-memory assistant service for tests.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::api::{ApiError, AssistantApi, RemoteMessage, RunInfo, RunLastError};
use crate::models::RunStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FakeCalls {
    pub create_thread: u32,
    pub create_message: u32,
    pub create_run: u32,
    pub retrieve_run: u32,
    pub list_messages: u32,
    pub delete_thread: u32,
}

impl FakeCalls {
    pub fn total(&self) -> u32 {
        self.create_thread
            + self.create_message
            + self.create_run
            + self.retrieve_run
            + self.list_messages
            + self.delete_thread
    }
}

#[derive(Default)]
struct FakeState {
    next_id: u32,
    clock: i64,
    threads: HashMap<String, Vec<RemoteMessage>>,
    /// Runs whose reply has been posted
    answered: Vec<String>,
    statuses: VecDeque<RunStatus>,
    fallback_status: Option<RunStatus>,
    run_error: Option<RunLastError>,
    reply: String,
    /// Completed runs post nothing
    silent: bool,
    retrieve_errors: VecDeque<ApiError>,
    create_thread_error: Option<ApiError>,
    list_error: Option<ApiError>,
    calls: FakeCalls,
}

impl FakeState {
    fn next(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}_{}", prefix, self.next_id)
    }

    fn tick(&mut self) -> i64 {
        self.clock += 1;
        1_735_689_600 + self.clock
    }
}

/// Scripted stand-in for the assistant service.
///
/// Runs report the queued statuses in order, then the fallback status
/// (`completed` unless set). When a run is seen completed, the configured
/// reply is appended to its thread.
pub struct FakeAssistant {
    state: Mutex<FakeState>,
}

impl FakeAssistant {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                reply: "분석 결과입니다.".to_string(),
                ..Default::default()
            }),
        }
    }

    pub fn with_reply(self, reply: &str) -> Self {
        self.state.lock().reply = reply.to_string();
        self
    }

    pub fn without_replies(self) -> Self {
        self.state.lock().silent = true;
        self
    }

    pub fn with_statuses<I: IntoIterator<Item = RunStatus>>(self, statuses: I) -> Self {
        self.state.lock().statuses.extend(statuses);
        self
    }

    pub fn with_fallback_status(self, status: RunStatus) -> Self {
        self.state.lock().fallback_status = Some(status);
        self
    }

    pub fn with_run_error(self, code: &str, message: &str) -> Self {
        self.state.lock().run_error = Some(RunLastError {
            code: code.to_string(),
            message: message.to_string(),
        });
        self
    }

    pub fn with_retrieve_errors<I: IntoIterator<Item = ApiError>>(self, errors: I) -> Self {
        self.state.lock().retrieve_errors.extend(errors);
        self
    }

    pub fn with_create_thread_error(self, err: ApiError) -> Self {
        self.state.lock().create_thread_error = Some(err);
        self
    }

    pub fn with_list_error(self, err: ApiError) -> Self {
        self.state.lock().list_error = Some(err);
        self
    }

    /// Seed a remote thread with (role, text) messages, oldest first
    pub fn with_thread(self, id: &str, messages: &[(&str, &str)]) -> Self {
        {
            let mut state = self.state.lock();
            let mut history = Vec::new();
            for (role, text) in messages {
                let id = state.next("msg");
                let created_at = state.tick();
                history.push(RemoteMessage {
                    id,
                    role: role.to_string(),
                    text: text.to_string(),
                    created_at,
                });
            }
            state.threads.insert(id.to_string(), history);
        }
        self
    }

    pub fn calls(&self) -> FakeCalls {
        self.state.lock().calls
    }

    pub fn has_thread(&self, id: &str) -> bool {
        self.state.lock().threads.contains_key(id)
    }

    /// Messages on a remote thread, oldest first
    pub fn thread_messages(&self, id: &str) -> Vec<RemoteMessage> {
        self.state.lock().threads.get(id).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl AssistantApi for FakeAssistant {
    async fn create_thread(&self) -> Result<String, ApiError> {
        let mut state = self.state.lock();
        state.calls.create_thread += 1;
        if let Some(err) = state.create_thread_error.clone() {
            return Err(err);
        }
        let id = state.next("thread");
        state.threads.insert(id.clone(), Vec::new());
        Ok(id)
    }

    async fn create_message(&self, thread_id: &str, text: &str) -> Result<RemoteMessage, ApiError> {
        let mut state = self.state.lock();
        state.calls.create_message += 1;
        if !state.threads.contains_key(thread_id) {
            return Err(ApiError::Http {
                status: 404,
                message: format!("No thread found with id '{}'.", thread_id),
            });
        }
        let message = RemoteMessage {
            id: state.next("msg"),
            role: "user".to_string(),
            text: text.to_string(),
            created_at: state.tick(),
        };
        if let Some(history) = state.threads.get_mut(thread_id) {
            history.push(message.clone());
        }
        Ok(message)
    }

    async fn create_run(&self, _thread_id: &str) -> Result<RunInfo, ApiError> {
        let mut state = self.state.lock();
        state.calls.create_run += 1;
        Ok(RunInfo {
            id: state.next("run"),
            status: RunStatus::Queued,
            last_error: None,
        })
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<RunInfo, ApiError> {
        let mut state = self.state.lock();
        state.calls.retrieve_run += 1;
        if let Some(err) = state.retrieve_errors.pop_front() {
            return Err(err);
        }

        let status = match state.statuses.pop_front() {
            Some(status) => status,
            None => state.fallback_status.clone().unwrap_or(RunStatus::Completed),
        };

        if status == RunStatus::Completed && !state.silent && !state.answered.iter().any(|r| r == run_id) {
            state.answered.push(run_id.to_string());
            let reply = RemoteMessage {
                id: state.next("msg"),
                role: "assistant".to_string(),
                text: state.reply.clone(),
                created_at: state.tick(),
            };
            if let Some(history) = state.threads.get_mut(thread_id) {
                history.push(reply);
            }
        }

        let last_error = if status == RunStatus::Failed {
            state.run_error.clone()
        } else {
            None
        };

        Ok(RunInfo {
            id: run_id.to_string(),
            status,
            last_error,
        })
    }

    async fn list_messages(&self, thread_id: &str, limit: u32) -> Result<Vec<RemoteMessage>, ApiError> {
        let mut state = self.state.lock();
        state.calls.list_messages += 1;
        if let Some(err) = state.list_error.clone() {
            return Err(err);
        }
        let history = state.threads.get(thread_id).cloned().unwrap_or_default();
        Ok(history.into_iter().rev().take(limit as usize).collect())
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<(), ApiError> {
        let mut state = self.state.lock();
        state.calls.delete_thread += 1;
        state.threads.remove(thread_id);
        Ok(())
    }
}
