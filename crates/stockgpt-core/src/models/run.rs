use std::fmt;

use serde::{Deserialize, Deserializer};

/// Status of a server-side assistant run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Completed,
    Failed,
    Incomplete,
    Expired,
    /// A status this client doesn't know about; polled like a pending one
    Unknown(String),
}

impl RunStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "queued" => RunStatus::Queued,
            "in_progress" => RunStatus::InProgress,
            "requires_action" => RunStatus::RequiresAction,
            "cancelling" => RunStatus::Cancelling,
            "cancelled" => RunStatus::Cancelled,
            "completed" => RunStatus::Completed,
            "failed" => RunStatus::Failed,
            "incomplete" => RunStatus::Incomplete,
            "expired" => RunStatus::Expired,
            other => RunStatus::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
            RunStatus::Unknown(s) => s,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed
                | RunStatus::Failed
                | RunStatus::Expired
                | RunStatus::Cancelled
                | RunStatus::Incomplete
        )
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunStatus::Completed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RunStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(RunStatus::parse(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_statuses() {
        assert_eq!(RunStatus::parse("queued"), RunStatus::Queued);
        assert_eq!(RunStatus::parse("in_progress"), RunStatus::InProgress);
        assert_eq!(RunStatus::parse("requires_action"), RunStatus::RequiresAction);
        assert_eq!(RunStatus::parse("completed"), RunStatus::Completed);
        assert_eq!(RunStatus::parse("failed"), RunStatus::Failed);
        assert_eq!(RunStatus::parse("expired"), RunStatus::Expired);
    }

    #[test]
    fn test_unknown_status_is_not_terminal() {
        let status = RunStatus::parse("paused");
        assert_eq!(status, RunStatus::Unknown("paused".to_string()));
        assert!(!status.is_terminal());
        assert_eq!(status.to_string(), "paused");
    }

    #[test]
    fn test_requires_action_is_not_terminal() {
        assert!(!RunStatus::RequiresAction.is_terminal());
        assert!(!RunStatus::Queued.is_terminal());
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Completed.is_success());
        assert!(!RunStatus::Failed.is_success());
    }

    #[test]
    fn test_deserialize_from_json() {
        let status: RunStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(status, RunStatus::InProgress);
    }
}
