//! CI events: the external event kind plus its typed payload.
//!
//! The kind comes from the calling environment (`GITHUB_EVENT_NAME`), not
//! from the payload, and selects how the JSON is interpreted.

pub mod defaults;
pub mod payload;

use std::fmt;
use std::path::Path;

use serde::de::IgnoredAny;
use tracing::debug;

use crate::error::EventError;
use payload::{
    DiscussionCommentEvent, DiscussionEvent, IssueCommentEvent, IssuesEvent, PullRequestEvent,
    PushEvent, RefEvent,
};

/// Which CI trigger produced the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Push,
    Issues,
    IssueComment,
    PullRequest,
    Discussion,
    DiscussionComment,
    Create,
    Delete,
    /// Any trigger the notifier does not report on.
    Unknown(String),
}

impl EventKind {
    /// Map a GitHub event name onto a kind. Never fails.
    pub fn from_name(name: &str) -> Self {
        match name {
            "push" => Self::Push,
            "issues" => Self::Issues,
            "issue_comment" => Self::IssueComment,
            "pull_request" => Self::PullRequest,
            "discussion" => Self::Discussion,
            "discussion_comment" => Self::DiscussionComment,
            "create" => Self::Create,
            "delete" => Self::Delete,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Push => "push",
            Self::Issues => "issues",
            Self::IssueComment => "issue_comment",
            Self::PullRequest => "pull_request",
            Self::Discussion => "discussion",
            Self::DiscussionComment => "discussion_comment",
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Unknown(name) => name,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed CI event.
#[derive(Debug, Clone)]
pub enum Event {
    Push(PushEvent),
    Issues(IssuesEvent),
    IssueComment(IssueCommentEvent),
    PullRequest(PullRequestEvent),
    Discussion(DiscussionEvent),
    DiscussionComment(DiscussionCommentEvent),
    Create(RefEvent),
    Delete(RefEvent),
    Unknown(String),
}

impl Event {
    /// Interpret a JSON payload according to `kind`.
    ///
    /// The payload must be valid JSON even for unknown kinds.
    pub fn from_json(kind: EventKind, json: &str) -> Result<Self, EventError> {
        let event = match kind {
            EventKind::Push => Self::Push(serde_json::from_str(json)?),
            EventKind::Issues => Self::Issues(serde_json::from_str(json)?),
            EventKind::IssueComment => Self::IssueComment(serde_json::from_str(json)?),
            EventKind::PullRequest => Self::PullRequest(serde_json::from_str(json)?),
            EventKind::Discussion => Self::Discussion(serde_json::from_str(json)?),
            EventKind::DiscussionComment => Self::DiscussionComment(serde_json::from_str(json)?),
            EventKind::Create => Self::Create(serde_json::from_str(json)?),
            EventKind::Delete => Self::Delete(serde_json::from_str(json)?),
            EventKind::Unknown(name) => {
                serde_json::from_str::<IgnoredAny>(json)?;
                Self::Unknown(name)
            }
        };
        Ok(event)
    }

    /// Read and interpret an event file.
    pub fn load<P: AsRef<Path>>(kind: EventKind, path: P) -> Result<Self, EventError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), kind = %kind, bytes = content.len(), "Loaded event file");
        Self::from_json(kind, &content)
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::Push(_) => EventKind::Push,
            Self::Issues(_) => EventKind::Issues,
            Self::IssueComment(_) => EventKind::IssueComment,
            Self::PullRequest(_) => EventKind::PullRequest,
            Self::Discussion(_) => EventKind::Discussion,
            Self::DiscussionComment(_) => EventKind::DiscussionComment,
            Self::Create(_) => EventKind::Create,
            Self::Delete(_) => EventKind::Delete,
            Self::Unknown(name) => EventKind::Unknown(name.clone()),
        }
    }
}
