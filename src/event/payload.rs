//! Typed GitHub webhook payloads, reduced to the fields notifications use.
//!
//! Optional fields carry `#[serde(default)]` backed by [`super::defaults`];
//! everything else is required and a missing value fails deserialization.

use serde::Deserialize;

use super::defaults;

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    #[serde(default = "defaults::unknown")]
    pub name: String,
}

impl Default for Repository {
    fn default() -> Self {
        Self {
            name: defaults::unknown(),
        }
    }
}

/// A user object whose login falls back to `"unknown"`.
#[derive(Debug, Clone, Deserialize)]
pub struct Actor {
    #[serde(default = "defaults::unknown")]
    pub login: String,
}

impl Default for Actor {
    fn default() -> Self {
        Self {
            login: defaults::unknown(),
        }
    }
}

/// A user object whose login must be present.
#[derive(Debug, Clone, Deserialize)]
pub struct Author {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pusher {
    #[serde(default = "defaults::unknown")]
    pub name: String,
}

impl Default for Pusher {
    fn default() -> Self {
        Self {
            name: defaults::unknown(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Commit {
    pub id: String,
    pub message: String,
}

impl Commit {
    /// First seven characters of the commit id.
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(7) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }

    /// First line of the commit message; a bare `\r` also ends it.
    pub fn title(&self) -> &str {
        self.message.split(['\n', '\r']).next().unwrap_or_default()
    }
}

/// Issue or discussion as referenced by its own event.
#[derive(Debug, Clone, Deserialize)]
pub struct Thread {
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default = "defaults::no_title")]
    pub title: String,
    #[serde(default = "defaults::no_url")]
    pub html_url: String,
    #[serde(default)]
    pub user: Actor,
}

impl Default for Thread {
    fn default() -> Self {
        Self {
            number: None,
            title: defaults::no_title(),
            html_url: defaults::no_url(),
            user: Actor::default(),
        }
    }
}

/// Issue or discussion as referenced by a comment event.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadRef {
    pub number: u64,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    pub user: Author,
    pub html_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushEvent {
    #[serde(default)]
    pub repository: Repository,
    #[serde(default)]
    pub pusher: Pusher,
    #[serde(default, rename = "ref")]
    pub git_ref: String,
    #[serde(default)]
    pub compare: String,
    #[serde(default)]
    pub commits: Vec<Commit>,
}

impl PushEvent {
    /// Last path segment of the pushed ref (`refs/heads/main` → `main`).
    pub fn branch(&self) -> &str {
        self.git_ref.rsplit('/').next().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssuesEvent {
    #[serde(default)]
    pub repository: Repository,
    #[serde(default = "defaults::unknown")]
    pub action: String,
    #[serde(default)]
    pub issue: Thread,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueCommentEvent {
    #[serde(default)]
    pub repository: Repository,
    #[serde(default = "defaults::unknown")]
    pub action: String,
    pub comment: Comment,
    pub issue: ThreadRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BaseRef {
    #[serde(rename = "ref")]
    pub git_ref: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub user: Author,
    pub base: BaseRef,
    /// Only consulted for `closed`, where it is required.
    #[serde(default)]
    pub merged: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
    #[serde(default)]
    pub repository: Repository,
    #[serde(default = "defaults::unknown")]
    pub action: String,
    pub pull_request: PullRequest,
    #[serde(default)]
    pub compare: String,
    /// Usually absent (e.g. `synchronize`); treated as no commits.
    #[serde(default)]
    pub commits: Vec<Commit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscussionEvent {
    #[serde(default)]
    pub repository: Repository,
    #[serde(default = "defaults::unknown")]
    pub action: String,
    #[serde(default)]
    pub discussion: Thread,
    pub sender: Actor,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscussionCommentEvent {
    #[serde(default)]
    pub repository: Repository,
    #[serde(default = "defaults::unknown")]
    pub action: String,
    pub comment: Comment,
    pub discussion: ThreadRef,
}

/// Payload shared by `create` and `delete`.
#[derive(Debug, Clone, Deserialize)]
pub struct RefEvent {
    #[serde(default)]
    pub repository: Repository,
    pub sender: Author,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub ref_type: String,
}
