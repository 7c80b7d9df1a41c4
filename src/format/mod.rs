//! Event → notification text.
//!
//! One formatting function per [`Event`] variant. Colors follow the role of
//! each fragment: repository blue, actor yellow, counters/refs green, URLs
//! magenta.

pub mod color;

use tracing::info;

use crate::error::EventError;
use crate::event::Event;
use crate::event::defaults;
use crate::event::payload::{
    Commit, DiscussionCommentEvent, DiscussionEvent, IssueCommentEvent, IssuesEvent,
    PullRequestEvent, PushEvent, RefEvent,
};
pub use color::{Color, colorize};

/// Commit lines rendered per push or pull request; the summary keeps the full count.
pub const MAX_COMMIT_LINES: usize = 8;

/// Ordered notification lines. Empty means there is nothing to deliver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notification {
    lines: Vec<String>,
}

impl Notification {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Newline-joined text.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Applies role colors when enabled.
#[derive(Debug, Clone, Copy)]
struct Palette {
    enabled: bool,
}

impl Palette {
    fn repo(self, text: &str) -> String {
        colorize(text, Color::Blue, self.enabled)
    }

    fn actor(self, text: &str) -> String {
        colorize(text, Color::Yellow, self.enabled)
    }

    fn counter(self, text: &str) -> String {
        colorize(text, Color::Green, self.enabled)
    }

    fn url(self, text: &str) -> String {
        colorize(text, Color::Magenta, self.enabled)
    }
}

/// Render `event` as notification lines.
///
/// Unknown kinds and pushes without commits produce an empty notification.
pub fn format(event: &Event, color: bool) -> Result<Notification, EventError> {
    let palette = Palette { enabled: color };
    let lines = match event {
        Event::Push(push) => format_push(push, palette),
        Event::Issues(issues) => format_issue(issues, palette),
        Event::IssueComment(comment) => format_issue_comment(comment, palette),
        Event::PullRequest(pull) => format_pull_request(pull, palette)?,
        Event::Discussion(discussion) => format_discussion(discussion, palette),
        Event::DiscussionComment(comment) => format_discussion_comment(comment, palette),
        Event::Create(created) => format_ref(created, "created new", palette),
        Event::Delete(deleted) => format_ref(deleted, "delete", palette),
        Event::Unknown(name) => {
            info!(kind = %name, "No actionable event found.");
            Vec::new()
        }
    };
    Ok(Notification::new(lines))
}

fn commit_lines(repo: &str, actor: &str, commits: &[Commit], palette: Palette) -> Vec<String> {
    commits
        .iter()
        .take(MAX_COMMIT_LINES)
        .map(|commit| {
            format!(
                "[{repo}] {actor} {} - {}",
                palette.counter(commit.short_id()),
                commit.title()
            )
        })
        .collect()
}

fn format_push(push: &PushEvent, palette: Palette) -> Vec<String> {
    if push.commits.is_empty() {
        info!(repository = %push.repository.name, "Push without commits, nothing to report");
        return Vec::new();
    }

    let repo = palette.repo(&push.repository.name);
    let pusher = palette.actor(&push.pusher.name);
    let mut lines = vec![format!(
        "[{repo}] {pusher} pushed {} commits to {} {}",
        palette.counter(&push.commits.len().to_string()),
        palette.counter(push.branch()),
        palette.url(&push.compare),
    )];
    lines.extend(commit_lines(&repo, &pusher, &push.commits, palette));
    lines
}

fn issue_verb(action: &str) -> &'static str {
    match action {
        "opened" => "created",
        "edited" => "edited",
        "closed" => "closed",
        _ => "verbed",
    }
}

fn format_issue(event: &IssuesEvent, palette: Palette) -> Vec<String> {
    let issue = &event.issue;
    vec![format!(
        "[{}] {} {} issue #{}: {} - {}",
        palette.repo(&event.repository.name),
        palette.actor(&issue.user.login),
        issue_verb(&event.action),
        palette.counter(&defaults::number_or_unknown(issue.number)),
        issue.title,
        palette.url(&issue.html_url),
    )]
}

fn format_issue_comment(event: &IssueCommentEvent, palette: Palette) -> Vec<String> {
    vec![format!(
        "[{}] {} {} a comment on issue #{}: {} - {}",
        palette.repo(&event.repository.name),
        palette.actor(&event.comment.user.login),
        event.action,
        palette.counter(&event.issue.number.to_string()),
        event.issue.title,
        palette.url(&event.comment.html_url),
    )]
}

fn pull_request_verb(event: &PullRequestEvent) -> Result<String, EventError> {
    let verb = match event.action.as_str() {
        "opened" => "created PR".to_string(),
        "closed" => match event.pull_request.merged {
            Some(true) => "merged PR".to_string(),
            Some(false) => "closed PR".to_string(),
            None => return Err(EventError::MissingField("pull_request.merged")),
        },
        "synchronize" => "pushed new commits to PR".to_string(),
        "edited" => "edited PR".to_string(),
        other => format!("performed '{other}' on PR"),
    };
    Ok(verb)
}

fn format_pull_request(event: &PullRequestEvent, palette: Palette) -> Result<Vec<String>, EventError> {
    let pr = &event.pull_request;
    let repo = palette.repo(&event.repository.name);
    let author = palette.actor(&pr.user.login);
    let mut lines = vec![format!(
        "[{repo}] {author} {} #{} [{}]: {} {}",
        pull_request_verb(event)?,
        palette.counter(&pr.number.to_string()),
        palette.counter(&pr.base.git_ref),
        pr.title,
        palette.url(&event.compare),
    )];
    lines.extend(commit_lines(&repo, &author, &event.commits, palette));
    Ok(lines)
}

fn discussion_verb(action: &str) -> &'static str {
    match action {
        "created" | "opened" => "created",
        "edited" => "edited",
        "closed" => "closed",
        "answered" => "answered",
        _ => "verbed",
    }
}

fn format_discussion(event: &DiscussionEvent, palette: Palette) -> Vec<String> {
    let discussion = &event.discussion;
    vec![format!(
        "[{}] {} {} discussion #{}: {} - {}",
        palette.repo(&event.repository.name),
        palette.actor(&event.sender.login),
        discussion_verb(&event.action),
        palette.counter(&defaults::number_or_unknown(discussion.number)),
        discussion.title,
        palette.url(&discussion.html_url),
    )]
}

fn format_discussion_comment(event: &DiscussionCommentEvent, palette: Palette) -> Vec<String> {
    vec![format!(
        "[{}] {} {} a comment on discussion #{}: {} - {}",
        palette.repo(&event.repository.name),
        palette.actor(&event.comment.user.login),
        event.action,
        palette.counter(&event.discussion.number.to_string()),
        event.discussion.title,
        palette.url(&event.comment.html_url),
    )]
}

fn format_ref(event: &RefEvent, verb: &str, palette: Palette) -> Vec<String> {
    vec![format!(
        "[{}] {} {verb} {}: {}",
        palette.repo(&event.repository.name),
        palette.actor(&event.sender.login),
        event.ref_type,
        palette.counter(&event.git_ref),
    )]
}
