//! Fallback values for optional payload fields.
//!
//! | field                                   | fallback      |
//! |-----------------------------------------|---------------|
//! | `repository.name`                       | `"unknown"`   |
//! | `pusher.name`, `sender.login`           | `"unknown"`   |
//! | `issue.user.login`                      | `"unknown"`   |
//! | `action`                                | `"unknown"`   |
//! | `issue.number`, `discussion.number`     | `"unknown"`   |
//! | `issue.title`, `discussion.title`       | `"No title"`  |
//! | `issue.html_url`, `discussion.html_url` | `"No URL"`    |
//! | `ref`, `compare`                        | `""`          |
//! | `commits`                               | `[]`          |
//!
//! Fields absent from this table are required; a payload without them is
//! rejected instead of rendered.

pub const UNKNOWN: &str = "unknown";
pub const NO_TITLE: &str = "No title";
pub const NO_URL: &str = "No URL";

pub fn unknown() -> String {
    UNKNOWN.to_string()
}

pub fn no_title() -> String {
    NO_TITLE.to_string()
}

pub fn no_url() -> String {
    NO_URL.to_string()
}

/// Render an optional counter, falling back to [`UNKNOWN`].
pub fn number_or_unknown(number: Option<u64>) -> String {
    number.map_or_else(unknown, |n| n.to_string())
}
