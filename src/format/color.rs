//! ANSI color wrapping for notification fragments.

/// Color per semantic role in a notification line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Counters, branches, refs and short commit ids.
    Green,
    /// Actor logins.
    Yellow,
    /// Repository names.
    Blue,
    /// URLs.
    Magenta,
}

impl Color {
    /// SGR foreground code.
    pub const fn code(self) -> u8 {
        match self {
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
            Color::Magenta => 35,
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Wrap `text` in an escape-start/reset pair when `enabled`, else return it unchanged.
pub fn colorize(text: &str, color: Color, enabled: bool) -> String {
    if enabled {
        format!("\x1b[{}m{}{}", color.code(), text, RESET)
    } else {
        text.to_string()
    }
}
