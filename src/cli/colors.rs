//! Terminal colours.
//!
//! Styling is a pure function of the text, a semantic [`Tone`] and the
//! detected [`ColorSupport`]. Nothing here reads or writes global state
//! after detection.

use std::io::IsTerminal;

use console::Style;

/// Whether ANSI styling should be emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSupport {
    /// `NO_COLOR` set, `TERM=dumb`, or stdout is not a terminal.
    None,
    Basic,
}

impl ColorSupport {
    /// Detect color support from environment and terminal capabilities
    #[must_use]
    pub fn detect() -> Self {
        if std::env::var_os("NO_COLOR").is_some() {
            return Self::None;
        }
        if std::env::var_os("FORCE_COLOR").is_some() {
            return Self::Basic;
        }
        if std::env::var("TERM").is_ok_and(|term| term == "dumb") {
            return Self::None;
        }
        if std::io::stdout().is_terminal() {
            Self::Basic
        } else {
            Self::None
        }
    }

    #[must_use]
    pub const fn has_color(self) -> bool {
        matches!(self, Self::Basic)
    }
}

/// What a piece of output means, independent of how it looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Warning,
    Error,
    Info,
    Muted,
    Heading,
}

impl Tone {
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Success => "+",
            Self::Warning => "!",
            Self::Error => "x",
            Self::Info | Self::Muted | Self::Heading => "-",
        }
    }

    fn style(self) -> Style {
        match self {
            Self::Success => Style::new().green(),
            Self::Warning => Style::new().yellow(),
            Self::Error => Style::new().red(),
            Self::Info => Style::new().blue(),
            Self::Muted => Style::new().dim(),
            Self::Heading => Style::new().bold(),
        }
    }
}

/// Style `text` for `tone`; plain text when `support` has no colour.
#[must_use]
pub fn paint(text: &str, tone: Tone, support: ColorSupport) -> String {
    if !support.has_color() {
        return text.to_string();
    }
    tone.style().force_styling(true).apply_to(text).to_string()
}
