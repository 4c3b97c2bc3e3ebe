use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cli::colors::{ColorSupport, Tone, paint};
use crate::error::{Result, VbError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Serialize)]
pub struct RobotResponse<T> {
    pub status: RobotStatus,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub dry_run: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotStatus {
    Ok,
    Partial { completed: usize, failed: usize },
}

pub fn robot_ok<T: Serialize>(data: T, dry_run: bool) -> RobotResponse<T> {
    RobotResponse {
        status: RobotStatus::Ok,
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        dry_run,
        data,
        warnings: Vec::new(),
    }
}

pub fn robot_partial<T: Serialize>(
    data: T,
    dry_run: bool,
    completed: usize,
    failed: usize,
) -> RobotResponse<T> {
    RobotResponse {
        status: RobotStatus::Partial { completed, failed },
        ..robot_ok(data, dry_run)
    }
}

pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value)
        .map_err(|err| VbError::Config(format!("serialize output: {err}")))?;
    println!("{payload}");
    Ok(())
}

pub struct HumanLayout {
    lines: Vec<String>,
    key_width: usize,
    colors: ColorSupport,
}

impl HumanLayout {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            key_width: 14,
            colors: ColorSupport::detect(),
        }
    }

    pub fn title(&mut self, text: &str) -> &mut Self {
        self.lines.push(paint(text, Tone::Heading, self.colors));
        self.lines.push(String::new());
        self
    }

    pub fn section(&mut self, text: &str) -> &mut Self {
        self.lines.push(String::new());
        self.lines.push(paint(text, Tone::Heading, self.colors));
        self
    }

    pub fn kv(&mut self, key: &str, value: &str) -> &mut Self {
        let key = format!("{key:width$}", width = self.key_width);
        self.lines
            .push(format!("  {} {value}", paint(&key, Tone::Muted, self.colors)));
        self
    }

    pub fn bullet(&mut self, text: &str) -> &mut Self {
        self.lines.push(format!("  - {text}"));
        self
    }

    /// Line prefixed with a tone marker (`+`, `!`, `x`, `-`).
    pub fn status(&mut self, tone: Tone, text: &str) -> &mut Self {
        let line = format!("{} {text}", tone.marker());
        self.lines.push(paint(&line, tone, self.colors));
        self
    }

    /// Dimmed "next step" suggestion.
    pub fn hint(&mut self, text: &str) -> &mut Self {
        let line = format!("  -> {text}");
        self.lines.push(paint(&line, Tone::Muted, self.colors));
        self
    }

    pub fn dry_run_banner(&mut self, dry_run: bool) -> &mut Self {
        if dry_run {
            self.status(Tone::Warning, "dry run: nothing was written");
        }
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    pub fn push_line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    pub fn build(self) -> String {
        self.lines.join("\n")
    }
}

impl Default for HumanLayout {
    fn default() -> Self {
        Self::new()
    }
}

pub fn emit_human(layout: HumanLayout) {
    println!("{}", layout.build());
}

/// First `limit` items, then `... +N more`.
pub fn preview<'a>(items: impl IntoIterator<Item = &'a str>, limit: usize) -> Vec<String> {
    let items: Vec<&str> = items.into_iter().collect();
    let mut lines: Vec<String> = items.iter().take(limit).map(ToString::to_string).collect();
    if items.len() > limit {
        lines.push(format!("... +{} more", items.len() - limit));
    }
    lines
}
