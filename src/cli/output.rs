use chrono::{DateTime, Utc};
use colored::Colorize;
use console::style;
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Robot,
}

#[derive(Serialize)]
pub struct RobotResponse<T> {
    pub status: RobotStatus,
    pub timestamp: DateTime<Utc>,
    pub version: String,
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

pub fn robot_ok<T: Serialize>(data: T) -> RobotResponse<T> {
    RobotResponse {
        status: RobotStatus::Ok,
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data,
        warnings: Vec::new(),
    }
}

pub fn robot_partial<T: Serialize>(data: T, completed: usize, warnings: Vec<String>) -> RobotResponse<T> {
    RobotResponse {
        status: if warnings.is_empty() {
            RobotStatus::Ok
        } else {
            RobotStatus::Partial {
                completed,
                failed: warnings.len(),
            }
        },
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data,
        warnings,
    }
}

pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value)?;
    println!("{payload}");
    Ok(())
}

/// Print a success line: `✓ message`.
pub fn success(message: impl AsRef<str>) {
    println!("{} {}", "✓".green().bold(), message.as_ref());
}

/// Print an indented detail line under a previous message.
pub fn detail(message: impl AsRef<str>) {
    println!("  {}", message.as_ref());
}

/// Print a warning to stderr.
pub fn warning(message: impl AsRef<str>) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.as_ref());
}

pub struct HumanLayout {
    lines: Vec<String>,
    key_width: usize,
}

impl Default for HumanLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanLayout {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            key_width: 12,
        }
    }

    pub fn title(&mut self, text: &str) -> &mut Self {
        self.lines.push(style(text).bold().to_string());
        self
    }

    pub fn section(&mut self, text: &str) -> &mut Self {
        self.lines.push(String::new());
        self.lines.push(style(text).bold().to_string());
        self
    }

    /// Key/value row; empty values are omitted.
    pub fn kv(&mut self, key: &str, value: &str) -> &mut Self {
        if !value.is_empty() {
            let key = format!("{key}:");
            self.lines.push(format!(
                "  {} {value}",
                style(format!("{key:width$}", width = self.key_width)).dim()
            ));
        }
        self
    }

    pub fn bullet(&mut self, text: &str) -> &mut Self {
        self.lines.push(format!("  - {text}"));
        self
    }

    pub fn push_line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    #[must_use]
    pub fn build(self) -> String {
        self.lines.join("\n")
    }
}

pub fn emit_human(layout: HumanLayout) {
    println!("{}", layout.build());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_skips_empty_values() {
        console::set_colors_enabled(false);
        let mut layout = HumanLayout::new();
        layout.title("weather").kv("Version", "1.0.0").kv("Author", "");
        let text = layout.build();
        assert!(text.contains("Version:"));
        assert!(text.contains("1.0.0"));
        assert!(!text.contains("Author"));
    }

    #[test]
    fn partial_status_counts_failures() {
        let response = robot_partial(vec!["a"], 1, vec!["b failed".to_string()]);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"]["partial"]["completed"], 1);
        assert_eq!(json["status"]["partial"]["failed"], 1);

        let response = robot_partial(vec!["a"], 1, Vec::new());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "ok");
    }
}
