//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use evidentia_domain::Direction;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Whether commands should print JSON instead of tables.
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Pretty-printed JSON.
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }

    /// Render rows under `headers` as a rounded table.
    ///
    /// An empty row set renders `empty` instead.
    pub fn table<R, S>(&self, headers: &[&str], rows: R, empty: &str) -> String
    where
        R: IntoIterator<Item = Vec<S>>,
        S: Into<String>,
    {
        let mut builder = Builder::default();
        builder.push_record(headers.iter().map(|h| h.to_string()));

        let mut count = 0;
        for row in rows {
            let cells: Vec<String> = row.into_iter().map(Into::into).collect();
            builder.push_record(cells);
            count += 1;
        }
        if count == 0 {
            return self.colorize(empty, "yellow");
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format a heading line.
    pub fn heading(&self, text: &str) -> String {
        if self.color_enabled {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// Direction symbol, green for support and red for contradiction.
    pub fn direction(&self, direction: Direction) -> String {
        let color = match direction {
            Direction::Supports => "green",
            Direction::Contradicts => "red",
            Direction::Mixed => "yellow",
        };
        self.colorize(direction.symbol(), color)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Score with one decimal, the way reports show it.
pub fn format_score(score: f64) -> String {
    format!("{:.1}", score)
}

/// Optional text, or `—` when absent.
pub fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => "—".to_string(),
    }
}

/// Cut `text` to at most `max` characters, marking the cut with `…`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept)
}
