use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::datetime::format_due;
use crate::task::{Status, Task};

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    dark: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        let theme_cfg = cfg.get("theme").unwrap_or_else(|| "light".to_string());
        let dark = match theme_cfg.to_ascii_lowercase().as_str() {
            "light" => false,
            "dark" => true,
            other => return Err(anyhow!("invalid theme setting: {other}")),
        };

        Ok(Self { color, dark })
    }

    #[tracing::instrument(skip(self, tasks, now))]
    pub fn print_task_table(&mut self, tasks: &[Task], now: DateTime<Utc>) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        if tasks.is_empty() {
            writeln!(out, "No tasks.")?;
            return Ok(());
        }

        let headers = vec![
            "ID".to_string(),
            "Name".to_string(),
            "Due".to_string(),
            "Status".to_string(),
            "Description".to_string(),
        ];

        let mut rows = Vec::with_capacity(tasks.len());

        for task in tasks {
            let id = self.paint(&short_id(task), self.neutral_code());

            let due = format_due(task.date);
            let due = if task.is_overdue(now) {
                self.paint(&due, self.red_code())
            } else {
                due
            };

            let status = self.paint(task.status.label(), self.status_code(task.status));

            rows.push(vec![
                id,
                task.name.clone(),
                due,
                status,
                task.description.clone(),
            ]);
        }

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    #[tracing::instrument(skip(self, task, now))]
    pub fn print_task_detail(&mut self, task: &Task, now: DateTime<Utc>) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        writeln!(out, "id           {}", task.id)?;
        writeln!(out, "name         {}", task.name)?;
        writeln!(out, "description  {}", task.description)?;
        writeln!(
            out,
            "status       {}",
            self.paint(task.status.label(), self.status_code(task.status))
        )?;

        let due = format_due(task.date);
        if task.is_overdue(now) {
            writeln!(out, "due          {} (overdue)", self.paint(&due, self.red_code()))?;
        } else {
            writeln!(out, "due          {due}")?;
        }

        Ok(())
    }

    fn status_code(&self, status: Status) -> &'static str {
        match (status, self.dark) {
            (Status::NotStarted, false) => "31",
            (Status::NotStarted, true) => "91",
            (Status::InProgress, false) => "33",
            (Status::InProgress, true) => "93",
            (Status::Completed, false) => "32",
            (Status::Completed, true) => "92",
        }
    }

    fn red_code(&self) -> &'static str {
        if self.dark { "91" } else { "31" }
    }

    fn neutral_code(&self) -> &'static str {
        if self.dark { "96" } else { "36" }
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

/// First eight hex characters of the id, enough to address a task
/// interactively.
pub fn short_id(task: &Task) -> String {
    task.id.to_string().chars().take(8).collect()
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for idx in 0..column_count {
        write!(writer, "{:-<width$} ", "", width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = &row[idx];
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
