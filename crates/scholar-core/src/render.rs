use std::io::{self, IsTerminal, Write};

use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::datetime::LocalDay;
use crate::stats::{TaskStats, Urgency, classify_urgency, format_due_label};
use crate::task::{Priority, Task};

const PROGRESS_BAR_WIDTH: usize = 20;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> Self {
        Self { color: cfg.color }
    }

    /// Pending tasks first, then completed, each group in insertion order.
    #[tracing::instrument(skip(self, pending, completed, day))]
    pub fn print_task_groups(
        &mut self,
        pending: &[&Task],
        completed: &[&Task],
        day: &LocalDay,
    ) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        if !pending.is_empty() {
            writeln!(out, "Pending Tasks ({})", pending.len())?;
            self.write_task_table(&mut out, pending, day)?;
        }

        if !completed.is_empty() {
            if !pending.is_empty() {
                writeln!(out)?;
            }
            writeln!(out, "Completed Tasks ({})", completed.len())?;
            self.write_task_table(&mut out, completed, day)?;
        }

        Ok(())
    }

    fn write_task_table<W: Write>(
        &self,
        writer: &mut W,
        tasks: &[&Task],
        day: &LocalDay,
    ) -> anyhow::Result<()> {
        let headers = ["ID", "Task", "Subject", "Pri", "Due"];
        let mut rows = Vec::with_capacity(tasks.len());

        for task in tasks {
            let due = match task.due {
                Some(due) => {
                    let label = format_due_label(due, day);
                    match classify_urgency(task, day) {
                        Urgency::Overdue => self.paint(&label, "31"),
                        Urgency::DueToday | Urgency::DueTomorrow if !task.completed => {
                            self.paint(&label, "33")
                        }
                        _ => label,
                    }
                }
                None => String::new(),
            };

            let priority = self.paint(task.priority.label(), priority_color(task.priority));

            rows.push(vec![
                task.id.to_string(),
                task.title.clone(),
                task.subject.clone(),
                priority,
                due,
            ]);
        }

        write_table(writer, &headers, rows)?;
        Ok(())
    }

    #[tracing::instrument(skip(self, task, day))]
    pub fn print_task_info(&mut self, task: &Task, day: &LocalDay) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        writeln!(out, "id        {}", task.id)?;
        writeln!(out, "uuid      {}", task.uuid)?;
        writeln!(out, "title     {}", task.title)?;
        writeln!(out, "subject   {}", task.subject)?;
        writeln!(out, "priority  {}", task.priority.label())?;
        if let Some(note) = &task.note {
            writeln!(out, "note      {note}")?;
        }
        if let Some(due) = task.due {
            writeln!(out, "due       {}", format_due_label(due, day))?;
        }
        writeln!(
            out,
            "status    {}",
            if task.completed { "completed" } else { "pending" }
        )?;
        writeln!(out, "created   {}", task.created.format("%Y-%m-%d %H:%M"))?;

        Ok(())
    }

    /// The statistics panel. Sections with nothing to say are omitted,
    /// like the cards in a dashboard that only appear when non-empty.
    #[tracing::instrument(skip(self, stats))]
    pub fn print_stats(&mut self, stats: &TaskStats) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        let total = stats.completed_count + stats.pending_count;

        writeln!(out, "Overall Progress")?;
        let filled = ((stats.completion_rate / 100.0) * PROGRESS_BAR_WIDTH as f64).round()
            as usize;
        let filled = filled.min(PROGRESS_BAR_WIDTH);
        writeln!(
            out,
            "  [{}{}] {:.0}% ({} of {} completed)",
            "#".repeat(filled),
            "-".repeat(PROGRESS_BAR_WIDTH - filled),
            stats.completion_rate,
            stats.completed_count,
            total,
        )?;

        writeln!(out)?;
        writeln!(out, "  Completed  {}", stats.completed_count)?;
        writeln!(out, "  Pending    {}", stats.pending_count)?;

        let urgent = [
            ("Overdue", stats.overdue_count, "31"),
            ("Due Today", stats.due_today_count, "33"),
            ("Due Tomorrow", stats.due_tomorrow_count, ""),
        ];
        if urgent.iter().any(|(_, count, _)| *count > 0) {
            writeln!(out)?;
            writeln!(out, "Urgent Tasks")?;
            for (label, count, code) in urgent {
                if count > 0 {
                    // Pad before painting so escape codes don't skew the column.
                    writeln!(out, "  {}{}", self.paint(&format!("{label:<13}"), code), count)?;
                }
            }
        }

        let priorities = [
            ("High", stats.priority_breakdown.high, "31"),
            ("Medium", stats.priority_breakdown.medium, "33"),
            ("Low", stats.priority_breakdown.low, "32"),
        ];
        if stats.pending_count > 0 {
            writeln!(out)?;
            writeln!(out, "Priority Breakdown")?;
            for (label, count, code) in priorities {
                if count > 0 {
                    writeln!(out, "  {}{}", self.paint(&format!("{label:<13}"), code), count)?;
                }
            }
        }

        if !stats.top_subjects.is_empty() {
            writeln!(out)?;
            writeln!(out, "Active Subjects")?;
            let width = stats
                .top_subjects
                .iter()
                .map(|entry| UnicodeWidthStr::width(entry.subject.as_str()))
                .max()
                .unwrap_or(0);
            for entry in &stats.top_subjects {
                let padding = width.saturating_sub(UnicodeWidthStr::width(entry.subject.as_str()));
                writeln!(
                    out,
                    "  {}{}  {}",
                    entry.subject,
                    " ".repeat(padding),
                    entry.pending
                )?;
            }
        }

        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if code.is_empty() || !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn priority_color(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "31",
        Priority::Medium => "33",
        Priority::Low => "32",
    }
}

fn write_table<W: Write>(
    writer: &mut W,
    headers: &[&str],
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths: Vec<usize> = headers
        .iter()
        .map(|header| UnicodeWidthStr::width(*header))
        .collect();

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(visible_width(cell));
        }
    }

    for (idx, header) in headers.iter().enumerate() {
        let pad = widths[idx] - UnicodeWidthStr::width(*header);
        write!(writer, "{}{}  ", header, " ".repeat(pad))?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "{}  ", "-".repeat(*width))?;
    }
    writeln!(writer)?;

    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let pad = widths[idx].saturating_sub(visible_width(cell));
            write!(writer, "{}{}  ", cell, " ".repeat(pad))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn visible_width(cell: &str) -> usize {
    UnicodeWidthStr::width(strip_ansi(cell).as_str())
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

#[cfg(test)]
mod tests {
    use super::strip_ansi;

    #[test]
    fn strips_color_escapes() {
        assert_eq!(strip_ansi("\x1b[31mOverdue\x1b[0m"), "Overdue");
        assert_eq!(strip_ansi("plain"), "plain");
    }
}
