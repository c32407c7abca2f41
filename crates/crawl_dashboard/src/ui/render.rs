use std::fmt::Write;

use chrono::{DateTime, Local};
use crawl_core::{DashboardView, Freshness, JobAnalysis, Notification, NotifyLevel};

const URL_COLUMN_MAX: usize = 60;

pub fn render(view: &DashboardView) -> String {
    let freshness_label = match view.freshness {
        Freshness::Unloaded => "not loaded".to_string(),
        Freshness::Fresh { generation } => format!("in sync (#{generation})"),
        Freshness::Stale { generation } => format!("refreshing (#{generation})"),
    };

    let mut out = String::new();
    let _ = writeln!(out, "Jobs: {} | {}", view.job_count, freshness_label);
    if view.jobs.is_empty() {
        out.push_str("  (no URLs submitted)\n");
        return out;
    }

    let id_width = view
        .jobs
        .iter()
        .map(|row| row.id.to_string().len())
        .max()
        .unwrap_or(2)
        .max(2);
    let url_width = view
        .jobs
        .iter()
        .map(|row| truncate(&row.url, URL_COLUMN_MAX).chars().count())
        .max()
        .unwrap_or(3)
        .max(3);

    let _ = writeln!(out, "  {:>id_width$}  {:<url_width$}  STATUS", "ID", "URL");
    for row in &view.jobs {
        let _ = writeln!(
            out,
            "  {:>id_width$}  {:<url_width$}  {}",
            row.id,
            truncate(&row.url, URL_COLUMN_MAX),
            row.status.label()
        );
    }
    out
}

pub fn render_notification(notification: &Notification, at: DateTime<Local>) -> String {
    let marker = match notification.level {
        NotifyLevel::Success => "ok",
        NotifyLevel::Error => "error",
    };
    format!("[{}] {}: {}", at.format("%H:%M:%S"), marker, notification.message)
}

/// One indented `name: value` line per analysis field.
pub fn render_analysis(analysis: &JobAnalysis) -> String {
    if analysis.fields.is_empty() {
        return "  (no fields recorded)\n".to_string();
    }
    let width = analysis.fields.keys().map(|name| name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (name, value) in analysis.entries() {
        let _ = writeln!(out, "  {name:<width$}  {value}");
    }
    out
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}
