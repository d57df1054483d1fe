//! Terminal rendering of backend responses.

use facedesk_core::{
    ApiResponse, IdentitiesResponse, IdentityEntry, LogResponse, Notifier, PersonDetails,
    RebuildStatus, Severity, StatsResponse,
};
use serde::Serialize;
use std::io::Write;

/// Prints notifications to stderr, one per line.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        tracing::debug!(%severity, message, "notification");
        eprintln!("{}", notification_line(message, severity));
    }
}

fn notification_line(message: &str, severity: Severity) -> String {
    format!("[{severity}] {message}")
}

/// Write a parsed body as pretty JSON.
pub fn print_json<T: Serialize>(out: &mut dyn Write, value: &T) -> anyhow::Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

/// Notify the outcome of a mutating call. Returns whether the backend accepted it.
pub fn report_ack(notifier: &dyn Notifier, ack: &ApiResponse, default_ok: &str, default_err: &str) -> bool {
    if ack.is_success() {
        notifier.notify(non_empty(ack.message.as_deref()).unwrap_or(default_ok), Severity::Success);
    } else {
        notifier.notify(non_empty(ack.error.as_deref()).unwrap_or(default_err), Severity::Error);
    }
    ack.is_success()
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.is_empty())
}

pub fn rebuild_line(status: &RebuildStatus) -> String {
    let mut line = if status.is_running() {
        match status.progress {
            Some(progress) => format!("Rebuild: running ({progress:.0}%)"),
            None => "Rebuild: running".to_string(),
        }
    } else {
        "Rebuild: idle".to_string()
    };
    if let Some(err) = &status.error {
        line.push_str(&format!(" — error: {err}"));
    } else if let Some(message) = &status.message {
        line.push_str(&format!(" — {message}"));
    }
    line
}

pub fn stats_lines(stats: &StatsResponse) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(n) = stats.total_identities {
        lines.push(format!("Identities: {n}"));
    }
    if let Some(n) = stats.total_images {
        lines.push(format!("Images:     {n}"));
    }
    for (key, value) in &stats.extra {
        lines.push(format!("{key}: {}", scalar(value)));
    }
    lines
}

pub fn identity_lines(ids: &IdentitiesResponse) -> Vec<String> {
    if ids.identities.is_empty() {
        return vec!["No identities enrolled".to_string()];
    }
    ids.identities
        .iter()
        .map(|entry| match entry {
            IdentityEntry::Summary(s) => match s.image_count {
                Some(count) => format!("{}  ({count} images)", s.name),
                None => s.name.clone(),
            },
            IdentityEntry::Name(name) => name.clone(),
        })
        .collect()
}

pub fn person_lines(requested: &str, person: &PersonDetails) -> Vec<String> {
    let mut lines = vec![format!("Name: {}", person.name.as_deref().unwrap_or(requested))];
    if let Some(info) = person.info.as_deref().filter(|i| !i.is_empty()) {
        lines.push(format!("Info: {info}"));
    }
    lines.push(format!("Images ({}):", person.images.len()));
    lines.extend(person.images.iter().map(|image| format!("  {image}")));
    lines
}

pub fn log_text(log: &LogResponse) -> String {
    let mut out = String::new();
    if let Some(name) = &log.filename {
        out.push_str(&format!("==> {name} <==\n"));
    }
    out.push_str(log.content.as_deref().unwrap_or("(log is empty)"));
    out
}

fn scalar(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
