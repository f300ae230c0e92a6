//! Text and JSON rendering of marker diagnostics for host tooling and tests.

use serde::Serialize;

use super::{Diagnostic, DiagnosticCode, FileCache, LineCol, Span};

pub const JSON_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorFormat {
    Human,
    Short,
    Json,
}

/// Render a collection of diagnostics to a single string.
#[must_use]
pub fn format_diagnostics(
    diagnostics: &[Diagnostic],
    files: &FileCache,
    format: ErrorFormat,
) -> String {
    let mut rendered = String::new();
    for (index, diagnostic) in diagnostics.iter().enumerate() {
        if index > 0 {
            rendered.push('\n');
        }
        let chunk = match format {
            ErrorFormat::Human => render_human(diagnostic, files),
            ErrorFormat::Short => render_short(diagnostic, files),
            ErrorFormat::Json => render_json(diagnostic, files),
        };
        rendered.push_str(&chunk);
    }
    rendered
}

fn render_human(diagnostic: &Diagnostic, files: &FileCache) -> String {
    let mut out = String::new();
    let (path, location) = locate_primary(diagnostic, files);
    out.push_str(&format_header(diagnostic));
    out.push('\n');
    out.push_str(&format_location_arrow(&path, location.as_ref()));
    if let Some(label) = diagnostic.primary_label.as_ref() {
        out.push_str(&render_snippet(label.span, &label.message, files));
    }
    for label in &diagnostic.secondary_labels {
        out.push_str(&render_snippet(label.span, &label.message, files));
    }
    for note in &diagnostic.notes {
        out.push_str(&format!("\nnote: {note}"));
    }
    for suggestion in &diagnostic.suggestions {
        out.push_str(&format!("\nhelp: {}", suggestion.message));
        if let Some(replacement) = &suggestion.replacement {
            out.push_str(&format!(" replace with `{replacement}`"));
        }
    }
    out
}

fn render_short(diagnostic: &Diagnostic, files: &FileCache) -> String {
    let (path, location) = locate_primary(diagnostic, files);
    let position = location
        .map(|loc| format!("{}:{}", loc.line, loc.column))
        .unwrap_or_else(|| "?:?".to_string());
    format!("{path}:{position}: {diagnostic}")
}

fn render_json(diagnostic: &Diagnostic, files: &FileCache) -> String {
    let json = JsonDiagnostic {
        version: JSON_SCHEMA_VERSION.to_string(),
        severity: diagnostic.severity.as_str().to_string(),
        code: diagnostic.code.clone(),
        message: diagnostic.message.clone(),
        primary_span: diagnostic
            .primary_label
            .as_ref()
            .and_then(|label| JsonSpan::from_span(label.span, files)),
        notes: diagnostic.notes.clone(),
    };
    serde_json::to_string(&json).unwrap_or_else(|_| format!("{{\"message\":{:?}}}", json.message))
}

fn format_header(diagnostic: &Diagnostic) -> String {
    let code = diagnostic
        .code
        .as_ref()
        .map(|c| c.code.as_str())
        .unwrap_or("UNKNOWN");
    format!(
        "{}[{code}]: {}",
        diagnostic.severity.as_str(),
        diagnostic.message
    )
}

fn format_location_arrow(path: &str, loc: Option<&LineCol>) -> String {
    match loc {
        Some(loc) => format!("  --> {path}:{}:{}\n   |\n", loc.line, loc.column),
        None => format!("  --> {path}:?:?\n   |\n"),
    }
}

fn render_snippet(span: Span, message: &str, files: &FileCache) -> String {
    let mut out = String::new();
    let Some(file) = files.get(span.file_id) else {
        return out;
    };
    let Some(loc) = file.line_col(span.start) else {
        return out;
    };
    if let Some(line) = file.line(loc.line) {
        let display_line = line.trim_end_matches('\n');
        let rel_start = loc.column.saturating_sub(1).min(display_line.len());
        let rel_end = span
            .end
            .saturating_sub(span.start)
            .saturating_add(rel_start)
            .min(display_line.len());
        let caret_count = rel_end.saturating_sub(rel_start).max(1);
        out.push_str(&format!("{:>4} | {}\n", loc.line, display_line));
        out.push_str(&format!(
            "{:>4} | {}{} {}",
            "",
            " ".repeat(rel_start),
            "^".repeat(caret_count),
            message
        ));
    }
    out
}

fn locate_primary(diagnostic: &Diagnostic, files: &FileCache) -> (String, Option<LineCol>) {
    if let Some(label) = diagnostic.primary_label.as_ref() {
        if let Some(file) = files.get(label.span.file_id) {
            let loc = file.line_col(label.span.start);
            return (file.path.display().to_string(), loc);
        }
    }
    ("<unknown>".into(), None)
}

#[derive(Serialize)]
struct JsonDiagnostic {
    version: String,
    severity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<DiagnosticCode>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    primary_span: Option<JsonSpan>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    notes: Vec<String>,
}

#[derive(Serialize)]
struct JsonSpan {
    file: String,
    start: usize,
    end: usize,
    line_start: usize,
    column_start: usize,
}

impl JsonSpan {
    fn from_span(span: Span, files: &FileCache) -> Option<Self> {
        let file = files.get(span.file_id)?;
        let line_col = file.line_col(span.start)?;
        Some(Self {
            file: file.path.display().to_string(),
            start: span.start,
            end: span.end,
            line_start: line_col.line,
            column_start: line_col.column,
        })
    }
}
