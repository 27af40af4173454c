use std::path::Path;

use super::ReviewSink;
use crate::report::{ReportKind, RunResult};

/// Prints each comment to stdout as it is emitted
#[derive(Debug, Default)]
pub struct ConsoleSink {
    emitted: usize,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of comments printed so far
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    fn print(&mut self, kind: ReportKind, body: &str, path: Option<&str>, line: Option<u32>) {
        self.emitted += 1;
        println!("{} {}", icon(kind), location(path, line));
        for text in body.lines() {
            println!("    {}", text);
        }
        println!();
    }
}

impl ReviewSink for ConsoleSink {
    fn warn(&mut self, body: &str, path: Option<&str>, line: Option<u32>) {
        self.print(ReportKind::Warn, body, path, line);
    }

    fn fail(&mut self, body: &str, path: Option<&str>, line: Option<u32>) {
        self.print(ReportKind::Fail, body, path, line);
    }

    fn message(&mut self, body: &str, path: Option<&str>, line: Option<u32>) {
        self.print(ReportKind::Message, body, path, line);
    }
}

fn icon(kind: ReportKind) -> &'static str {
    match kind {
        ReportKind::Fail => "🚨",
        ReportKind::Warn => "⚠️ ",
        ReportKind::Message => "💬",
    }
}

fn location(path: Option<&str>, line: Option<u32>) -> String {
    match (path, line) {
        (Some(path), Some(line)) => format!("{}:{}", path, line),
        (Some(path), None) => path.to_string(),
        _ => "(general)".to_string(),
    }
}

/// Print human-readable summary to stdout
pub fn print_summary(result: &RunResult, output_path: Option<&Path>) {
    println!("╭───────────────────────────────────────────────────────────────╮");
    println!("│                  diffaudit Review Summary                     │");
    println!("╰───────────────────────────────────────────────────────────────╯");
    println!();
    print!("{}", format_summary(result));
    println!();

    if let Some(path) = output_path {
        println!("Full result written to: {}", path.display());
        println!();
    }
}

/// Format summary as string (for testing)
pub fn format_summary(result: &RunResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("Range: {}...{}\n", result.base, result.head));
    output.push_str(&format!(
        "Rules: {} evaluated, {} matched\n",
        result.rules_evaluated, result.rules_matched
    ));
    output.push_str(&format!(
        "Comments: {} ({} fail, {} warn, {} message)\n",
        result.summary.comments_count,
        result.summary.fail_count,
        result.summary.warn_count,
        result.summary.message_count
    ));

    for comment in &result.comments {
        let title = comment.body.lines().next().unwrap_or_default();
        output.push_str(&format!(
            "  {} [{}] {}: {}\n",
            icon(comment.kind),
            comment.rule_id,
            location(comment.path.as_deref(), comment.line),
            truncate(title, 72)
        ));
    }

    output
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let kept: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}
