//! Where rendered comments go.

pub mod json;
pub mod summary;

pub use summary::{format_summary, print_summary, ConsoleSink};

use crate::report::{Comment, ReportKind};

/// The review surface: three severities of comment, optionally anchored
/// to a file and line.
pub trait ReviewSink {
    fn warn(&mut self, body: &str, path: Option<&str>, line: Option<u32>);
    fn fail(&mut self, body: &str, path: Option<&str>, line: Option<u32>);
    fn message(&mut self, body: &str, path: Option<&str>, line: Option<u32>);

    /// Route a comment to the emitter for its kind
    fn emit(&mut self, comment: &Comment) {
        let path = comment.path.as_deref();
        match comment.kind {
            ReportKind::Fail => self.fail(&comment.body, path, comment.line),
            ReportKind::Warn => self.warn(&comment.body, path, comment.line),
            ReportKind::Message => self.message(&comment.body, path, comment.line),
        }
    }
}

/// Keeps every comment in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    comments: Vec<Comment>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn into_comments(self) -> Vec<Comment> {
        self.comments
    }

    fn push(&mut self, kind: ReportKind, body: &str, path: Option<&str>, line: Option<u32>) {
        self.comments.push(Comment {
            rule_id: String::new(),
            kind,
            body: body.to_string(),
            path: path.map(str::to_string),
            line,
        });
    }
}

impl ReviewSink for CollectingSink {
    fn warn(&mut self, body: &str, path: Option<&str>, line: Option<u32>) {
        self.push(ReportKind::Warn, body, path, line);
    }

    fn fail(&mut self, body: &str, path: Option<&str>, line: Option<u32>) {
        self.push(ReportKind::Fail, body, path, line);
    }

    fn message(&mut self, body: &str, path: Option<&str>, line: Option<u32>) {
        self.push(ReportKind::Message, body, path, line);
    }

    fn emit(&mut self, comment: &Comment) {
        self.comments.push(comment.clone());
    }
}
