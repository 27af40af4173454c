use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::diff::LineAnchor;
use crate::files::File;
use crate::vcs::Side;

/// Interpolation values for a message template
pub type Values = BTreeMap<String, String>;

/// Severity of a report, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Message,
    Warn,
    Fail,
}

/// Where a report points in the change-set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportLocation {
    None,
    File { path: String },
    FileLine { path: String, line: u32 },
}

impl ReportLocation {
    pub fn file(path: impl Into<String>) -> Self {
        ReportLocation::File { path: path.into() }
    }

    pub fn file_line(path: impl Into<String>, line: u32) -> Self {
        ReportLocation::FileLine {
            path: path.into(),
            line,
        }
    }

    /// A location on `file` at `anchor`. Comments anchor on the head side,
    /// so a line that only exists before the change points at the file.
    pub fn at(file: &File, anchor: &dyn LineAnchor) -> Self {
        match anchor.line_number_on(Side::After) {
            Ok(line) => Self::file_line(file.path(), line),
            Err(_) => Self::file(file.path()),
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            ReportLocation::None => None,
            ReportLocation::File { path } | ReportLocation::FileLine { path, .. } => Some(path),
        }
    }

    pub fn line(&self) -> Option<u32> {
        match self {
            ReportLocation::FileLine { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl From<&File> for ReportLocation {
    fn from(file: &File) -> Self {
        ReportLocation::file(file.path())
    }
}

impl<A: LineAnchor> From<(&File, &A)> for ReportLocation {
    fn from((file, anchor): (&File, &A)) -> Self {
        ReportLocation::at(file, anchor)
    }
}

/// One finding raised by a rule through its reporting context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub rule_id: String,
    pub message_id: String,
    pub kind: ReportKind,
    pub locations: Vec<ReportLocation>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: Values,
}

/// A rendered report as handed to the review surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub rule_id: String,
    pub kind: ReportKind,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// Comment counts per kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub comments_count: usize,
    pub fail_count: usize,
    pub warn_count: usize,
    pub message_count: usize,
}

impl Summary {
    pub fn from_comments(comments: &[Comment]) -> Self {
        let count = |kind| comments.iter().filter(|c| c.kind == kind).count();
        Self {
            comments_count: comments.len(),
            fail_count: count(ReportKind::Fail),
            warn_count: count(ReportKind::Warn),
            message_count: count(ReportKind::Message),
        }
    }

    pub fn has_failures(&self) -> bool {
        self.fail_count > 0
    }
}

/// Everything one review run produced
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunResult {
    pub result_version: String,
    pub run_id: String,
    pub generated_at: String,
    pub base: String,
    pub head: String,
    pub rules_evaluated: usize,
    pub rules_matched: usize,
    pub summary: Summary,
    pub comments: Vec<Comment>,
}

impl RunResult {
    pub fn new(base: &str, head: &str) -> Self {
        Self {
            result_version: "1.0.0".to_string(),
            run_id: uuid::Uuid::new_v4().to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            base: base.to_string(),
            head: head.to_string(),
            rules_evaluated: 0,
            rules_matched: 0,
            summary: Summary::default(),
            comments: Vec::new(),
        }
    }

    pub fn with_comments(mut self, comments: Vec<Comment>) -> Self {
        self.summary = Summary::from_comments(&comments);
        self.comments = comments;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{Change, DiffLine, Line};
    use crate::files::{ChangeSet, Files};
    use crate::vcs::{ChangedPaths, MemoryRepository};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn sample_file() -> File {
        let changes = ChangeSet::new(vec!["a.ts".to_string()], ChangedPaths::default());
        Files::new(Arc::new(MemoryRepository::new()), changes)
            .get("a.ts")
            .unwrap()
    }

    fn comment(kind: ReportKind) -> Comment {
        Comment {
            rule_id: "r".to_string(),
            kind,
            body: "body".to_string(),
            path: None,
            line: None,
        }
    }

    #[test]
    fn test_kind_ordering() {
        assert!(ReportKind::Fail > ReportKind::Warn);
        assert!(ReportKind::Warn > ReportKind::Message);
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(serde_json::to_string(&ReportKind::Warn).unwrap(), "\"warn\"");
        assert_eq!(serde_json::to_string(&ReportKind::Fail).unwrap(), "\"fail\"");
        assert_eq!(
            serde_json::to_string(&ReportKind::Message).unwrap(),
            "\"message\""
        );
    }

    #[test]
    fn test_location_from_anchors() {
        let file = sample_file();

        assert_eq!(ReportLocation::from(&file), ReportLocation::file("a.ts"));
        assert_eq!(
            ReportLocation::from((&file, &Line::new(7, "x"))),
            ReportLocation::file_line("a.ts", 7)
        );
        assert_eq!(
            ReportLocation::from((&file, &DiffLine::created(3, "x"))),
            ReportLocation::file_line("a.ts", 3)
        );
        assert_eq!(
            ReportLocation::from((&file, &12u32)).line(),
            Some(12)
        );
        assert_eq!(ReportLocation::None.path(), None);
    }

    #[test]
    fn test_removed_line_anchors_on_file() {
        let file = sample_file();
        let removed = DiffLine::from_change(&Change::Del {
            content: "-gone".to_string(),
            ln: 4,
        });

        let location = ReportLocation::from((&file, &removed));

        assert_eq!(location, ReportLocation::file("a.ts"));
        assert_eq!(location.line(), None);
    }

    #[test]
    fn test_location_serialization() {
        let json = serde_json::to_string(&ReportLocation::file_line("a.ts", 2)).unwrap();
        assert_eq!(json, r#"{"type":"file_line","path":"a.ts","line":2}"#);
    }

    #[test]
    fn test_summary_counts() {
        let comments = vec![
            comment(ReportKind::Warn),
            comment(ReportKind::Warn),
            comment(ReportKind::Fail),
        ];
        let summary = Summary::from_comments(&comments);
        assert_eq!(summary.comments_count, 3);
        assert_eq!(summary.warn_count, 2);
        assert_eq!(summary.fail_count, 1);
        assert_eq!(summary.message_count, 0);
        assert!(summary.has_failures());
    }

    #[test]
    fn test_run_result_json_roundtrip() {
        let mut result = RunResult::new("origin/main", "HEAD")
            .with_comments(vec![comment(ReportKind::Message)]);
        result.run_id = "test-id".to_string();

        let json = serde_json::to_string_pretty(&result).unwrap();
        let parsed: RunResult = serde_json::from_str(&json).unwrap();

        assert_eq!(result, parsed);
        assert!(!json.contains("\"path\""));
        assert_eq!(parsed.summary.message_count, 1);
    }
}
