use serde::{Deserialize, Serialize};
use similar::{ChangeTag, DiffOp};

/// Lines of unchanged context kept around each chunk
pub const CONTEXT_LINES: usize = 3;

/// One line of a chunk, tagged by what happened to it.
///
/// `content` is the raw diff line including its leading `+`, `-` or ` `
/// marker. Line numbers are 1-based and relative to the revision they
/// belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Change {
    Add { content: String, ln: u32 },
    Del { content: String, ln: u32 },
    Normal { content: String, ln1: u32, ln2: u32 },
}

impl Change {
    pub fn content(&self) -> &str {
        match self {
            Change::Add { content, .. }
            | Change::Del { content, .. }
            | Change::Normal { content, .. } => content,
        }
    }
}

/// A contiguous run of changes with its surrounding context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// The `@@ -a,b +c,d @@` header
    pub content: String,
    pub changes: Vec<Change>,
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
}

/// Ordered chunks of a single file's diff. Order is significant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredDiff {
    pub chunks: Vec<Chunk>,
}

impl StructuredDiff {
    /// Diff two revisions of a file line by line
    pub fn between(before: &str, after: &str) -> Self {
        let diff = similar::TextDiff::from_lines(before, after);
        let mut chunks = Vec::new();

        for group in diff.grouped_ops(CONTEXT_LINES) {
            let has_changes = group
                .iter()
                .any(|op| !matches!(op, DiffOp::Equal { .. }));
            let (Some(first), Some(last)) = (group.first(), group.last()) else {
                continue;
            };
            if !has_changes {
                continue;
            }

            let old_range = first.old_range().start..last.old_range().end;
            let new_range = first.new_range().start..last.new_range().end;
            let old_lines = old_range.len() as u32;
            let new_lines = new_range.len() as u32;
            let old_start = hunk_start(old_range.start, old_lines);
            let new_start = hunk_start(new_range.start, new_lines);

            let mut changes = Vec::new();
            for op in &group {
                for change in diff.iter_changes(op) {
                    let text = strip_line_ending(change.value());
                    let old_ln = change.old_index().map_or(0, |i| i as u32 + 1);
                    let new_ln = change.new_index().map_or(0, |i| i as u32 + 1);
                    changes.push(match change.tag() {
                        ChangeTag::Insert => Change::Add {
                            content: format!("+{}", text),
                            ln: new_ln,
                        },
                        ChangeTag::Delete => Change::Del {
                            content: format!("-{}", text),
                            ln: old_ln,
                        },
                        ChangeTag::Equal => Change::Normal {
                            content: format!(" {}", text),
                            ln1: old_ln,
                            ln2: new_ln,
                        },
                    });
                }
            }

            chunks.push(Chunk {
                content: format!(
                    "@@ -{},{} +{},{} @@",
                    old_start, old_lines, new_start, new_lines
                ),
                changes,
                old_start,
                old_lines,
                new_start,
                new_lines,
            });
        }

        Self { chunks }
    }

    /// Every change in diff order
    pub fn changes(&self) -> impl Iterator<Item = &Change> {
        self.chunks.iter().flat_map(|chunk| chunk.changes.iter())
    }

    /// Render as the body of a unified diff (chunk headers and lines)
    pub fn to_unified(&self) -> String {
        let mut out = Vec::new();
        for chunk in &self.chunks {
            out.push(chunk.content.as_str());
            out.extend(chunk.changes.iter().map(Change::content));
        }
        out.join("\n")
    }
}

// Unified diffs number an empty range from the line before it.
fn hunk_start(start: usize, len: u32) -> u32 {
    if len == 0 {
        start as u32
    } else {
        start as u32 + 1
    }
}

fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Whole-file textual view of a diff
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDiff {
    /// Chunk headers and lines of the unified diff
    pub diff: String,
    /// Only the added lines, markers stripped
    pub added: String,
    /// Only the removed lines, markers stripped
    pub removed: String,
    pub before: String,
    pub after: String,
}

impl TextDiff {
    pub fn between(before: &str, after: &str) -> Self {
        let structured = StructuredDiff::between(before, after);

        let mut added = Vec::new();
        let mut removed = Vec::new();
        for change in structured.changes() {
            match change {
                Change::Add { content, .. } => added.push(&content[1..]),
                Change::Del { content, .. } => removed.push(&content[1..]),
                Change::Normal { .. } => {}
            }
        }

        Self {
            diff: structured.to_unified(),
            added: added.join("\n"),
            removed: removed.join("\n"),
            before: before.to_string(),
            after: after.to_string(),
        }
    }
}

/// Number of lines in a block of text; empty text has none
pub fn count_lines(text: &str) -> u32 {
    text.lines().count() as u32
}
