use std::sync::Arc;

use super::structured::Change;
use crate::error::{Error, Result};
use crate::needle::Needle;
use crate::vcs::Side;

/// A single numbered line of a file at one revision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    number: u32,
    text: Arc<str>,
}

impl Line {
    pub fn new(number: u32, text: impl Into<Arc<str>>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }

    /// 1-based line number
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn contains(&self, needle: impl Into<Needle>) -> bool {
        needle.into().found_in(&self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Removed,
    Unchanged,
}

/// A line taken from a diff.
///
/// Removed lines only exist before the change and added lines only exist
/// after it, so each side's line number is optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    kind: ChangeKind,
    before: Option<u32>,
    after: Option<u32>,
    text: Arc<str>,
}

impl DiffLine {
    pub fn from_change(change: &Change) -> Self {
        let (kind, before, after) = match *change {
            Change::Add { ln, .. } => (ChangeKind::Added, None, Some(ln)),
            Change::Del { ln, .. } => (ChangeKind::Removed, Some(ln), None),
            Change::Normal { ln1, ln2, .. } => (ChangeKind::Unchanged, Some(ln1), Some(ln2)),
        };

        Self {
            kind,
            before,
            after,
            text: strip_marker(change.content()).into(),
        }
    }

    /// A line of a newly created file
    pub fn created(number: u32, text: impl Into<Arc<str>>) -> Self {
        Self {
            kind: ChangeKind::Added,
            before: None,
            after: Some(number),
            text: text.into(),
        }
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    pub fn is_added(&self) -> bool {
        self.kind == ChangeKind::Added
    }

    pub fn is_removed(&self) -> bool {
        self.kind == ChangeKind::Removed
    }

    pub fn is_unchanged(&self) -> bool {
        self.kind == ChangeKind::Unchanged
    }

    /// Added or removed
    pub fn is_changed(&self) -> bool {
        self.kind != ChangeKind::Unchanged
    }

    pub fn line_number_before(&self) -> Option<u32> {
        self.before
    }

    pub fn line_number_after(&self) -> Option<u32> {
        self.after
    }

    /// Line content with the diff marker removed
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn contains(&self, needle: impl Into<Needle>) -> bool {
        needle.into().found_in(&self.text)
    }
}

// Exactly one marker character; the rest of the line is content even if it
// also starts with `+` or `-`.
fn strip_marker(content: &str) -> &str {
    content.strip_prefix(['+', '-', ' ']).unwrap_or(content)
}

/// A reference to a position in a file that can be resolved on either side
/// of a change.
///
/// Anchors are borrowed across `.await` points inside rule bodies, so they
/// must be `Sync`.
pub trait LineAnchor: Sync {
    fn line_number_on(&self, side: Side) -> Result<u32>;
}

impl LineAnchor for u32 {
    fn line_number_on(&self, _side: Side) -> Result<u32> {
        Ok(*self)
    }
}

impl LineAnchor for Line {
    fn line_number_on(&self, _side: Side) -> Result<u32> {
        Ok(self.number)
    }
}

impl LineAnchor for DiffLine {
    fn line_number_on(&self, side: Side) -> Result<u32> {
        match side {
            Side::Before => self.before.ok_or(Error::NoLineNumber {
                kind: "Added",
                side,
            }),
            Side::After => self.after.ok_or(Error::NoLineNumber {
                kind: "Removed",
                side,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(content: &str, ln: u32) -> Change {
        Change::Add {
            content: content.to_string(),
            ln,
        }
    }

    #[test]
    fn test_added_line_numbers() {
        let line = DiffLine::from_change(&add("+let x = 1;", 7));
        assert!(line.is_added());
        assert!(line.is_changed());
        assert!(!line.is_removed());
        assert!(!line.is_unchanged());
        assert_eq!(line.line_number_before(), None);
        assert_eq!(line.line_number_after(), Some(7));
        assert_eq!(line.text(), "let x = 1;");
    }

    #[test]
    fn test_removed_line_numbers() {
        let line = DiffLine::from_change(&Change::Del {
            content: "-old".to_string(),
            ln: 3,
        });
        assert!(line.is_removed());
        assert_eq!(line.line_number_before(), Some(3));
        assert_eq!(line.line_number_after(), None);
    }

    #[test]
    fn test_unchanged_line_numbers() {
        let line = DiffLine::from_change(&Change::Normal {
            content: " same".to_string(),
            ln1: 4,
            ln2: 6,
        });
        assert!(line.is_unchanged());
        assert!(!line.is_changed());
        assert_eq!(line.line_number_before(), Some(4));
        assert_eq!(line.line_number_after(), Some(6));
        assert_eq!(line.text(), "same");
    }

    #[test]
    fn test_only_one_marker_is_stripped() {
        assert_eq!(DiffLine::from_change(&add("++counter", 1)).text(), "+counter");
        assert_eq!(DiffLine::from_change(&add("+-1", 1)).text(), "-1");
        assert_eq!(DiffLine::from_change(&add("+  indented", 1)).text(), "  indented");
    }

    #[test]
    fn test_anchor_resolution() {
        let added = DiffLine::from_change(&add("+x", 5));
        assert_eq!(added.line_number_on(Side::After).unwrap(), 5);
        assert!(matches!(
            added.line_number_on(Side::Before),
            Err(Error::NoLineNumber { kind: "Added", .. })
        ));

        let removed = DiffLine::from_change(&Change::Del {
            content: "-x".to_string(),
            ln: 2,
        });
        assert_eq!(removed.line_number_on(Side::Before).unwrap(), 2);
        assert!(removed.line_number_on(Side::After).is_err());

        assert_eq!(Line::new(9, "x").line_number_on(Side::Before).unwrap(), 9);
        assert_eq!(12u32.line_number_on(Side::After).unwrap(), 12);
    }

    #[test]
    fn test_line_contains() {
        let line = Line::new(1, "@route('/users')");
        assert!(line.contains("@route"));
        assert!(!line.contains("@rate_limit"));
    }
}
