use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::diff::{Line, LineAnchor};
use crate::error::{Error, Result};
use crate::matcher::Matcher;
use crate::needle::Needle;
use crate::vcs::{Repository, Side};

/// Lazily fetched text of one path on one side of the change.
///
/// Nothing is cached: every read goes back to the repository.
#[derive(Clone)]
pub struct Content {
    repo: Arc<dyn Repository>,
    side: Side,
    path: String,
}

impl Content {
    pub fn new(repo: Arc<dyn Repository>, side: Side, path: &str) -> Self {
        Self {
            repo,
            side,
            path: path.to_string(),
        }
    }

    pub async fn text(&self) -> Result<String> {
        self.repo
            .read(self.side, &self.path)
            .await?
            .ok_or_else(|| Error::MissingRevision {
                path: self.path.clone(),
                side: self.side,
            })
    }

    pub(crate) fn repo(&self) -> &Arc<dyn Repository> {
        &self.repo
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Content")
            .field("side", &self.side)
            .field("path", &self.path)
            .finish()
    }
}

/// Bounds for [`FileState::lines`]. Both bounds are exclusive.
#[derive(Default, Clone, Copy)]
pub struct LineWindow<'a> {
    after: Option<&'a dyn LineAnchor>,
    before: Option<&'a dyn LineAnchor>,
}

impl<'a> LineWindow<'a> {
    pub fn all() -> Self {
        Self::default()
    }

    /// Only lines strictly after `anchor`
    pub fn after(mut self, anchor: &'a dyn LineAnchor) -> Self {
        self.after = Some(anchor);
        self
    }

    /// Only lines strictly before `anchor`
    pub fn before(mut self, anchor: &'a dyn LineAnchor) -> Self {
        self.before = Some(anchor);
        self
    }
}

/// A file as it exists on one side of the change
#[derive(Debug, Clone)]
pub struct FileState {
    content: Content,
}

impl FileState {
    pub fn new(repo: Arc<dyn Repository>, side: Side, path: &str) -> Self {
        Self {
            content: Content::new(repo, side, path),
        }
    }

    pub fn side(&self) -> Side {
        self.content.side
    }

    /// Path relative to the repository root
    pub fn path(&self) -> &str {
        &self.content.path
    }

    /// File name including extension
    pub fn name(&self) -> &str {
        Path::new(self.path())
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// Parent directory, `.` for files at the root
    pub fn dirname(&self) -> &str {
        match Path::new(self.path()).parent().and_then(|p| p.to_str()) {
            Some("") | None => ".",
            Some(parent) => parent,
        }
    }

    /// File name without its extension
    pub fn basename(&self) -> &str {
        Path::new(self.path())
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// Extension with its leading dot, empty when there is none
    pub fn extension(&self) -> String {
        Path::new(self.path())
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default()
    }

    pub fn matches<S: AsRef<str>>(&self, patterns: &[S]) -> Result<bool> {
        Ok(Matcher::new(patterns)?.is_match(self.path()))
    }

    pub async fn contents(&self) -> Result<String> {
        self.content.text().await
    }

    pub async fn contains(&self, needle: impl Into<Needle>) -> Result<bool> {
        let needle = needle.into();
        Ok(needle.found_in(&self.contents().await?))
    }

    pub async fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let text = self.contents().await?;
        serde_json::from_str(&text).map_err(|e| Error::content(self.path(), "JSON", e))
    }

    pub async fn toml<T: DeserializeOwned>(&self) -> Result<T> {
        let text = self.contents().await?;
        toml::from_str(&text).map_err(|e| Error::content(self.path(), "TOML", e))
    }

    /// Numbered lines inside `window`.
    ///
    /// Anchors are resolved on this state's side, so a diff line that does
    /// not exist here (an added line on the before side, a removed line on
    /// the after side) is an error.
    pub async fn lines(&self, window: LineWindow<'_>) -> Result<Vec<Line>> {
        let side = self.side();
        let after = window
            .after
            .map(|anchor| anchor.line_number_on(side))
            .transpose()?;
        let before = window
            .before
            .map(|anchor| anchor.line_number_on(side))
            .transpose()?;

        let text = self.contents().await?;
        Ok(numbered_lines(&text)
            .filter(|line| after.map_or(true, |n| line.number() > n))
            .filter(|line| before.map_or(true, |n| line.number() < n))
            .collect())
    }

    pub(crate) fn repo(&self) -> &Arc<dyn Repository> {
        self.content.repo()
    }
}

/// Split text into lines numbered from 1
pub(crate) fn numbered_lines(text: &str) -> impl Iterator<Item = Line> + '_ {
    text.lines()
        .enumerate()
        .map(|(index, line)| Line::new(index as u32 + 1, line))
}
