use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::changes::ChangeSet;
use super::state::{FileState, LineWindow};
use crate::diff::{Diff, Line};
use crate::error::{Error, Result};
use crate::needle::Needle;
use crate::vcs::{Repository, Side};

/// A path in the reviewed change-set.
///
/// Reads go to the head revision; [`File::before`] gives the base revision.
/// The created/deleted/modified flags are looked up in the change-set on
/// every call.
#[derive(Debug, Clone)]
pub struct File {
    after: FileState,
    changes: Arc<ChangeSet>,
}

impl File {
    pub(crate) fn new(repo: Arc<dyn Repository>, changes: Arc<ChangeSet>, path: &str) -> Self {
        Self {
            after: FileState::new(repo, Side::After, path),
            changes,
        }
    }

    pub fn path(&self) -> &str {
        self.after.path()
    }

    /// The file at the head revision
    pub fn after(&self) -> &FileState {
        &self.after
    }

    /// The file at the base revision, `None` when it was created
    pub fn before(&self) -> Option<FileState> {
        if self.is_created() {
            None
        } else {
            Some(FileState::new(
                self.after.repo().clone(),
                Side::Before,
                self.path(),
            ))
        }
    }

    pub fn diff(&self) -> Diff {
        Diff::new(self.clone())
    }

    pub fn is_created(&self) -> bool {
        self.changes.is_created(self.path())
    }

    pub fn is_deleted(&self) -> bool {
        self.changes.is_deleted(self.path())
    }

    /// Modified, not counting created files
    pub fn is_modified_only(&self) -> bool {
        self.changes.is_modified(self.path())
    }

    /// Created or modified
    pub fn is_edited(&self) -> bool {
        self.changes.is_edited(self.path())
    }

    /// Created, modified or deleted
    pub fn is_touched(&self) -> bool {
        self.changes.is_touched(self.path())
    }

    /// Has the file been moved from another location?
    pub async fn moved(&self) -> Result<bool> {
        Err(Error::Unsupported("rename detection"))
    }

    pub fn matches<S: AsRef<str>>(&self, patterns: &[S]) -> Result<bool> {
        self.after.matches(patterns)
    }

    pub async fn contents(&self) -> Result<String> {
        self.after.contents().await
    }

    pub async fn contains(&self, needle: impl Into<Needle>) -> Result<bool> {
        self.after.contains(needle).await
    }

    pub async fn json<T: DeserializeOwned>(&self) -> Result<T> {
        self.after.json().await
    }

    pub async fn lines(&self, window: LineWindow<'_>) -> Result<Vec<Line>> {
        self.after.lines(window).await
    }

    pub(crate) fn repo(&self) -> &Arc<dyn Repository> {
        self.after.repo()
    }
}
