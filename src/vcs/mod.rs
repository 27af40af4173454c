//! Version-control collaborator.
//!
//! Everything the engine knows about a change-set comes through the
//! [`Repository`] trait. [`GitCli`] answers by running `git`, and
//! [`MemoryRepository`] answers from fixtures held in memory.

mod git;
mod memory;

pub use git::GitCli;
pub use memory::MemoryRepository;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::diff::{StructuredDiff, TextDiff};
use crate::error::{Error, Result};

/// Which side of the change a revision belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The base revision
    Before,
    /// The head revision
    After,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Before => f.write_str("before"),
            Side::After => f.write_str("after"),
        }
    }
}

/// Paths touched between base and head, as reported by version control
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedPaths {
    pub created: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
}

/// A commit in the reviewed range
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    pub parents: Vec<String>,
    pub message: String,
}

#[async_trait]
pub trait Repository: Send + Sync {
    /// Every path at the head revision
    async fn list_files(&self) -> Result<Vec<String>>;

    /// Created, modified and deleted paths between base and head
    async fn changed_paths(&self) -> Result<ChangedPaths>;

    /// Commits in the reviewed range, oldest first
    async fn commits(&self) -> Result<Vec<CommitInfo>>;

    /// Contents of `path` on one side of the change, `None` when the file
    /// does not exist there
    async fn read(&self, side: Side, path: &str) -> Result<Option<String>>;

    async fn text_diff(&self, path: &str) -> Result<TextDiff> {
        let (before, after) = self.read_both(path).await?;
        Ok(TextDiff::between(&before, &after))
    }

    async fn structured_diff(&self, path: &str) -> Result<StructuredDiff> {
        let (before, after) = self.read_both(path).await?;
        Ok(StructuredDiff::between(&before, &after))
    }

    /// Both sides of a file, treating a missing side as empty. Fails if the
    /// file exists on neither side.
    async fn read_both(&self, path: &str) -> Result<(String, String)> {
        let before = self.read(Side::Before, path).await?;
        let after = self.read(Side::After, path).await?;

        if before.is_none() && after.is_none() {
            return Err(Error::Vcs(format!("Couldn't get diff for file {}", path)));
        }

        Ok((before.unwrap_or_default(), after.unwrap_or_default()))
    }
}
