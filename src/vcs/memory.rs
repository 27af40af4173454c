use std::collections::BTreeMap;

use async_trait::async_trait;

use super::{ChangedPaths, CommitInfo, Repository, Side};
use crate::error::{Error, Result};

/// Repository held entirely in memory.
///
/// Change classification is derived from the two snapshots: a path only in
/// head was created, only in base was deleted, and in both with different
/// contents was modified.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    base: BTreeMap<String, String>,
    head: BTreeMap<String, String>,
    commits: Vec<CommitInfo>,
    unavailable: Option<String>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file that is identical on both sides
    pub fn with_file(self, path: &str, contents: &str) -> Self {
        self.with_base(path, contents).with_head(path, contents)
    }

    pub fn with_base(mut self, path: &str, contents: &str) -> Self {
        self.base.insert(path.to_string(), contents.to_string());
        self
    }

    pub fn with_head(mut self, path: &str, contents: &str) -> Self {
        self.head.insert(path.to_string(), contents.to_string());
        self
    }

    pub fn with_commit(mut self, sha: &str, message: &str) -> Self {
        let parents = self
            .commits
            .last()
            .map(|c| vec![c.sha.clone()])
            .unwrap_or_default();
        self.commits.push(CommitInfo {
            sha: sha.to_string(),
            parents,
            message: message.to_string(),
        });
        self
    }

    /// Make file enumeration fail, as with a shallow or unrelated checkout
    pub fn unavailable(mut self, reason: &str) -> Self {
        self.unavailable = Some(reason.to_string());
        self
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn list_files(&self) -> Result<Vec<String>> {
        if let Some(reason) = &self.unavailable {
            return Err(Error::EnvironmentUnavailable(reason.clone()));
        }
        Ok(self.head.keys().cloned().collect())
    }

    async fn changed_paths(&self) -> Result<ChangedPaths> {
        let mut paths = ChangedPaths::default();

        for (path, after) in &self.head {
            match self.base.get(path) {
                None => paths.created.push(path.clone()),
                Some(before) if before != after => paths.modified.push(path.clone()),
                Some(_) => {}
            }
        }
        paths.deleted = self
            .base
            .keys()
            .filter(|path| !self.head.contains_key(*path))
            .cloned()
            .collect();

        Ok(paths)
    }

    async fn commits(&self) -> Result<Vec<CommitInfo>> {
        Ok(self.commits.clone())
    }

    async fn read(&self, side: Side, path: &str) -> Result<Option<String>> {
        let snapshot = match side {
            Side::Before => &self.base,
            Side::After => &self.head,
        };
        Ok(snapshot.get(path).cloned())
    }
}
