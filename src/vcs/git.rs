use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::debug;

use super::{ChangedPaths, CommitInfo, Repository, Side};
use crate::error::{Error, Result};

const COMMIT_SEPARATOR: char = '\x1e';
const FIELD_SEPARATOR: char = '\x00';

/// `git` command-line wrapper
#[derive(Debug, Clone)]
pub struct GitCli {
    repo: PathBuf,
    base: String,
    head: String,
    merge_base: OnceCell<String>,
}

impl GitCli {
    /// Create a new git client comparing `base` against `head`
    pub fn new(repo: impl Into<PathBuf>, base: &str, head: &str) -> Self {
        Self {
            repo: repo.into(),
            base: base.to_string(),
            head: head.to_string(),
            merge_base: OnceCell::new(),
        }
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn head(&self) -> &str {
        &self.head
    }

    /// Commit the change-set forked from; resolved once per client.
    pub async fn merge_base(&self) -> Result<&str> {
        let sha = self
            .merge_base
            .get_or_try_init(|| async {
                let stdout = self.run(&["merge-base", &self.base, &self.head]).await?;
                Ok::<_, Error>(stdout.trim().to_string())
            })
            .await?;
        Ok(sha.as_str())
    }

    /// The before side is the merge-base, not the tip of `base`, so that
    /// upstream changes to `base` never show up in the change-set.
    async fn revision(&self, side: Side) -> Result<&str> {
        match side {
            Side::Before => self.merge_base().await,
            Side::After => Ok(self.head.as_str()),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        debug!(?args, repo = %self.repo.display(), "Running git");

        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo)
            .args(args)
            .output()
            .await
            .map_err(|e| Error::Vcs(format!("failed to run git: {}", e)))?;

        if !output.status.success() {
            return Err(Error::Vcs(format!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Does the path exist in the tree of `revision`?
    async fn exists(&self, revision: &str, path: &str) -> Result<bool> {
        let listing = self
            .run(&["ls-tree", "-z", "--name-only", revision, "--", path])
            .await?;
        let found = split_nul(&listing).any(|entry| entry == path);
        Ok(found)
    }
}

#[async_trait]
impl Repository for GitCli {
    async fn list_files(&self) -> Result<Vec<String>> {
        // Without a merge-base nothing downstream can be classified
        // (shallow clones, unrelated histories).
        self.merge_base()
            .await
            .map_err(|e| Error::EnvironmentUnavailable(e.to_string()))?;

        let stdout = self
            .run(&["ls-tree", "-z", "--name-only", "-r", &self.head])
            .await
            .map_err(|e| Error::EnvironmentUnavailable(e.to_string()))?;

        Ok(split_nul(&stdout).map(str::to_string).collect())
    }

    async fn changed_paths(&self) -> Result<ChangedPaths> {
        let merge_base = self.merge_base().await?;
        let stdout = self
            .run(&[
                "diff",
                "-z",
                "--name-status",
                "--no-renames",
                merge_base,
                &self.head,
            ])
            .await?;
        Ok(parse_name_status(&stdout))
    }

    async fn commits(&self) -> Result<Vec<CommitInfo>> {
        let range = format!("{}..{}", self.base, self.head);
        let stdout = self
            .run(&["log", "--reverse", "--format=%H%x00%P%x00%B%x1e", &range])
            .await?;
        Ok(parse_log(&stdout))
    }

    async fn read(&self, side: Side, path: &str) -> Result<Option<String>> {
        let revision = self.revision(side).await?;
        if !self.exists(revision, path).await? {
            return Ok(None);
        }

        let object = format!("{}:{}", revision, path);
        self.run(&["show", &object]).await.map(Some)
    }
}

// `-z` output: paths are verbatim, never C-quoted.
fn split_nul(stdout: &str) -> impl Iterator<Item = &str> {
    stdout.split('\0').filter(|entry| !entry.is_empty())
}

// `-z --name-status` alternates status and path fields.
fn parse_name_status(stdout: &str) -> ChangedPaths {
    let mut paths = ChangedPaths::default();

    let mut fields = split_nul(stdout);
    while let (Some(status), Some(path)) = (fields.next(), fields.next()) {
        let path = path.to_string();
        match status.chars().next() {
            Some('A') => paths.created.push(path),
            Some('D') => paths.deleted.push(path),
            Some('M') | Some('T') => paths.modified.push(path),
            _ => {}
        }
    }

    paths
}

fn parse_log(stdout: &str) -> Vec<CommitInfo> {
    stdout
        .split(COMMIT_SEPARATOR)
        .filter_map(|record| {
            let record = record.trim_start_matches('\n');
            let mut fields = record.splitn(3, FIELD_SEPARATOR);
            let sha = fields.next()?.trim();
            if sha.is_empty() {
                return None;
            }
            let parents = fields
                .next()
                .unwrap_or_default()
                .split_whitespace()
                .map(str::to_string)
                .collect();
            let message = fields.next().unwrap_or_default().trim_end().to_string();
            Some(CommitInfo {
                sha: sha.to_string(),
                parents,
                message,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_client_creation() {
        let git = GitCli::new("/tmp/repo", "origin/main", "HEAD");
        assert_eq!(git.repo(), Path::new("/tmp/repo"));
        assert_eq!(git.base(), "origin/main");
        assert_eq!(git.head(), "HEAD");
    }

    #[test]
    fn test_parse_name_status() {
        let stdout = "A\0src/new.ts\0M\0src/old.ts\0D\0legacy.js\0T\0link\0";
        let paths = parse_name_status(stdout);
        assert_eq!(paths.created, vec!["src/new.ts"]);
        assert_eq!(paths.modified, vec!["src/old.ts", "link"]);
        assert_eq!(paths.deleted, vec!["legacy.js"]);
    }

    #[test]
    fn test_parse_name_status_keeps_non_ascii_and_tabs() {
        let stdout = "A\0café.js\0M\0dir/with\ttab.ts\0";
        let paths = parse_name_status(stdout);
        assert_eq!(paths.created, vec!["café.js"]);
        assert_eq!(paths.modified, vec!["dir/with\ttab.ts"]);
    }

    #[test]
    fn test_split_nul_skips_trailing_terminator() {
        let entries: Vec<_> = split_nul("a.ts\0b/ü.js\0").collect();
        assert_eq!(entries, vec!["a.ts", "b/ü.js"]);
    }

    #[test]
    fn test_parse_log() {
        let stdout = "abc\x00\x00Initial commit\n\x1e\ndef\x00abc\x00Add feature\n\nJIRA-12\n\x1e\n";
        let commits = parse_log(stdout);
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].sha, "abc");
        assert!(commits[0].parents.is_empty());
        assert_eq!(commits[0].message, "Initial commit");
        assert_eq!(commits[1].parents, vec!["abc"]);
        assert_eq!(commits[1].message, "Add feature\n\nJIRA-12");
    }

    #[test]
    fn test_parse_log_empty() {
        assert!(parse_log("").is_empty());
    }
}
