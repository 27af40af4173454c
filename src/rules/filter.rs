use async_trait::async_trait;
use tracing::debug;

use super::context::Context;
use super::rule::{CommitMatcher, RuleMatchers, RuleValues};
use crate::commit::Commit;
use crate::error::{Error, Result};
use crate::files::Files;

/// One kind of rule precondition.
///
/// Implementors only see non-empty matcher lists; the provided
/// [`matches`](RuleFilter::matches) and [`build`](RuleFilter::build) handle
/// absent and empty declarations.
#[async_trait]
pub trait RuleFilter: Send + Sync {
    type Matcher: Send + Sync;
    type Value: Send;

    /// Name of the matcher kind, as used in error messages
    fn kind(&self) -> &'static str;

    /// Does the change-set match any of `matchers`?
    async fn matches_any(&self, matchers: &[Self::Matcher]) -> Result<bool>;

    /// The value a rule body receives for `matchers`
    async fn value_for(&self, matchers: &[Self::Matcher]) -> Result<Self::Value>;

    /// `false` when the kind is not declared
    async fn matches(&self, matchers: Option<&[Self::Matcher]>) -> Result<bool> {
        match declared(self.kind(), matchers)? {
            Some(matchers) => self.matches_any(matchers).await,
            None => Ok(false),
        }
    }

    /// `None` when the kind is not declared
    async fn build(&self, matchers: Option<&[Self::Matcher]>) -> Result<Option<Self::Value>> {
        match declared(self.kind(), matchers)? {
            Some(matchers) => Ok(Some(self.value_for(matchers).await?)),
            None => Ok(None),
        }
    }
}

fn declared<'m, M>(kind: &str, matchers: Option<&'m [M]>) -> Result<Option<&'m [M]>> {
    match matchers {
        Some([]) => Err(Error::configuration(format!(
            "`{}` matchers cannot be an empty list",
            kind
        ))),
        other => Ok(other),
    }
}

/// Matches when a created, modified or deleted file matches the globs
#[derive(Debug, Clone)]
pub struct FilesFilter {
    files: Files,
}

impl FilesFilter {
    pub fn new(files: Files) -> Self {
        Self { files }
    }
}

#[async_trait]
impl RuleFilter for FilesFilter {
    type Matcher = String;
    type Value = Files;

    fn kind(&self) -> &'static str {
        "files"
    }

    async fn matches_any(&self, patterns: &[String]) -> Result<bool> {
        Ok(self.files.filter(patterns)?.change_set().has_changes())
    }

    async fn value_for(&self, patterns: &[String]) -> Result<Files> {
        self.files.filter(patterns)
    }
}

/// Matches when any commit message contains any matcher
#[derive(Debug, Clone, Default)]
pub struct CommitsFilter {
    commits: Vec<Commit>,
}

impl CommitsFilter {
    pub fn new(commits: Vec<Commit>) -> Self {
        Self { commits }
    }

    fn matching<'a>(
        &'a self,
        matchers: &'a [CommitMatcher],
    ) -> impl Iterator<Item = &'a Commit> + 'a {
        self.commits
            .iter()
            .filter(move |commit| matchers.iter().any(|m| commit.contains(m)))
    }
}

#[async_trait]
impl RuleFilter for CommitsFilter {
    type Matcher = CommitMatcher;
    type Value = Vec<Commit>;

    fn kind(&self) -> &'static str {
        "commits"
    }

    async fn matches_any(&self, matchers: &[CommitMatcher]) -> Result<bool> {
        Ok(self.matching(matchers).next().is_some())
    }

    async fn value_for(&self, matchers: &[CommitMatcher]) -> Result<Vec<Commit>> {
        Ok(self.matching(matchers).cloned().collect())
    }
}

/// Every supported matcher kind, consulted together for each rule
#[derive(Debug, Clone)]
pub struct RuleFilterRegistry {
    files: FilesFilter,
    commits: CommitsFilter,
}

impl RuleFilterRegistry {
    pub fn new(files: Files, commits: Vec<Commit>) -> Self {
        Self {
            files: FilesFilter::new(files),
            commits: CommitsFilter::new(commits),
        }
    }

    /// Does any declared matcher kind match? Every declared kind is checked
    /// so empty lists are reported even when another kind matched first.
    pub async fn any(&self, matchers: &RuleMatchers) -> Result<bool> {
        let files = self.files.matches(matchers.files.as_deref()).await?;
        let commits = self.commits.matches(matchers.commits.as_deref()).await?;
        debug!(files, commits, "Evaluated rule matchers");
        Ok(files || commits)
    }

    /// Build the inputs of a rule body
    pub async fn build_values<'a>(
        &self,
        matchers: &RuleMatchers,
        context: &'a Context,
    ) -> Result<RuleValues<'a>> {
        Ok(RuleValues {
            files: self.files.build(matchers.files.as_deref()).await?,
            commits: self.commits.build(matchers.commits.as_deref()).await?,
            context,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::ChangeSet;
    use crate::vcs::{ChangedPaths, CommitInfo, MemoryRepository};
    use regex::Regex;
    use std::sync::Arc;

    fn strings(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    fn registry() -> RuleFilterRegistry {
        let changes = ChangeSet::new(
            strings(&["app/x.ts", "docs/readme.md"]),
            ChangedPaths {
                created: strings(&["app/x.ts"]),
                modified: vec![],
                deleted: strings(&["old/gone.py"]),
            },
        );
        let files = Files::new(Arc::new(MemoryRepository::new()), changes);
        let commits = vec![Commit::new(CommitInfo {
            sha: "a1".to_string(),
            parents: vec![],
            message: "Add widget (JIRA-12)".to_string(),
        })];
        RuleFilterRegistry::new(files, commits)
    }

    #[tokio::test]
    async fn test_files_filter_matches_edited_or_deleted() {
        let registry = registry();
        let ts = RuleMatchers::new().files(&["*.ts"]);
        let py = RuleMatchers::new().files(&["*.py"]);
        let md = RuleMatchers::new().files(&["*.md"]);

        assert!(registry.any(&ts).await.unwrap());
        assert!(registry.any(&py).await.unwrap());
        assert!(!registry.any(&md).await.unwrap());
    }

    #[tokio::test]
    async fn test_commits_filter() {
        let registry = registry();
        let jira = RuleMatchers::new().commits([Regex::new(r"JIRA-\d+").unwrap()]);
        let other = RuleMatchers::new().commits(["revert"]);

        assert!(registry.any(&jira).await.unwrap());
        assert!(!registry.any(&other).await.unwrap());
    }

    #[tokio::test]
    async fn test_any_is_logical_or() {
        let registry = registry();
        let matchers = RuleMatchers::new().files(&["*.md"]).commits(["widget"]);
        assert!(registry.any(&matchers).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_list_is_configuration_error() {
        let registry = registry();
        let empty: [&str; 0] = [];
        let matchers = RuleMatchers::new().files(&empty);

        let err = registry.any(&matchers).await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let ctx = Context::new("r");
        assert!(registry.build_values(&matchers, &ctx).await.is_err());
    }

    #[tokio::test]
    async fn test_absent_kind_does_not_participate() {
        let filter = CommitsFilter::default();
        assert!(!filter.matches(None).await.unwrap());
        assert!(filter.build(None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_build_values() {
        let registry = registry();
        let ctx = Context::new("r");
        let matchers = RuleMatchers::new().files(&["app/**"]);

        let values = registry.build_values(&matchers, &ctx).await.unwrap();
        let files = values.files.unwrap();
        assert_eq!(files.change_set().all(), ["app/x.ts".to_string()]);
        assert!(values.commits.is_none());
        assert_eq!(values.context.rule_id(), "r");
    }
}
