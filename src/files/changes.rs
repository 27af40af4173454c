use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::file::File;
use crate::error::{Error, Result};
use crate::matcher::Matcher;
use crate::vcs::{ChangedPaths, Repository};

/// Paths at head plus the created/modified/deleted classification.
///
/// Built once per run and read-only afterwards. `edited` is created plus
/// modified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    all: Vec<String>,
    created: Vec<String>,
    modified: Vec<String>,
    deleted: Vec<String>,
    edited: Vec<String>,
}

impl ChangeSet {
    pub fn new(all: Vec<String>, changed: ChangedPaths) -> Self {
        let edited = unique(changed.created.iter().chain(changed.modified.iter()));
        Self {
            all,
            created: changed.created,
            modified: changed.modified,
            deleted: changed.deleted,
            edited,
        }
    }

    /// Narrow every set to the paths matching `matcher`
    pub fn filter(&self, matcher: &Matcher) -> Self {
        Self {
            all: matcher.filter(&self.all),
            created: matcher.filter(&self.created),
            modified: matcher.filter(&self.modified),
            deleted: matcher.filter(&self.deleted),
            edited: matcher.filter(&self.edited),
        }
    }

    pub fn all(&self) -> &[String] {
        &self.all
    }

    pub fn is_created(&self, path: &str) -> bool {
        self.created.iter().any(|p| p == path)
    }

    pub fn is_modified(&self, path: &str) -> bool {
        self.modified.iter().any(|p| p == path)
    }

    pub fn is_deleted(&self, path: &str) -> bool {
        self.deleted.iter().any(|p| p == path)
    }

    pub fn is_edited(&self, path: &str) -> bool {
        self.edited.iter().any(|p| p == path)
    }

    pub fn is_touched(&self, path: &str) -> bool {
        self.is_edited(path) || self.is_deleted(path)
    }

    /// Is anything in this set created, modified or deleted?
    pub fn has_changes(&self) -> bool {
        !self.edited.is_empty() || !self.deleted.is_empty()
    }

    /// Is the path known to this change-set at all?
    pub fn contains(&self, path: &str) -> bool {
        self.all.iter().any(|p| p == path) || self.is_deleted(path)
    }

    fn touched(&self) -> Vec<String> {
        unique(self.edited.iter().chain(self.deleted.iter()))
    }

    fn untouched(&self) -> Vec<String> {
        let touched: HashSet<&str> = self
            .edited
            .iter()
            .chain(self.deleted.iter())
            .map(String::as_str)
            .collect();
        unique(self.all.iter().filter(|p| !touched.contains(p.as_str())))
    }
}

// First occurrence wins.
fn unique<'a>(paths: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = HashSet::new();
    paths
        .filter(|p| seen.insert(p.as_str()))
        .cloned()
        .collect()
}

/// Classified view over the files of a change-set
#[derive(Clone)]
pub struct Files {
    repo: Arc<dyn Repository>,
    changes: Arc<ChangeSet>,
}

impl Files {
    pub fn new(repo: Arc<dyn Repository>, changes: ChangeSet) -> Self {
        Self {
            repo,
            changes: Arc::new(changes),
        }
    }

    pub fn change_set(&self) -> &ChangeSet {
        &self.changes
    }

    fn files<'a>(&self, paths: impl IntoIterator<Item = &'a String>) -> Vec<File> {
        paths
            .into_iter()
            .map(|path| File::new(self.repo.clone(), self.changes.clone(), path))
            .collect()
    }

    pub fn created(&self) -> Vec<File> {
        self.files(&unique(self.changes.created.iter()))
    }

    pub fn deleted(&self) -> Vec<File> {
        self.files(&unique(self.changes.deleted.iter()))
    }

    /// Modified files, not counting created ones
    pub fn modified_only(&self) -> Vec<File> {
        self.files(&unique(self.changes.modified.iter()))
    }

    /// Created or modified files
    pub fn edited(&self) -> Vec<File> {
        self.files(&self.changes.edited)
    }

    /// Created, modified or deleted files
    pub fn touched(&self) -> Vec<File> {
        self.files(&self.changes.touched())
    }

    pub fn untouched(&self) -> Vec<File> {
        self.files(&self.changes.untouched())
    }

    /// Every file at head regardless of whether it changed
    pub fn all(&self) -> Vec<File> {
        self.files(&self.changes.all)
    }

    /// Look up one file, failing with [`Error::NotFound`] for unknown paths
    pub fn get(&self, path: &str) -> Result<File> {
        self.find(path)
            .ok_or_else(|| Error::NotFound(path.to_string()))
    }

    /// Look up one file without failing
    pub fn find(&self, path: &str) -> Option<File> {
        self.changes
            .contains(path)
            .then(|| File::new(self.repo.clone(), self.changes.clone(), path))
    }

    /// A new view restricted to paths matching `patterns`; this one is left
    /// untouched
    pub fn filter<S: AsRef<str>>(&self, patterns: &[S]) -> Result<Files> {
        let matcher = Matcher::new(patterns)?;
        Ok(Self {
            repo: self.repo.clone(),
            changes: Arc::new(self.changes.filter(&matcher)),
        })
    }
}

impl fmt::Debug for Files {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Files")
            .field("changes", &self.changes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcs::MemoryRepository;
    use pretty_assertions::assert_eq;

    fn strings(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    fn paths(files: &[File]) -> Vec<&str> {
        files.iter().map(File::path).collect()
    }

    fn sample() -> Files {
        let changes = ChangeSet::new(
            strings(&["app/x.ts", "app/y.ts", "other/y.ts", "README.md"]),
            ChangedPaths {
                created: strings(&["app/x.ts"]),
                modified: strings(&["other/y.ts", "other/y.ts"]),
                deleted: strings(&["old.js"]),
            },
        );
        Files::new(Arc::new(MemoryRepository::new()), changes)
    }

    #[test]
    fn test_views() {
        let files = sample();
        assert_eq!(paths(&files.created()), vec!["app/x.ts"]);
        assert_eq!(paths(&files.modified_only()), vec!["other/y.ts"]);
        assert_eq!(paths(&files.edited()), vec!["app/x.ts", "other/y.ts"]);
        assert_eq!(paths(&files.deleted()), vec!["old.js"]);
        assert_eq!(
            paths(&files.touched()),
            vec!["app/x.ts", "other/y.ts", "old.js"]
        );
        assert_eq!(paths(&files.untouched()), vec!["app/y.ts", "README.md"]);
        assert_eq!(files.all().len(), 4);
    }

    #[test]
    fn test_filter_narrows_without_touching_original() {
        let files = sample();
        let app = files.filter(&["app/**"]).unwrap();

        assert_eq!(paths(&app.created()), vec!["app/x.ts"]);
        assert_eq!(paths(&app.all()), vec!["app/x.ts", "app/y.ts"]);
        assert!(app.modified_only().is_empty());
        assert!(app.deleted().is_empty());

        assert_eq!(files.all().len(), 4);
        assert_eq!(paths(&files.modified_only()), vec!["other/y.ts"]);
    }

    #[test]
    fn test_filter_basename_patterns() {
        let files = sample().filter(&["*.ts"]).unwrap();
        assert_eq!(files.all().len(), 3);
        assert!(files.deleted().is_empty());
    }

    #[test]
    fn test_get_known_and_unknown() {
        let files = sample();
        assert_eq!(files.get("README.md").unwrap().path(), "README.md");
        assert_eq!(files.get("old.js").unwrap().path(), "old.js");
        assert!(matches!(files.get("missing.ts"), Err(Error::NotFound(_))));
        assert!(files.find("missing.ts").is_none());
    }

    #[test]
    fn test_files_carry_flags() {
        let files = sample();
        let created = files.get("app/x.ts").unwrap();
        assert!(created.is_created());
        let deleted = files.get("old.js").unwrap();
        assert!(deleted.is_deleted());
        assert!(deleted.is_touched());
    }

    #[test]
    fn test_has_changes() {
        let files = sample();
        assert!(files.change_set().has_changes());
        let docs = files.filter(&["*.md"]).unwrap();
        assert!(!docs.change_set().has_changes());
    }
}
