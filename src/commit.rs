use crate::needle::Needle;
use crate::vcs::CommitInfo;

/// A commit in the reviewed range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    info: CommitInfo,
}

impl Commit {
    pub fn new(info: CommitInfo) -> Self {
        Self { info }
    }

    pub fn sha(&self) -> &str {
        &self.info.sha
    }

    /// Parent SHAs, empty for a root commit
    pub fn parents(&self) -> &[String] {
        &self.info.parents
    }

    pub fn message(&self) -> &str {
        &self.info.message
    }

    /// Does the commit message contain a string or match a regex?
    pub fn contains(&self, needle: impl Into<Needle>) -> bool {
        needle.into().found_in(&self.info.message)
    }
}
