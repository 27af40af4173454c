use serde::{Deserialize, Serialize};

use super::line::DiffLine;
use super::structured::{count_lines, Change};
use crate::error::{Error, Result};
use crate::files::{numbered_lines, File};

/// Magnitude of one file's change, in lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub changed: u32,
    pub added: u32,
    pub removed: u32,
    pub before: u32,
    pub after: u32,
}

/// Ratios above which a diff counts as a significant change.
///
/// Each threshold is a fraction in `(0, 1]` measured against the number of
/// lines after the change. Unset thresholds are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DiffThresholds {
    pub changed: Option<f64>,
    pub added: Option<f64>,
    pub removed: Option<f64>,
}

impl DiffThresholds {
    pub fn changed(mut self, ratio: f64) -> Self {
        self.changed = Some(ratio);
        self
    }

    pub fn added(mut self, ratio: f64) -> Self {
        self.added = Some(ratio);
        self
    }

    pub fn removed(mut self, ratio: f64) -> Self {
        self.removed = Some(ratio);
        self
    }

    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("changed", self.changed),
            ("added", self.added),
            ("removed", self.removed),
        ];
        for (name, value) in thresholds {
            if let Some(value) = value {
                if !(value > 0.0 && value <= 1.0) {
                    return Err(Error::configuration(format!(
                        "`{}` threshold should be a number between 0 and 1 (as a percentage), got {}",
                        name, value
                    )));
                }
            }
        }
        Ok(())
    }

    /// Does any set threshold get exceeded by `stats`?
    pub fn exceeded_by(&self, stats: &DiffStats) -> bool {
        // `changed` is measured by added lines, like `added`.
        let checks = [
            (self.changed, stats.added),
            (self.added, stats.added),
            (self.removed, stats.removed),
        ];
        checks.into_iter().any(|(threshold, count)| match threshold {
            None => false,
            // Nothing left after the change: any set threshold is exceeded.
            Some(_) if stats.after == 0 => true,
            Some(threshold) => f64::from(count) / f64::from(stats.after) > threshold,
        })
    }
}

/// Line-level view of one file's diff.
///
/// Each call goes back to the repository; nothing is cached between calls.
/// A created file has no base revision, so its whole content is reported as
/// added lines numbered from 1.
#[derive(Debug, Clone)]
pub struct Diff {
    file: File,
}

impl Diff {
    pub fn new(file: File) -> Self {
        Self { file }
    }

    async fn created_lines(&self) -> Result<Vec<DiffLine>> {
        let contents = self.file.contents().await?;
        Ok(numbered_lines(&contents)
            .map(|line| DiffLine::created(line.number(), line.text()))
            .collect())
    }

    async fn collect(&self, keep: impl Fn(&Change) -> bool) -> Result<Vec<DiffLine>> {
        let diff = self.file.repo().structured_diff(self.file.path()).await?;
        Ok(diff
            .changes()
            .filter(|change| keep(*change))
            .map(DiffLine::from_change)
            .collect())
    }

    /// Only the added lines
    pub async fn added(&self) -> Result<Vec<DiffLine>> {
        if self.file.is_created() {
            return self.created_lines().await;
        }
        self.collect(|change| matches!(change, Change::Add { .. }))
            .await
    }

    /// Only the removed lines
    pub async fn removed(&self) -> Result<Vec<DiffLine>> {
        if self.file.is_created() {
            return Ok(Vec::new());
        }
        self.collect(|change| matches!(change, Change::Del { .. }))
            .await
    }

    /// Added and removed lines
    pub async fn changed(&self) -> Result<Vec<DiffLine>> {
        if self.file.is_created() {
            return self.created_lines().await;
        }
        self.collect(|change| !matches!(change, Change::Normal { .. }))
            .await
    }

    /// Every line of every chunk, context included
    pub async fn unified(&self) -> Result<Vec<DiffLine>> {
        if self.file.is_created() {
            return self.created_lines().await;
        }
        self.collect(|_| true).await
    }

    /// Changed lines with `distance` lines of surrounding context
    pub async fn unified_within(&self, _distance: usize) -> Result<Vec<DiffLine>> {
        Err(Error::Unsupported("diff context distance"))
    }

    pub async fn stats(&self) -> Result<DiffStats> {
        if self.file.is_created() {
            let lines = count_lines(&self.file.contents().await?);
            return Ok(DiffStats {
                changed: lines,
                added: lines,
                removed: 0,
                before: 0,
                after: lines,
            });
        }

        let diff = self.file.repo().text_diff(self.file.path()).await?;
        Ok(DiffStats {
            changed: count_lines(&diff.diff),
            added: count_lines(&diff.added),
            removed: count_lines(&diff.removed),
            before: count_lines(&diff.before),
            after: count_lines(&diff.after),
        })
    }

    /// Does the diff change more of the file than any of `thresholds`?
    pub async fn changed_by(&self, thresholds: DiffThresholds) -> Result<bool> {
        thresholds.validate()?;
        let stats = self.stats().await?;
        Ok(thresholds.exceeded_by(&stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::{ChangeSet, Files};
    use crate::vcs::{MemoryRepository, Repository};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    async fn files_for(repo: MemoryRepository) -> Files {
        let all = repo.list_files().await.unwrap();
        let changed = repo.changed_paths().await.unwrap();
        Files::new(Arc::new(repo), ChangeSet::new(all, changed))
    }

    fn numbered(lines: &[DiffLine]) -> Vec<(Option<u32>, Option<u32>, &str)> {
        lines
            .iter()
            .map(|l| (l.line_number_before(), l.line_number_after(), l.text()))
            .collect()
    }

    #[tokio::test]
    async fn test_created_file_lines() {
        let files = files_for(MemoryRepository::new().with_head("foo.js", "a\nb\nc\n")).await;
        let diff = files.get("foo.js").unwrap().diff();

        let added = diff.added().await.unwrap();
        assert_eq!(
            numbered(&added),
            vec![(None, Some(1), "a"), (None, Some(2), "b"), (None, Some(3), "c")]
        );
        assert!(added.iter().all(DiffLine::is_added));
        assert_eq!(diff.changed().await.unwrap(), added);
        assert_eq!(diff.unified().await.unwrap(), added);
        assert!(diff.removed().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_modified_file_lines() {
        let files = files_for(
            MemoryRepository::new()
                .with_base("a.py", "keep\nold\nkeep2\n")
                .with_head("a.py", "keep\nnew\nkeep2\nextra\n"),
        )
        .await;
        let diff = files.get("a.py").unwrap().diff();

        let added = diff.added().await.unwrap();
        assert_eq!(
            numbered(&added),
            vec![(None, Some(2), "new"), (None, Some(4), "extra")]
        );

        let removed = diff.removed().await.unwrap();
        assert_eq!(numbered(&removed), vec![(Some(2), None, "old")]);

        let changed = diff.changed().await.unwrap();
        assert_eq!(changed.len(), 3);
        assert!(changed.iter().all(DiffLine::is_changed));

        let unified = diff.unified().await.unwrap();
        assert_eq!(unified.len(), 5);
        for line in &unified {
            assert_eq!(line.line_number_before().is_some(), !line.is_added());
            assert_eq!(line.line_number_after().is_some(), !line.is_removed());
            let flags = [line.is_added(), line.is_removed(), line.is_unchanged()];
            assert_eq!(flags.iter().filter(|f| **f).count(), 1);
        }
    }

    #[tokio::test]
    async fn test_created_file_stats() {
        let contents: String = (1..=20).map(|i| format!("line {}\n", i)).collect();
        let files = files_for(MemoryRepository::new().with_head("foo.js", &contents)).await;
        let stats = files.get("foo.js").unwrap().diff().stats().await.unwrap();
        assert_eq!(
            stats,
            DiffStats {
                changed: 20,
                added: 20,
                removed: 0,
                before: 0,
                after: 20
            }
        );
    }

    #[tokio::test]
    async fn test_modified_file_stats() {
        let files = files_for(
            MemoryRepository::new()
                .with_base("a.txt", "1\n2\n3\n4\n")
                .with_head("a.txt", "1\n2\nthree\n4\n5\n"),
        )
        .await;
        let stats = files.get("a.txt").unwrap().diff().stats().await.unwrap();
        assert_eq!(stats.added, 2);
        assert_eq!(stats.removed, 1);
        assert_eq!(stats.before, 4);
        assert_eq!(stats.after, 5);
        assert!(stats.changed > 0);
    }

    #[tokio::test]
    async fn test_changed_by() {
        // 1 of 4 lines after the change is new
        let files = files_for(
            MemoryRepository::new()
                .with_base("a.txt", "1\n2\n3\n")
                .with_head("a.txt", "1\n2\n3\n4\n"),
        )
        .await;
        let diff = files.get("a.txt").unwrap().diff();

        assert!(diff.changed_by(DiffThresholds::default().changed(0.2)).await.unwrap());
        assert!(!diff.changed_by(DiffThresholds::default().changed(0.5)).await.unwrap());
        assert!(!diff.changed_by(DiffThresholds::default().removed(0.1)).await.unwrap());
        assert!(diff
            .changed_by(DiffThresholds::default().added(0.9).removed(0.1).changed(0.2))
            .await
            .unwrap());
        assert!(!diff.changed_by(DiffThresholds::default()).await.unwrap());
    }

    #[tokio::test]
    async fn test_changed_by_rejects_out_of_range() {
        let files = files_for(MemoryRepository::new().with_head("a.txt", "x\n")).await;
        let diff = files.get("a.txt").unwrap().diff();

        for bad in [1.5, 0.0, -0.1, f64::NAN] {
            let err = diff
                .changed_by(DiffThresholds::default().changed(bad))
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Configuration(_)));
        }
        assert!(diff.changed_by(DiffThresholds::default().added(1.0)).await.is_ok());
    }

    #[test]
    fn test_empty_after_exceeds_set_thresholds() {
        let stats = DiffStats {
            changed: 3,
            added: 0,
            removed: 3,
            before: 3,
            after: 0,
        };
        assert!(DiffThresholds::default().removed(0.5).exceeded_by(&stats));
        assert!(DiffThresholds::default().added(1.0).exceeded_by(&stats));
        assert!(!DiffThresholds::default().exceeded_by(&stats));
    }

    #[tokio::test]
    async fn test_unified_within_is_unsupported() {
        let files = files_for(MemoryRepository::new().with_head("a.txt", "x\n")).await;
        let diff = files.get("a.txt").unwrap().diff();
        assert!(matches!(
            diff.unified_within(3).await,
            Err(Error::Unsupported(_))
        ));
    }
}
