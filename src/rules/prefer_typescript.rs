use async_trait::async_trait;

use super::{Rule, RuleBody, RuleMatchers, RuleValues};
use crate::diff::DiffThresholds;
use crate::error::Result;

pub const ID: &str = "prefer-typescript";

/// Share of added lines above which a JavaScript file counts as heavily changed
const ADDED_THRESHOLD: f64 = 0.1;
/// Share of removed lines above which a JavaScript file counts as heavily changed
const REMOVED_THRESHOLD: f64 = 0.5;

const FLOW_PRAGMA: &str = "// @flow";

const MESSAGES: [(&str, &str); 4] = [
    (
        "foundNewJSFile",
        "
        **Use TypeScript for new code files**

        All new frontend code should be written in TypeScript so we can leverage
        its functionality as much as possible. While the codebase will work with
        plain JavaScript files, it cannot ensure that this new code is safe, or
        provide any guarantees to other consumers of this code.
        ",
    ),
    (
        "foundJSFileWithManyChanges",
        "
        **Prefer TypeScript**

        Migrate JavaScript files to TypeScript when making major changes
        ",
    ),
    (
        "foundNewFlowFile",
        "
        **Prefer TypeScript**

        Don''t create new Flow-typed files, use TypeScript
        ",
    ),
    (
        "foundChangedFlowFile",
        "
        **Prefer TypeScript**

        Migrate Flow-typed JavaScript files to TypeScript
        ",
    ),
];

/// Nudges new and heavily changed JavaScript and Flow files towards TypeScript
pub fn prefer_typescript() -> Result<Rule> {
    Rule::new(
        ID,
        RuleMatchers::new().files(&["**/*.{js,jsx,ts,tsx}"]),
        MESSAGES,
        PreferTypeScript,
    )
}

struct PreferTypeScript;

#[async_trait]
impl RuleBody for PreferTypeScript {
    async fn run(&self, values: RuleValues<'_>) -> anyhow::Result<()> {
        let Some(files) = values.files else {
            return Ok(());
        };
        let context = values.context;

        for file in files.touched() {
            if !file.matches(&["*.{js,jsx}"])? {
                continue;
            }

            if file.is_created() {
                context.warn("foundNewJSFile", &file);
            } else if file.is_modified_only() {
                if file.contains(FLOW_PRAGMA).await? {
                    let had_flow = match file.before() {
                        Some(before) => before.contains(FLOW_PRAGMA).await?,
                        None => false,
                    };
                    if had_flow {
                        context.warn("foundChangedFlowFile", &file);
                    } else {
                        context.warn("foundNewFlowFile", &file);
                    }
                } else {
                    let thresholds = DiffThresholds::default()
                        .added(ADDED_THRESHOLD)
                        .removed(REMOVED_THRESHOLD);
                    if file.diff().changed_by(thresholds).await? {
                        context.warn("foundJSFileWithManyChanges", &file);
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::CollectingSink;
    use crate::report::{Comment, ReportKind};
    use crate::rules::RuleEngine;
    use crate::vcs::MemoryRepository;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    async fn review(repo: MemoryRepository) -> Vec<Comment> {
        let rules = vec![prefer_typescript().unwrap()];
        let mut sink = CollectingSink::new();
        RuleEngine::new(Arc::new(repo))
            .run(&rules, &mut sink)
            .await
            .unwrap();
        sink.into_comments()
    }

    fn lines(n: usize) -> String {
        (1..=n).map(|i| format!("const v{} = {};\n", i, i)).collect()
    }

    #[tokio::test]
    async fn test_new_js_file() {
        let comments = review(MemoryRepository::new().with_head("src/app.js", "x\n")).await;

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].kind, ReportKind::Warn);
        assert_eq!(comments[0].path.as_deref(), Some("src/app.js"));
        assert_eq!(comments[0].line, None);
        assert!(comments[0]
            .body
            .starts_with("**Use TypeScript for new code files**\n\nAll new frontend code"));
    }

    #[tokio::test]
    async fn test_new_ts_file_is_fine() {
        let comments = review(MemoryRepository::new().with_head("src/app.ts", "x\n")).await;
        assert!(comments.is_empty());
    }

    #[tokio::test]
    async fn test_new_flow_annotation() {
        let comments = review(
            MemoryRepository::new()
                .with_base("a.js", "x\n")
                .with_head("a.js", "// @flow\nx\n"),
        )
        .await;

        assert_eq!(comments.len(), 1);
        assert!(comments[0].body.contains("Don't create new Flow-typed files"));
    }

    #[tokio::test]
    async fn test_changed_flow_file() {
        let comments = review(
            MemoryRepository::new()
                .with_base("a.js", "// @flow\nx\n")
                .with_head("a.js", "// @flow\ny\n"),
        )
        .await;

        assert_eq!(comments.len(), 1);
        assert!(comments[0].body.contains("Migrate Flow-typed JavaScript files"));
    }

    #[tokio::test]
    async fn test_js_file_with_many_changes() {
        let before = lines(20);
        let after = format!("{}{}", before, "const extra = 1;\nconst more = 2;\nconst lots = 3;\n");
        let comments = review(
            MemoryRepository::new()
                .with_base("a.js", &before)
                .with_head("a.js", &after),
        )
        .await;

        assert_eq!(comments.len(), 1);
        assert!(comments[0].body.contains("when making major changes"));
    }

    #[tokio::test]
    async fn test_js_file_with_small_change() {
        let before = lines(20);
        let after = format!("{}const extra = 1;\n", before);
        let comments = review(
            MemoryRepository::new()
                .with_base("a.js", &before)
                .with_head("a.js", &after),
        )
        .await;

        assert!(comments.is_empty());
    }
}
