use std::sync::Arc;

use anyhow::{Context as _, Result};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use super::context::Context;
use super::filter::RuleFilterRegistry;
use super::rule::Rule;
use crate::commit::Commit;
use crate::files::{ChangeSet, Files};
use crate::output::ReviewSink;
use crate::report::{format_report, merge_reports, Comment, Report, RunResult};
use crate::vcs::Repository;

/// Runs rules against one change-set and emits their comments.
///
/// The repository is injected; nothing is looked up globally.
pub struct RuleEngine {
    repo: Arc<dyn Repository>,
    base: String,
    head: String,
    link_base: Option<String>,
}

impl RuleEngine {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self {
            repo,
            base: "base".to_string(),
            head: "head".to_string(),
            link_base: None,
        }
    }

    /// Revision names recorded in the run result
    pub fn with_revisions(mut self, base: &str, head: &str) -> Self {
        self.base = base.to_string();
        self.head = head.to_string();
        self
    }

    /// URL prefix for the location links of multi-location comments
    pub fn with_link_base(mut self, link_base: Option<String>) -> Self {
        self.link_base = link_base;
        self
    }

    /// Evaluate `rules` in order and hand every resulting comment to `sink`.
    ///
    /// If the head revision cannot be enumerated the run ends with no
    /// comments. A failing rule aborts the run.
    pub async fn run(&self, rules: &[Rule], sink: &mut dyn ReviewSink) -> Result<RunResult> {
        let mut result = RunResult::new(&self.base, &self.head);
        result.rules_evaluated = rules.len();

        let all = match self.repo.list_files().await {
            Ok(all) => all,
            Err(e) => {
                warn!(error = %e, "Version control state unavailable, skipping review");
                return Ok(result);
            }
        };

        let registry = self.discover(all).await?;

        let mut groups: IndexMap<(usize, String), Vec<Report>> = IndexMap::new();
        for (index, rule) in rules.iter().enumerate() {
            let matched = registry
                .any(rule.matchers())
                .await
                .with_context(|| provenance(rule))?;
            if !matched {
                debug!(rule = rule.id(), "Rule did not match, skipping");
                continue;
            }

            debug!(rule = rule.id(), "Running rule");
            result.rules_matched += 1;

            let context = Context::new(rule.id());
            let values = registry
                .build_values(rule.matchers(), &context)
                .await
                .with_context(|| provenance(rule))?;
            rule.run(values).await.with_context(|| provenance(rule))?;

            for report in context.into_reports() {
                groups
                    .entry((index, report.message_id.clone()))
                    .or_default()
                    .push(report);
            }
        }

        // Render everything before emitting so a formatting failure leaves
        // the sink untouched.
        let mut comments = Vec::new();
        for ((index, _), reports) in groups {
            let rule = &rules[index];
            for report in merge_reports(reports) {
                comments.push(self.render(rule, &report)?);
            }
        }
        for comment in &comments {
            sink.emit(comment);
        }

        let result = result.with_comments(comments);
        info!(
            rules = result.rules_evaluated,
            matched = result.rules_matched,
            comments = result.summary.comments_count,
            "Review finished"
        );
        Ok(result)
    }

    async fn discover(&self, all: Vec<String>) -> Result<RuleFilterRegistry> {
        let changed = self
            .repo
            .changed_paths()
            .await
            .context("Failed to classify changed files")?;
        let commits = self
            .repo
            .commits()
            .await
            .context("Failed to list commits")?
            .into_iter()
            .map(Commit::new)
            .collect();

        let files = Files::new(self.repo.clone(), ChangeSet::new(all, changed));
        Ok(RuleFilterRegistry::new(files, commits))
    }

    fn render(&self, rule: &Rule, report: &Report) -> Result<Comment> {
        let body = format_report(report, rule.messages(), self.link_base.as_deref())
            .with_context(|| {
                format!(
                    "Failed to format message `{}` of {}",
                    report.message_id,
                    provenance(rule)
                )
            })?;

        // Only a single location can anchor a comment.
        let (path, line) = match report.locations.as_slice() {
            [location] => (location.path().map(str::to_string), location.line()),
            _ => (None, None),
        };

        Ok(Comment {
            rule_id: rule.id().to_string(),
            kind: report.kind,
            body,
            path,
            line,
        })
    }
}

fn provenance(rule: &Rule) -> String {
    format!("rule `{}` declared at {}", rule.id(), rule.declared_at())
}
