use std::collections::BTreeMap;
use std::fmt;
use std::panic::Location;

use async_trait::async_trait;

use super::context::Context;
use crate::commit::Commit;
use crate::error::{Error, Result};
use crate::files::Files;
use crate::needle::Needle;

/// Commit-message matchers are substrings or regexes
pub type CommitMatcher = Needle;

/// Which parts of a change-set a rule cares about.
///
/// A rule runs when any declared kind matches. An absent kind does not take
/// part in matching; an empty list is an authoring error.
#[derive(Debug, Clone, Default)]
pub struct RuleMatchers {
    pub files: Option<Vec<String>>,
    pub commits: Option<Vec<CommitMatcher>>,
}

impl RuleMatchers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match changes to files matching any of `patterns`
    pub fn files<S: AsRef<str>>(mut self, patterns: &[S]) -> Self {
        self.files = Some(patterns.iter().map(|p| p.as_ref().to_string()).collect());
        self
    }

    /// Match commits whose message contains any of `matchers`
    pub fn commits<I, M>(mut self, matchers: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<CommitMatcher>,
    {
        self.commits = Some(matchers.into_iter().map(Into::into).collect());
        self
    }

    /// Is no matcher kind declared at all?
    pub fn is_empty(&self) -> bool {
        self.files.is_none() && self.commits.is_none()
    }
}

/// Inputs handed to a rule body, one entry per matcher kind.
///
/// Kinds the rule did not declare are `None`.
pub struct RuleValues<'a> {
    pub files: Option<Files>,
    pub commits: Option<Vec<Commit>>,
    pub context: &'a Context,
}

/// The logic of a rule
#[async_trait]
pub trait RuleBody: Send + Sync {
    async fn run(&self, values: RuleValues<'_>) -> anyhow::Result<()>;
}

/// A declared review rule: what it matches, the messages it can report and
/// the body that inspects the change-set.
pub struct Rule {
    id: String,
    matchers: RuleMatchers,
    messages: BTreeMap<String, String>,
    body: Box<dyn RuleBody>,
    declared_at: &'static Location<'static>,
}

impl Rule {
    /// Declare a rule. Fails with a configuration error when `matchers`
    /// declares no kind; a rule that should see every change must say so
    /// with `files: ["**"]`.
    #[track_caller]
    pub fn new<I, K, V>(
        id: &str,
        matchers: RuleMatchers,
        messages: I,
        body: impl RuleBody + 'static,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let declared_at = Location::caller();

        if matchers.is_empty() {
            return Err(Error::configuration(format!(
                "rule `{}` (declared at {}) must match something, e.g. `files: [\"**\"]`",
                id, declared_at
            )));
        }

        Ok(Self {
            id: id.to_string(),
            matchers,
            messages: messages
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            body: Box::new(body),
            declared_at,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn matchers(&self) -> &RuleMatchers {
        &self.matchers
    }

    pub fn messages(&self) -> &BTreeMap<String, String> {
        &self.messages
    }

    /// Source location of the `Rule::new` call
    pub fn declared_at(&self) -> &'static Location<'static> {
        self.declared_at
    }

    pub(crate) async fn run(&self, values: RuleValues<'_>) -> anyhow::Result<()> {
        self.body.run(values).await
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("matchers", &self.matchers)
            .field("messages", &self.messages.keys().collect::<Vec<_>>())
            .field("declared_at", &format_args!("{}", self.declared_at))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    struct Noop;

    #[async_trait]
    impl RuleBody for Noop {
        async fn run(&self, _values: RuleValues<'_>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_empty_match_spec_rejected() {
        let err = Rule::new("empty", RuleMatchers::new(), [("m", "x")], Noop).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_rule_records_declaration_site() {
        let line = line!() + 1;
        let rule = Rule::new("r", RuleMatchers::new().files(&["**"]), [("m", "x")], Noop).unwrap();

        assert_eq!(rule.id(), "r");
        assert_eq!(rule.declared_at().line(), line);
        assert!(rule.declared_at().file().ends_with("rule.rs"));
        assert_eq!(rule.messages()["m"], "x");
    }

    #[test]
    fn test_matchers_builder() {
        let matchers = RuleMatchers::new()
            .files(&["*.ts"])
            .commits([Regex::new(r"JIRA-\d+").unwrap()]);

        assert!(!matchers.is_empty());
        assert_eq!(matchers.files, Some(vec!["*.ts".to_string()]));
        assert_eq!(matchers.commits.map(|c| c.len()), Some(1));
    }

    #[test]
    fn test_declared_empty_list_is_not_an_empty_spec() {
        let empty: [&str; 0] = [];
        assert!(Rule::new("r", RuleMatchers::new().files(&empty), [("m", "x")], Noop).is_ok());
    }
}
