mod context;
mod engine;
mod filter;
mod rule;

mod api_endpoint_limits;
mod commit_ticket_link;
mod prefer_typescript;
mod todo_comments;

pub use context::Context;
pub use engine::RuleEngine;
pub use filter::{CommitsFilter, FilesFilter, RuleFilter, RuleFilterRegistry};
pub use rule::{CommitMatcher, Rule, RuleBody, RuleMatchers, RuleValues};

pub use api_endpoint_limits::api_endpoint_limits;
pub use commit_ticket_link::commit_ticket_link;
pub use prefer_typescript::prefer_typescript;
pub use todo_comments::todo_comments;

use crate::error::Result;

/// Ids of the rules shipped with the crate, in evaluation order
pub const BUILTIN_RULE_IDS: [&str; 4] = [
    api_endpoint_limits::ID,
    commit_ticket_link::ID,
    prefer_typescript::ID,
    todo_comments::ID,
];

/// Every built-in rule
pub fn builtin_rules() -> Result<Vec<Rule>> {
    Ok(vec![
        api_endpoint_limits()?,
        commit_ticket_link()?,
        prefer_typescript()?,
        todo_comments()?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_rule_ids() {
        let rules = builtin_rules().unwrap();
        let ids: Vec<&str> = rules.iter().map(Rule::id).collect();
        assert_eq!(ids, BUILTIN_RULE_IDS.to_vec());
    }
}
