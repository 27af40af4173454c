//! Diff-aware rule engine for reviewing change-sets.
//!
//! A [`Repository`](vcs::Repository) describes the change-set, rules declare
//! which files or commits they care about, and the
//! [`RuleEngine`](rules::RuleEngine) runs the matching rules and hands their
//! rendered comments to a [`ReviewSink`](output::ReviewSink).

pub mod cli;
pub mod commit;
pub mod diff;
pub mod error;
pub mod files;
pub mod matcher;
pub mod needle;
pub mod output;
pub mod report;
pub mod rules;
pub mod vcs;

pub use commit::Commit;
pub use error::{Error, FormatError, Result};
pub use matcher::{match_paths, Matcher};
pub use needle::Needle;
