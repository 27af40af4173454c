mod format;
mod merge;
mod message;
mod types;

pub use format::{format_report, join_soft_breaks, strip_indent};
pub use merge::{merge_reports, MERGE_THRESHOLD};
pub use message::{format_message, MessageTemplate, SAFE_HTML_TAGS};
pub use types::{Comment, Report, ReportKind, ReportLocation, RunResult, Summary, Values};
