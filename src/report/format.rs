use std::collections::BTreeMap;

use pulldown_cmark::{Event, Options, Parser};

use super::message::format_message;
use super::types::{Report, ReportLocation};
use crate::error::FormatError;

/// Render a report's message into the body of a review comment.
///
/// The template is dedented, trimmed and has its soft line breaks joined
/// before placeholders are substituted. Reports spanning more than one
/// location get a bullet list of those locations appended, linked under
/// `link_base` when one is given.
pub fn format_report(
    report: &Report,
    messages: &BTreeMap<String, String>,
    link_base: Option<&str>,
) -> Result<String, FormatError> {
    let template = messages
        .get(&report.message_id)
        .ok_or_else(|| FormatError::UnknownMessage(report.message_id.clone()))?;

    let markdown = join_soft_breaks(strip_indent(template).trim());
    let mut body = format_message(&markdown, &report.values)?
        .trim_end_matches('\n')
        .to_string();

    if report.locations.len() > 1 {
        let links = location_links(&report.locations, link_base);
        if !links.is_empty() {
            body.push_str("\n\n");
            body.push_str(&links);
        }
    }

    Ok(body)
}

/// Remove the indentation shared by every non-blank line
pub fn strip_indent(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    text.lines()
        .map(|line| line.get(indent..).unwrap_or_else(|| line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Join lines wrapped inside a paragraph with a single space, keeping
/// paragraph breaks and hard breaks.
pub fn join_soft_breaks(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let breaks = Parser::new_ext(markdown, options)
        .into_offset_iter()
        .filter(|(event, _)| matches!(event, Event::SoftBreak))
        .map(|(_, range)| range);

    let mut joined = String::with_capacity(markdown.len());
    let mut last = 0;
    for range in breaks {
        if range.start < last {
            continue;
        }
        joined.push_str(markdown[last..range.start].trim_end_matches([' ', '\t']));
        joined.push(' ');
        let rest = &markdown[range.end..];
        last = range.end + (rest.len() - rest.trim_start_matches([' ', '\t']).len());
    }
    joined.push_str(&markdown[last..]);
    joined
}

fn location_links(locations: &[ReportLocation], link_base: Option<&str>) -> String {
    locations
        .iter()
        .filter_map(|location| {
            let path = location.path()?;
            let (label, anchor) = match location.line() {
                Some(line) => (format!("{}:{}", path, line), format!("{}#L{}", path, line)),
                None => (path.to_string(), path.to_string()),
            };
            Some(match link_base {
                Some(base) => format!("- [{}]({}/{})", label, base.trim_end_matches('/'), anchor),
                None => format!("- `{}`", label),
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
}
