use async_trait::async_trait;
use regex::Regex;

use super::{Rule, RuleBody, RuleMatchers, RuleValues};
use crate::error::{Error, Result};
use crate::report::{ReportKind, ReportLocation, Values};

pub const ID: &str = "commit-ticket-link";

const TICKET_PATTERN: &str = r"\b(JIRA-\d+)\b";

const MESSAGES: [(&str, &str); 1] = [(
    "ticketLink",
    "
    [View linked ticket {ticket} on JIRA](https://jira.intranet.corp/{ticket})
    ",
)];

/// Links the tickets referenced by commit messages
pub fn commit_ticket_link() -> Result<Rule> {
    let ticket = Regex::new(TICKET_PATTERN)
        .map_err(|e| Error::configuration(format!("invalid ticket pattern: {}", e)))?;

    Rule::new(
        ID,
        RuleMatchers::new().commits([ticket.clone()]),
        MESSAGES,
        CommitTicketLink { ticket },
    )
}

struct CommitTicketLink {
    ticket: Regex,
}

#[async_trait]
impl RuleBody for CommitTicketLink {
    async fn run(&self, values: RuleValues<'_>) -> anyhow::Result<()> {
        for commit in values.commits.unwrap_or_default() {
            if let Some(ticket) = self.ticket.captures(commit.message()).and_then(|c| c.get(1)) {
                let values_for_message =
                    Values::from([("ticket".to_string(), ticket.as_str().to_string())]);
                values.context.report(
                    ReportKind::Message,
                    "ticketLink",
                    ReportLocation::None,
                    values_for_message,
                );
            }
        }
        Ok(())
    }
}
