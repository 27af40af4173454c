use async_trait::async_trait;
use regex::Regex;

use super::{Rule, RuleBody, RuleMatchers, RuleValues};
use crate::error::{Error, Result};

pub const ID: &str = "todo-comments";

// Close enough for a reminder on changed and nearby lines.
const TODO_PATTERN: &str = r"/[/*].*\bTODO\b";

const MESSAGES: [(&str, &str); 1] = [(
    "fixTodoComment",
    "
    Reminder: There''s a TODO comment nearby some code you changed. If you
    added this comment, this is just a friendly reminder. If you did not add
    this comment but were just changing some nearby code, could you try to
    address it as part of your PR?
    ",
)];

/// Points out TODO comments in and around changed lines
pub fn todo_comments() -> Result<Rule> {
    let todo = Regex::new(TODO_PATTERN)
        .map_err(|e| Error::configuration(format!("invalid TODO pattern: {}", e)))?;

    Rule::new(
        ID,
        RuleMatchers::new().files(&["**/*.{js,ts,tsx}"]),
        MESSAGES,
        TodoComments { todo },
    )
}

struct TodoComments {
    todo: Regex,
}

#[async_trait]
impl RuleBody for TodoComments {
    async fn run(&self, values: RuleValues<'_>) -> anyhow::Result<()> {
        let Some(files) = values.files else {
            return Ok(());
        };

        for file in files.edited() {
            for line in file.diff().unified().await? {
                if line.is_removed() {
                    continue;
                }
                if line.contains(&self.todo) {
                    values.context.warn("fixTodoComment", (&file, &line));
                }
            }
        }

        Ok(())
    }
}
