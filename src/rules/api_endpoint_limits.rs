use async_trait::async_trait;
use regex::Regex;

use super::{Rule, RuleBody, RuleMatchers, RuleValues};
use crate::error::{Error, Result};
use crate::files::LineWindow;

pub const ID: &str = "api-endpoint-limits";

const MESSAGES: [(&str, &str); 2] = [
    (
        "loginRequired",
        "
        Consider adding @login_required.
        ",
    ),
    (
        "rateLimit",
        "
        Strongly consider adding a @rate_limit to protect our backend.
        ",
    ),
];

/// Asks for rate limiting and authentication on newly routed API endpoints
pub fn api_endpoint_limits() -> Result<Rule> {
    Rule::new(
        ID,
        RuleMatchers::new().files(&["api/**/*.py"]),
        MESSAGES,
        ApiEndpointLimits {
            definition: pattern(r"^def ")?,
            rate_limit: pattern(r"^@rate_limit")?,
            login_required: pattern(r"^@login_required")?,
        },
    )
}

fn pattern(source: &str) -> Result<Regex> {
    Regex::new(source).map_err(|e| Error::configuration(format!("invalid pattern `{}`: {}", source, e)))
}

struct ApiEndpointLimits {
    definition: Regex,
    rate_limit: Regex,
    login_required: Regex,
}

#[async_trait]
impl RuleBody for ApiEndpointLimits {
    async fn run(&self, values: RuleValues<'_>) -> anyhow::Result<()> {
        let Some(files) = values.files else {
            return Ok(());
        };

        for file in files.edited() {
            for line in file.diff().added().await? {
                if !line.contains("@route") {
                    continue;
                }

                let mut has_rate_limit = false;
                let mut has_login_required = false;

                // Decorators sit between the route and the function definition.
                for decorator in file.lines(LineWindow::all().after(&line)).await? {
                    if decorator.contains(&self.definition) {
                        break;
                    }
                    has_rate_limit |= decorator.contains(&self.rate_limit);
                    has_login_required |= decorator.contains(&self.login_required);
                }

                if !has_rate_limit {
                    values.context.warn("rateLimit", (&file, &line));
                }
                if !has_login_required {
                    values.context.warn("loginRequired", (&file, &line));
                }
            }
        }

        Ok(())
    }
}
