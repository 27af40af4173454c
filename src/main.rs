use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use diffaudit::cli::Cli;
use diffaudit::output::{json::write_result, print_summary, ConsoleSink};
use diffaudit::rules::{builtin_rules, Rule, RuleEngine, BUILTIN_RULE_IDS};
use diffaudit::vcs::GitCli;
use tracing::info;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.list_rules {
        for id in BUILTIN_RULE_IDS {
            println!("{}", id);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let rules = select_rules(builtin_rules()?, &cli.rules)?;
    info!(
        repo = %cli.repo.display(),
        base = %cli.base,
        head = %cli.head,
        rules = rules.len(),
        "Starting review"
    );

    let repo = GitCli::new(&cli.repo, &cli.base, &cli.head);
    let engine = RuleEngine::new(Arc::new(repo))
        .with_revisions(&cli.base, &cli.head)
        .with_link_base(cli.link_base.clone());

    let mut sink = ConsoleSink::new();
    let result = engine.run(&rules, &mut sink).await?;

    if let Some(path) = &cli.output {
        write_result(&result, path)?;
    }
    print_summary(&result, cli.output.as_deref());

    if result.summary.has_failures() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn select_rules(rules: Vec<Rule>, ids: &[String]) -> Result<Vec<Rule>> {
    if ids.is_empty() {
        return Ok(rules);
    }
    if let Some(unknown) = ids.iter().find(|id| !BUILTIN_RULE_IDS.contains(&id.as_str())) {
        bail!(
            "Unknown rule `{}`; available rules: {}",
            unknown,
            BUILTIN_RULE_IDS.join(", ")
        );
    }
    Ok(rules
        .into_iter()
        .filter(|rule| ids.iter().any(|id| id == rule.id()))
        .collect())
}
