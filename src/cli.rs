use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "diffaudit")]
#[command(about = "Review a change-set against diff-aware rules")]
#[command(version)]
pub struct Cli {
    /// Repository to review
    #[arg(long, env = "DIFFAUDIT_REPO", default_value = ".")]
    pub repo: PathBuf,

    /// Base revision of the change-set
    #[arg(long, env = "DIFFAUDIT_BASE", default_value = "origin/main")]
    pub base: String,

    /// Head revision of the change-set
    #[arg(long, env = "DIFFAUDIT_HEAD", default_value = "HEAD")]
    pub head: String,

    /// Write the run result as JSON to this file
    #[arg(long, env = "DIFFAUDIT_OUTPUT")]
    pub output: Option<PathBuf>,

    /// URL prefix for links to file locations, e.g. https://github.com/org/repo/blob/<sha>
    #[arg(long, env = "DIFFAUDIT_LINK_BASE")]
    pub link_base: Option<String>,

    /// Only run these built-in rules (repeatable)
    #[arg(long = "rule", value_name = "ID")]
    pub rules: Vec<String>,

    /// Print the ids of the built-in rules and exit
    #[arg(long)]
    pub list_rules: bool,
}
