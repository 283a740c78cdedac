use anyhow::Result;
use clap::{Args, Parser};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gchurn")]
#[command(about = "Per-file churn metrics from git history, rename-aware")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[arg(long, help = "Output as JSON")]
    pub json: bool,

    #[arg(long, help = "Output as NDJSON")]
    pub ndjson: bool,

    #[arg(long, help = "Directory depth for aggregation")]
    pub depth: Option<u32>,

    #[arg(help = "Path prefix to report")]
    pub path: Option<String>,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, help = "Path to git repository")]
    pub repo: Option<PathBuf>,

    #[arg(long, help = "Start of the window (RFC3339, YYYY-MM-DD, or a duration ago like '2weeks'); defaults to yesterday")]
    pub since: Option<String>,

    #[arg(long, help = "End of the window (RFC3339, YYYY-MM-DD, or a duration ago)")]
    pub until: Option<String>,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        crate::churn::exec(self.common, self.depth, self.json, self.ndjson, self.path)
    }
}
