mod commands;

use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "redrip",
    version,
    about = "Sync SQL queries between Redash and a local directory"
)]
struct Cli {
    #[command(subcommand)]
    command: commands::Command,

    /// Configuration profile to use (default: REDRIP_PROFILE, then 'default')
    #[arg(short, long, global = true)]
    profile: Option<String>,

    /// Config file location (default: ~/.redrip/config.conf)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Show info, warning and error logs
    #[arg(short, long, global = true, conflicts_with_all = ["debug", "quiet"])]
    verbose: bool,

    /// Show all logs, including debug
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    debug: bool,

    /// Only show errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else if self.verbose {
            Level::INFO
        } else if self.debug {
            Level::DEBUG
        } else {
            Level::WARN
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(cli.log_level())
        .init();
    tracing::debug!("redrip starting");

    let ctx = commands::Context::new(cli.profile, cli.config, !cli.quiet)?;
    commands::run(cli.command, &ctx)
}
