pub mod config;
pub mod diff;
pub mod dump;
pub mod get;
pub mod list;

use anyhow::Context as _;
use clap::{Subcommand, ValueEnum};
use redrip_client::RedashClient;
use redrip_core::config::Config;
use redrip_core::profile::{self, ResolvedProfile};
use redrip_core::RedripError;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Command {
    /// List all Redash queries
    List(list::ListArgs),
    /// Fetch one query and save it as <id>.sql
    Get(get::GetArgs),
    /// Save every query as <id>.sql plus a timestamped JSON snapshot
    Dump,
    /// Manage redrip configuration
    Config {
        #[command(subcommand)]
        action: config::ConfigAction,
    },
    /// Compare local SQL files with Redash queries
    Diff {
        #[command(subcommand)]
        action: diff::DiffAction,
    },
}

/// Output format for commands that print data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

/// Per-invocation settings shared by all commands.
pub struct Context {
    pub requested_profile: Option<String>,
    pub config_path: PathBuf,
    pub show_progress: bool,
}

impl Context {
    pub fn new(
        requested_profile: Option<String>,
        config_path: Option<PathBuf>,
        show_progress: bool,
    ) -> anyhow::Result<Self> {
        let config_path = match config_path {
            Some(path) => path,
            None => Config::config_path()?,
        };
        tracing::debug!(path = %config_path.display(), "using config path");
        Ok(Self {
            requested_profile,
            config_path,
            show_progress,
        })
    }

    pub fn load_config(&self) -> anyhow::Result<Config> {
        Config::load(&self.config_path).context("failed to load configuration")
    }

    /// Load the config and pick the active profile.
    pub fn resolve_profile(&self) -> anyhow::Result<ResolvedProfile> {
        let config = self.load_config()?;
        Ok(profile::resolve(&config, self.requested_profile.as_deref()))
    }

    /// Resolve the profile and build a client for it.
    pub fn client(&self) -> anyhow::Result<(ResolvedProfile, RedashClient)> {
        let profile = self.resolve_profile()?;
        let client = RedashClient::from_profile(&profile)
            .context("failed to initialize Redash client")?;
        Ok((profile, client))
    }
}

pub fn run(cmd: Command, ctx: &Context) -> anyhow::Result<()> {
    match cmd {
        Command::List(args) => list::run(args, ctx),
        Command::Get(args) => get::run(args, ctx),
        Command::Dump => dump::run(ctx),
        Command::Config { action } => config::run(action, ctx),
        Command::Diff { action } => diff::run(action, ctx),
    }
}

/// Parse a query ID given on the command line.
pub fn parse_query_id(input: &str) -> Result<i64, RedripError> {
    input.trim().parse().map_err(|_| {
        tracing::error!(input, "invalid query ID");
        RedripError::InvalidQueryId {
            input: input.to_string(),
        }
    })
}

/// Print likely causes when the server answered with something unexpected.
pub fn print_connection_hints(err: &RedripError) {
    let hints = err.connection_hints();
    if hints.is_empty() {
        return;
    }
    eprintln!("Error: {}\n", err);
    eprintln!("Possible solutions:");
    for (i, hint) in hints.iter().enumerate() {
        eprintln!("{}. {}", i + 1, hint);
    }
}

/// Attach connection hints to a remote error on its way out.
pub fn remote_error(err: RedripError) -> anyhow::Error {
    print_connection_hints(&err);
    err.into()
}

pub fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize output as JSON")
}
