use clap::{Args, Subcommand};
use redrip_client::QuerySource;
use redrip_core::models::query::sql_file_name;
use redrip_core::profile;
use redrip_core::RedripError;
use redrip_diff::{compare, compare_all, DiffResult, DiffSummary};
use std::fmt::Write as _;
use std::path::Path;

use super::{parse_query_id, print_connection_hints, remote_error, to_json, Context, OutputFormat};

#[derive(Subcommand)]
pub enum DiffAction {
    /// Compare every <id>.sql file in the SQL directory
    All(OutputArgs),
    /// Compare one local SQL file with its Redash query
    Query(QueryArgs),
}

#[derive(Args)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    output: OutputFormat,
}

#[derive(Args)]
pub struct QueryArgs {
    /// ID of the query to compare
    query_id: String,

    #[command(flatten)]
    out: OutputArgs,
}

pub fn run(action: DiffAction, ctx: &Context) -> anyhow::Result<()> {
    match action {
        DiffAction::All(args) => {
            tracing::info!(profile = ?ctx.requested_profile, "starting diff all command");
            let (profile, client) = ctx.client()?;
            let dir = profile::resolve_directory(&profile.config);
            tracing::debug!(dir = %dir.display(), "using SQL directory");

            let summary = diff_all(&client, &profile.name, &dir)?;
            let out = match args.output {
                OutputFormat::Json => to_json(&summary)?,
                OutputFormat::Text => render_summary(&summary),
            };
            println!("{}", out);
            Ok(())
        }
        DiffAction::Query(args) => {
            tracing::info!(query_id = %args.query_id, "starting diff query command");
            let id = parse_query_id(&args.query_id)?;
            let (profile, client) = ctx.client()?;
            let dir = profile::resolve_directory(&profile.config);

            let result = diff_query(&client, id, &dir);
            let out = match args.out.output {
                OutputFormat::Json => to_json(&result)?,
                OutputFormat::Text => render_result(&result),
            };
            println!("{}", out);
            Ok(())
        }
    }
}

/// Compare the whole SQL directory against the server.
pub fn diff_all(source: &dyn QuerySource, profile: &str, dir: &Path) -> anyhow::Result<DiffSummary> {
    if !dir.is_dir() {
        anyhow::bail!("SQL directory does not exist: {}", dir.display());
    }
    let queries = source.list_queries().map_err(remote_error)?;
    tracing::info!(count = queries.len(), "retrieved queries from Redash");
    Ok(compare_all(dir, &queries, profile)?)
}

/// Compare `<dir>/<id>.sql` with query `id`. Every failure ends up in the
/// returned result rather than aborting.
pub fn diff_query(source: &dyn QuerySource, id: i64, dir: &Path) -> DiffResult {
    let local_path = dir.join(sql_file_name(id));
    if !local_path.exists() {
        tracing::error!(file = %local_path.display(), "local SQL file does not exist");
        let err = RedripError::LocalFileMissing { path: local_path.clone() };
        return DiffResult::error(id, None, &local_path, err.to_string());
    }

    tracing::debug!(id, "fetching query from Redash");
    let remote = match source.get_query(id) {
        Ok(query) => query,
        Err(e) => {
            tracing::error!(id, error = %e, "failed to get query from Redash");
            print_connection_hints(&e);
            return DiffResult::error(
                id,
                None,
                &local_path,
                format!("failed to get query from Redash: {}", e),
            );
        }
    };

    compare(id, Some(&remote), &local_path).unwrap_or_else(|e| {
        tracing::error!(id, error = %e, "error comparing query");
        DiffResult::error(id, Some(&remote), &local_path, e.to_string())
    })
}

fn render_result(result: &DiffResult) -> String {
    let mut out = format!(
        "[{}] {} {} ({})",
        result.status,
        result.query_id,
        result.query_name,
        result.local_path.display()
    );
    if let Some(message) = &result.error_message {
        let _ = write!(out, "\n  {}", message);
    }
    if let Some(differences) = &result.differences {
        for line in differences.lines() {
            let _ = write!(out, "\n    {}", line);
        }
    }
    out
}

fn render_summary(summary: &DiffSummary) -> String {
    let mut out = format!(
        "Profile: {}\nSQL directory: {}\n",
        summary.profile(),
        summary.sql_directory().display()
    );
    for result in summary.results() {
        out.push_str(&render_result(result));
        out.push('\n');
    }
    out.push_str(&summary.to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{HtmlSource, MemorySource};
    use redrip_diff::DiffStatus;
    use tempfile::TempDir;

    #[test]
    fn test_diff_all_scenarios() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("5.sql"), "SELECT 1").unwrap();
        std::fs::write(dir.path().join("7.sql"), "SELECT 1").unwrap();
        std::fs::write(dir.path().join("abc.sql"), "SELECT 1").unwrap();
        let source = MemorySource::new(&[(5, "five", " SELECT 1 ")]);

        let summary = diff_all(&source, "default", dir.path()).unwrap();
        assert_eq!(summary.results().len(), 2);
        assert_eq!(summary.results()[0].status, DiffStatus::Match);
        assert_eq!(summary.results()[1].status, DiffStatus::MissingInRedash);
        assert_eq!(summary.matches(), 1);
        assert_eq!(summary.missing_in_redash(), 1);

        let text = render_summary(&summary);
        assert!(text.contains("[MATCH] 5 five"));
        assert!(text.ends_with("1 matching, 0 different, 1 missing in Redash, 0 errors"));
    }

    #[test]
    fn test_diff_all_aborts_on_remote_error() {
        let dir = TempDir::new().unwrap();
        assert!(diff_all(&HtmlSource, "default", dir.path()).is_err());
        assert!(diff_all(&MemorySource::new(&[]), "default", &dir.path().join("gone")).is_err());
    }

    #[test]
    fn test_diff_query_outcomes() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("1.sql"), "SELECT a FROM t").unwrap();
        std::fs::write(dir.path().join("2.sql"), "SELECT 2").unwrap();
        let source = MemorySource::new(&[(1, "one", "SELECT b FROM t")]);

        let different = diff_query(&source, 1, dir.path());
        assert_eq!(different.status, DiffStatus::Different);
        assert!(different.differences.is_some());
        assert!(render_result(&different).starts_with("[DIFFERENT] 1 one"));

        let not_found = diff_query(&source, 2, dir.path());
        assert_eq!(not_found.status, DiffStatus::Error);
        assert_eq!(not_found.query_id, 2);
        assert!(not_found.differences.is_none());
        assert!(not_found
            .error_message
            .unwrap()
            .starts_with("failed to get query from Redash: query 2 not found"));

        let missing_local = diff_query(&source, 3, dir.path());
        assert_eq!(missing_local.status, DiffStatus::Error);
        assert!(missing_local
            .error_message
            .unwrap()
            .starts_with("local SQL file does not exist"));

        let html = diff_query(&HtmlSource, 1, dir.path());
        assert_eq!(html.status, DiffStatus::Error);
        assert!(html
            .error_message
            .unwrap()
            .starts_with("failed to get query from Redash"));
    }
}
