use anyhow::Context as _;
use clap::Args;
use redrip_client::QuerySource;
use redrip_core::models::query::Query;
use redrip_core::profile;
use std::path::{Path, PathBuf};

use super::{parse_query_id, remote_error, Context};

#[derive(Args)]
pub struct GetArgs {
    /// ID of the query to fetch
    query_id: String,
}

pub fn run(args: GetArgs, ctx: &Context) -> anyhow::Result<()> {
    tracing::info!(query_id = %args.query_id, "starting get command");
    let id = parse_query_id(&args.query_id)?;

    let (profile, client) = ctx.client()?;
    let dir = profile::resolve_directory(&profile.config);

    let path = fetch_to_dir(&client, id, &dir)?;
    println!("{}", path.display());
    Ok(())
}

/// Fetch one query and write it into `dir`.
pub fn fetch_to_dir(source: &dyn QuerySource, id: i64, dir: &Path) -> anyhow::Result<PathBuf> {
    tracing::debug!(id, "fetching query from Redash");
    let query = source.get_query(id).map_err(remote_error)?;
    tracing::info!(id = query.id, name = %query.name, "retrieved query from Redash");
    write_query(dir, &query)
}

/// Write `<dir>/<id>.sql`, creating `dir` if needed.
pub fn write_query(dir: &Path, query: &Query) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory {}", dir.display()))?;

    let path = dir.join(query.file_name());
    tracing::debug!(id = query.id, name = %query.name, file = %path.display(), "writing query to file");
    std::fs::write(&path, &query.text)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(id = query.id, file = %path.display(), "query saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::MemorySource;
    use redrip_core::RedripError;
    use tempfile::TempDir;

    #[test]
    fn test_fetch_writes_sql_file() {
        let dir = TempDir::new().unwrap();
        let source = MemorySource::new(&[(12, "weekly", "SELECT * FROM users WHERE id = 1")]);

        let path = fetch_to_dir(&source, 12, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("12.sql"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "SELECT * FROM users WHERE id = 1"
        );
    }

    #[test]
    fn test_write_creates_nested_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested").join("sql");
        let query = Query {
            id: 1,
            name: "q".into(),
            text: "SELECT 1".into(),
        };
        let path = write_query(&nested, &query).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_missing_query_is_not_found() {
        let dir = TempDir::new().unwrap();
        let source = MemorySource::new(&[]);
        let err = fetch_to_dir(&source, 5, dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RedripError>(),
            Some(RedripError::NotFound { id: 5 })
        ));
        assert!(!dir.path().join("5.sql").exists());
    }
}
