use anyhow::Context as _;
use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use redrip_client::QuerySource;
use redrip_core::profile;
use std::path::{Path, PathBuf};

use super::get::write_query;
use super::{remote_error, to_json, Context};

/// What a dump wrote.
pub struct DumpReport {
    pub snapshot: PathBuf,
    pub files: Vec<PathBuf>,
}

pub fn run(ctx: &Context) -> anyhow::Result<()> {
    tracing::info!("starting dump command");
    let (profile, client) = ctx.client()?;
    let dir = profile::resolve_directory(&profile.config);

    let timestamp = Local::now().format("%Y%m%d%H%M%S").to_string();
    let report = dump_queries(&client, &dir, &timestamp, ctx.show_progress)?;

    let snapshot_name = report
        .snapshot
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    println!(
        "All queries dumped to {}\nJSON list saved as {}",
        dir.display(),
        snapshot_name
    );
    Ok(())
}

/// Write a `<timestamp>.json` snapshot of every query, then each query as
/// `<id>.sql`.
pub fn dump_queries(
    source: &dyn QuerySource,
    dir: &Path,
    timestamp: &str,
    show_progress: bool,
) -> anyhow::Result<DumpReport> {
    let queries = source.list_queries().map_err(remote_error)?;
    tracing::info!(count = queries.len(), "retrieved queries from Redash");

    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory {}", dir.display()))?;

    let snapshot = dir.join(format!("{}.json", timestamp));
    tracing::debug!(file = %snapshot.display(), "writing JSON snapshot");
    std::fs::write(&snapshot, to_json(&queries)?)
        .with_context(|| format!("failed to write JSON file {}", snapshot.display()))?;
    tracing::info!(file = %snapshot.display(), "queries saved to JSON file");

    let pb = if show_progress && !queries.is_empty() {
        let pb = ProgressBar::new(queries.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut files = Vec::with_capacity(queries.len());
    for query in &queries {
        if let Some(ref pb) = pb {
            pb.set_message(query.file_name());
        }
        files.push(write_query(dir, query)?);
        if let Some(ref pb) = pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message(format!("{} queries", files.len()));
    }
    tracing::info!(dir = %dir.display(), count = files.len(), "all queries dumped");

    Ok(DumpReport { snapshot, files })
}
