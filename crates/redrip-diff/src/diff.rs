use redrip_core::error::{RedripError, Result};
use redrip_core::models::query::{parse_sql_file_name, Query};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::text;

/// Outcome of comparing one local file with one remote query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiffStatus {
    /// Trimmed local and remote text are identical.
    Match,
    /// Both exist but the text differs.
    Different,
    /// The local file has no counterpart on the server.
    MissingInRedash,
    /// The comparison itself failed.
    Error,
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiffStatus::Match => write!(f, "MATCH"),
            DiffStatus::Different => write!(f, "DIFFERENT"),
            DiffStatus::MissingInRedash => write!(f, "MISSING_IN_REDASH"),
            DiffStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// Result of a single comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    pub query_id: i64,
    #[serde(default)]
    pub query_name: String,
    pub status: DiffStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub local_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub differences: Option<String>,
}

impl DiffResult {
    fn new(query_id: i64, remote: Option<&Query>, local_path: &Path, status: DiffStatus) -> Self {
        Self {
            query_id,
            query_name: remote.map(|q| q.name.clone()).unwrap_or_default(),
            status,
            error_message: None,
            local_path: local_path.to_path_buf(),
            differences: None,
        }
    }

    /// A result recording that the comparison could not be made.
    pub fn error(
        query_id: i64,
        remote: Option<&Query>,
        local_path: &Path,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Self::new(query_id, remote, local_path, DiffStatus::Error)
        }
    }
}

/// Aggregate of a bulk comparison. Counters follow the recorded results.
#[derive(Debug, Clone, Serialize)]
pub struct DiffSummary {
    profile: String,
    sql_directory: PathBuf,
    matches: usize,
    differences: usize,
    missing_in_redash: usize,
    results: Vec<DiffResult>,
}

impl DiffSummary {
    pub fn new(profile: impl Into<String>, sql_directory: impl Into<PathBuf>) -> Self {
        Self {
            profile: profile.into(),
            sql_directory: sql_directory.into(),
            matches: 0,
            differences: 0,
            missing_in_redash: 0,
            results: Vec::new(),
        }
    }

    /// Append a result and bump the counter for its status. `ERROR`
    /// results are kept but not counted.
    pub fn record(&mut self, result: DiffResult) {
        match result.status {
            DiffStatus::Match => {
                tracing::debug!(id = result.query_id, name = %result.query_name, "no differences found");
                self.matches += 1;
            }
            DiffStatus::Different => {
                tracing::info!(id = result.query_id, name = %result.query_name, "differences found");
                self.differences += 1;
            }
            DiffStatus::MissingInRedash => {
                tracing::warn!(
                    id = result.query_id,
                    file = %result.local_path.display(),
                    "local query does not exist in Redash"
                );
                self.missing_in_redash += 1;
            }
            DiffStatus::Error => {}
        }
        self.results.push(result);
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn sql_directory(&self) -> &Path {
        &self.sql_directory
    }

    pub fn matches(&self) -> usize {
        self.matches
    }

    pub fn differences(&self) -> usize {
        self.differences
    }

    pub fn missing_in_redash(&self) -> usize {
        self.missing_in_redash
    }

    pub fn errors(&self) -> usize {
        self.results.len() - self.matches - self.differences - self.missing_in_redash
    }

    pub fn results(&self) -> &[DiffResult] {
        &self.results
    }
}

impl std::fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} matching, {} different, {} missing in Redash, {} errors",
            self.matches,
            self.differences,
            self.missing_in_redash,
            self.errors()
        )
    }
}

/// Compare one local SQL file against the server copy of the query.
///
/// `remote` is `None` when the server has no query with this ID. The local
/// file must exist; whether that is fatal is up to the caller.
pub fn compare(query_id: i64, remote: Option<&Query>, local_path: &Path) -> Result<DiffResult> {
    if !local_path.is_file() {
        return Err(RedripError::LocalFileMissing {
            path: local_path.to_path_buf(),
        });
    }

    let content = std::fs::read(local_path).map_err(|source| RedripError::LocalFileRead {
        path: local_path.to_path_buf(),
        source,
    })?;
    let content = String::from_utf8_lossy(&content);
    let local_sql = content.trim();

    let Some(query) = remote else {
        return Ok(DiffResult::new(
            query_id,
            None,
            local_path,
            DiffStatus::MissingInRedash,
        ));
    };

    let remote_sql = query.text.trim();
    if local_sql == remote_sql {
        return Ok(DiffResult::new(query_id, remote, local_path, DiffStatus::Match));
    }

    Ok(DiffResult {
        differences: Some(text::pretty_diff(local_sql, remote_sql)),
        ..DiffResult::new(query_id, remote, local_path, DiffStatus::Different)
    })
}

/// Compare every `<id>.sql` file directly inside `dir` with `queries`.
///
/// Files with other names are skipped. Failures on individual files become
/// `ERROR` results; only an unreadable directory aborts.
pub fn compare_all(dir: &Path, queries: &[Query], profile: &str) -> Result<DiffSummary> {
    let by_id: HashMap<i64, &Query> = queries.iter().map(|q| (q.id, q)).collect();
    let mut summary = DiffSummary::new(profile, dir);

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| RedripError::Io(e.into()))?;
        if entry.file_type().is_dir() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        let Some(id) = parse_sql_file_name(&file_name) else {
            tracing::debug!(file = %file_name, "skipping file without a numeric query ID");
            continue;
        };

        let remote = by_id.get(&id).copied();
        let local_path = dir.join(entry.file_name());
        let result = compare(id, remote, &local_path).unwrap_or_else(|e| {
            tracing::error!(id, error = %e, "error comparing query");
            DiffResult::error(id, remote, &local_path, e.to_string())
        });
        summary.record(result);
    }

    tracing::info!(profile, dir = %dir.display(), "{}", summary);
    Ok(summary)
}
