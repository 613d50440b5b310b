use std::path::PathBuf;

/// Central error type for redrip.
#[derive(Debug, thiserror::Error)]
pub enum RedripError {
    #[error("config file error at {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not determine home directory")]
    HomeDirUnavailable,

    #[error("required configuration values not found for profile '{profile}': {fields}")]
    MissingRequiredFields { profile: String, fields: String },

    #[error("failed to execute request: {0}")]
    Network(String),

    #[error("received non-200 response: {status} (content: {preview})")]
    UnexpectedStatus { status: u16, preview: String },

    #[error("received HTML instead of JSON; this may indicate an authentication problem or an incorrect URL")]
    HtmlResponse { preview: String },

    #[error("query {id} not found")]
    NotFound { id: i64 },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("local SQL file does not exist: {path}")]
    LocalFileMissing { path: PathBuf },

    #[error("failed to read local file {path}: {source}")]
    LocalFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid query ID: {input}")]
    InvalidQueryId { input: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RedripError>;

const CONNECTION_HINTS: &[&str] = &[
    "Check that the API key is correct.",
    "Check that redash_url is correct (no trailing slash, and it includes the /api path).",
    "Check that the Redash host is reachable from this machine.",
    "Check the contents of the config file (~/.redrip/config.conf).",
];

impl RedripError {
    /// True for a non-success status or an HTML body where JSON was expected.
    pub fn is_unexpected_response(&self) -> bool {
        matches!(
            self,
            RedripError::UnexpectedStatus { .. } | RedripError::HtmlResponse { .. }
        )
    }

    /// Likely causes to show the user, empty unless the server answered with
    /// something other than the API response.
    pub fn connection_hints(&self) -> &'static [&'static str] {
        if self.is_unexpected_response() {
            CONNECTION_HINTS
        } else {
            &[]
        }
    }
}

/// Truncate a response body for error messages and logs.
pub fn preview(body: &str, limit: usize) -> String {
    match body.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
