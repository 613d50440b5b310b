use serde::{Deserialize, Serialize};

/// A saved query on the Redash server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub id: i64,
    pub name: String,
    /// SQL text. Redash calls this field `query`.
    #[serde(rename = "query", default)]
    pub text: String,
}

impl Query {
    /// File name used for this query in a local SQL directory.
    pub fn file_name(&self) -> String {
        sql_file_name(self.id)
    }
}

/// `<id>.sql`
pub fn sql_file_name(id: i64) -> String {
    format!("{}.sql", id)
}

/// Parse a local file name of the form `<integer>.sql` back into a query ID.
pub fn parse_sql_file_name(name: &str) -> Option<i64> {
    name.strip_suffix(".sql")?.parse().ok()
}

/// One page of `GET /queries`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryPage {
    #[serde(default)]
    pub results: Vec<Query>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub count: usize,
}
