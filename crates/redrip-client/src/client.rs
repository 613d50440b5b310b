use redrip_core::error::{preview, RedripError, Result};
use redrip_core::models::query::{Query, QueryPage};
use redrip_core::profile::{self, ResolvedProfile};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

/// Number of queries requested per page when listing.
pub const PAGE_SIZE: u32 = 100;

const PREVIEW_LIMIT: usize = 200;

/// Anything that can hand out Redash queries.
pub trait QuerySource {
    /// Every query on the server, following pagination.
    fn list_queries(&self) -> Result<Vec<Query>>;

    /// A single query by ID.
    fn get_query(&self, id: i64) -> Result<Query>;
}

/// Blocking HTTP client for the Redash API of one profile.
pub struct RedashClient {
    http: Client,
    base_url: String,
    api_key: String,
    profile: String,
}

impl RedashClient {
    /// Build a client for a resolved profile, failing if the URL or key is
    /// missing.
    pub fn from_profile(profile: &ResolvedProfile) -> Result<Self> {
        profile::validate(profile)?;
        let client = Self::new(&profile.config.redash_url, &profile.config.api_key)?
            .with_profile_name(&profile.name);
        tracing::info!(
            profile = %profile.name,
            url = %client.base_url,
            "redash client created"
        );
        Ok(client)
    }

    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| RedripError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            profile: String::new(),
        })
    }

    /// Swap in a preconfigured HTTP client (proxy, TLS or timeout settings).
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    fn with_profile_name(mut self, name: &str) -> Self {
        self.profile = name.to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    fn get(&self, url: &str) -> Result<Response> {
        tracing::debug!(url, "GET");
        self.http
            .get(url)
            .header("Authorization", format!("Key {}", self.api_key))
            .send()
            .map_err(|e| {
                tracing::error!(error = %e, "failed to execute request");
                RedripError::Network(e.to_string())
            })
    }

    fn fetch_page(&self, page: u32) -> Result<QueryPage> {
        let url = format!(
            "{}/queries?page={}&page_size={}",
            self.base_url, page, PAGE_SIZE
        );
        let (status, body) = read_response(self.get(&url)?)?;
        check_status(status, &body)?;
        decode_body(&body)
    }
}

impl QuerySource for RedashClient {
    fn list_queries(&self) -> Result<Vec<Query>> {
        let mut all = Vec::new();
        let mut page = 1;

        loop {
            tracing::debug!(page, page_size = PAGE_SIZE, "fetching page of queries");
            let response = self.fetch_page(page)?;
            let fetched = response.results.len();
            all.extend(response.results);
            tracing::debug!(count = fetched, total = response.count, "fetched queries");

            if fetched == 0 || all.len() >= response.count {
                break;
            }
            page += 1;
        }

        tracing::info!(count = all.len(), "retrieved all queries");
        Ok(all)
    }

    fn get_query(&self, id: i64) -> Result<Query> {
        let url = format!("{}/queries/{}", self.base_url, id);
        let (status, body) = read_response(self.get(&url)?)?;
        if status == StatusCode::NOT_FOUND {
            tracing::error!(id, "query not found");
            return Err(RedripError::NotFound { id });
        }
        check_status(status, &body)?;
        let query: Query = decode_body(&body)?;
        tracing::info!(id = query.id, name = %query.name, "retrieved query");
        Ok(query)
    }
}

fn read_response(response: Response) -> Result<(StatusCode, String)> {
    let status = response.status();
    let body = response.text().map_err(|e| {
        tracing::error!(error = %e, "failed to read response body");
        RedripError::Network(e.to_string())
    })?;
    Ok((status, body))
}

/// Turn a non-success status into an error carrying a body preview.
pub fn check_status(status: StatusCode, body: &str) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    let preview = preview(body, PREVIEW_LIMIT);
    tracing::error!(status = status.as_u16(), response_preview = %preview, "received non-200 response");
    Err(RedripError::UnexpectedStatus {
        status: status.as_u16(),
        preview,
    })
}

/// Decode a JSON body. A body that looks like HTML is reported separately,
/// since that nearly always means a login page or the wrong URL.
pub fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        if body.trim_start().starts_with('<') {
            let preview = preview(body, 100);
            tracing::error!(response_preview = %preview, "received HTML instead of JSON");
            RedripError::HtmlResponse { preview }
        } else {
            tracing::error!(error = %e, "failed to decode response");
            RedripError::Decode(e.to_string())
        }
    })
}
