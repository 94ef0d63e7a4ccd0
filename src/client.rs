use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT as USER_AGENT_HEADER};
use reqwest::StatusCode;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{BflError, Result};
use crate::inputs::{FluxDevInputs, FluxProInputs, FluxProPlusInputs, Model, ModelInputs};
use crate::types::{AsTaskId, Task};

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.bfl.ml";
/// Environment variable read when no API key is passed explicitly.
pub const API_KEY_ENV: &str = "BFL_API_KEY";
/// Per-request timeout unless overridden with [`ClientBuilder::timeout`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
/// Client identifier sent as `User-Agent`.
pub const USER_AGENT: &str = concat!("bfl-rs/", env!("CARGO_PKG_VERSION"));

const API_KEY_HEADER: &str = "x-key";
const GET_RESULT_PATH: &str = "/v1/get_result";

fn normalize(endpoint: String) -> String {
    endpoint.trim_end_matches('/').to_string()
}

/// Pick the explicit key, else the one `lookup` finds under [`API_KEY_ENV`].
/// Empty strings count as missing.
pub(crate) fn resolve_api_key<F>(explicit: Option<String>, lookup: F) -> Result<String>
where
    F: FnOnce(&str) -> Option<String>,
{
    explicit
        .filter(|k| !k.is_empty())
        .or_else(|| lookup(API_KEY_ENV).filter(|k| !k.is_empty()))
        .ok_or_else(|| {
            BflError::Configuration(format!(
                "API key is required. Set {} or pass it to the client builder.",
                API_KEY_ENV
            ))
        })
}

/// Turn a response into a [`Task`], or an error for non-2xx statuses.
pub(crate) fn decode_task(status: StatusCode, body: &str) -> Result<Task> {
    if !status.is_success() {
        warn!(status = status.as_u16(), "BFL API request failed");
        return Err(BflError::Http {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }

    let task: Task = serde_json::from_str(body)
        .map_err(|e| BflError::InvalidResponse(format!("Failed to parse task: {}", e)))?;
    debug!(task_id = %task.id, status = ?task.status, "Parsed task");
    Ok(task)
}

/// Settings shared by the async and blocking clients.
#[derive(Clone)]
pub(crate) struct ClientConfig {
    pub(crate) base_url: String,
    pub(crate) timeout: Duration,
    headers: HeaderMap,
}

impl ClientConfig {
    /// `x-key` and `User-Agent`, attached to every request.
    pub(crate) fn headers(&self) -> HeaderMap {
        self.headers.clone()
    }

    pub(crate) fn submit_url(&self, model: Model) -> String {
        format!("{}{}", self.base_url, model.path())
    }

    pub(crate) fn result_url(&self, task_id: &str) -> Result<reqwest::Url> {
        reqwest::Url::parse_with_params(
            &format!("{}{}", self.base_url, GET_RESULT_PATH),
            &[("id", task_id)],
        )
        .map_err(|e| BflError::Configuration(format!("Bad base URL: {}", e)))
    }

    pub(crate) fn network_error(&self, context: &str, source: reqwest::Error) -> BflError {
        BflError::Network {
            context: format!("{} at {}", context, self.base_url),
            source,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Client`] (and the blocking client, with the `blocking`
/// feature).
///
/// # Example
/// ```no_run
/// use bfl_rs::Client;
/// use std::time::Duration;
///
/// # fn example() -> bfl_rs::Result<()> {
/// let client = Client::builder()
///     .api_key("my-key")
///     .base_url("https://api.bfl.ml")
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ClientBuilder {
    api_key: Option<String>,
    base_url: String,
    timeout: Duration,
    user_agent: String,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// API key. Falls back to `BFL_API_KEY` when not set.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub(crate) fn maybe_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key;
        self
    }

    /// API endpoint, e.g. a regional host or a mock server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Timeout applied to each request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the `User-Agent` client identifier.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub(crate) fn resolve_with<F>(self, lookup: F) -> Result<ClientConfig>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let api_key = resolve_api_key(self.api_key, lookup)?;
        let base_url = normalize(self.base_url);
        reqwest::Url::parse(&base_url)
            .map_err(|e| BflError::Configuration(format!("Bad base URL '{}': {}", base_url, e)))?;

        let mut key = HeaderValue::from_str(&api_key).map_err(|_| {
            BflError::Configuration("API key contains characters not valid in a header".into())
        })?;
        key.set_sensitive(true);
        let agent = HeaderValue::from_str(&self.user_agent).map_err(|_| {
            BflError::Configuration(format!("Invalid User-Agent '{}'", self.user_agent))
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);
        headers.insert(USER_AGENT_HEADER, agent);

        Ok(ClientConfig {
            base_url,
            timeout: self.timeout,
            headers,
        })
    }

    pub(crate) fn resolve(self) -> Result<ClientConfig> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Build an async client.
    pub fn build(self) -> Result<Client> {
        Ok(Client {
            http: reqwest::Client::new(),
            config: self.resolve()?,
        })
    }

    /// Build a blocking client.
    #[cfg(feature = "blocking")]
    pub fn build_blocking(self) -> Result<crate::blocking::Client> {
        crate::blocking::Client::from_config(self.resolve()?)
    }
}

/// Async client for the Black Forest Labs API.
///
/// Submits generations and fetches task snapshots. The client never polls,
/// retries or caches; poll cadence is up to the caller.
///
/// `Client` is cheap to clone and can be shared across tasks and threads;
/// concurrent calls are as safe as the underlying `reqwest::Client`.
///
/// # Example
/// ```no_run
/// use bfl_rs::{Client, FluxProPlusInputs};
///
/// # async fn example() -> bfl_rs::Result<()> {
/// let client = Client::from_env()?;
/// let task = client
///     .generate_pro_plus(&FluxProPlusInputs::new("a red fox in snow"))
///     .await?;
/// let snapshot = client.get_result(&task).await?;
/// println!("{} is {:?}", snapshot.id, snapshot.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    config: ClientConfig,
}

impl Client {
    /// Create a client with an explicit key, or `None` to read `BFL_API_KEY`.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        ClientBuilder::new().maybe_api_key(api_key).build()
    }

    /// Create a client from `BFL_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Self::new(None)
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Use a custom `reqwest::Client` (for connection pooling, proxies, TLS).
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Returns the per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    // ── Submission ──────────────────────────────────────────────────

    /// Submit a generation to `model`. Returns a task holding only its id.
    ///
    /// `params` is sent as the JSON body without local validation.
    pub async fn generate<P>(&self, model: Model, params: &P) -> Result<Task>
    where
        P: Serialize + ?Sized,
    {
        let body = serde_json::to_value(params)?;
        debug!(model = %model, "Submitting generation");

        let resp = self
            .http
            .post(self.config.submit_url(model))
            .headers(self.config.headers())
            .timeout(self.config.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.config.network_error("Failed to submit generation", e))?;

        self.read_task(resp).await
    }

    /// Submit typed inputs to the model they belong to.
    pub async fn generate_with<P: ModelInputs>(&self, inputs: &P) -> Result<Task> {
        self.generate(P::MODEL, inputs).await
    }

    /// Submit to FLUX 1.1 \[pro\].
    pub async fn generate_pro_plus(&self, inputs: &FluxProPlusInputs) -> Result<Task> {
        self.generate_with(inputs).await
    }

    /// Submit to FLUX.1 \[pro\].
    pub async fn generate_pro(&self, inputs: &FluxProInputs) -> Result<Task> {
        self.generate_with(inputs).await
    }

    /// Submit to FLUX.1 \[dev\].
    pub async fn generate_dev(&self, inputs: &FluxDevInputs) -> Result<Task> {
        self.generate_with(inputs).await
    }

    // ── Results ─────────────────────────────────────────────────────

    /// Fetch the current snapshot of a task, by handle or raw id.
    ///
    /// An unknown id is not an error: the service answers with status
    /// [`Status::NotFound`](crate::Status::NotFound).
    pub async fn get_result<T>(&self, task: &T) -> Result<Task>
    where
        T: AsTaskId + ?Sized,
    {
        let task_id = task.task_id();
        debug!(task_id, "Fetching task result");

        let resp = self
            .http
            .get(self.config.result_url(task_id)?)
            .headers(self.config.headers())
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| self.config.network_error("Failed to fetch task result", e))?;

        self.read_task(resp).await
    }

    async fn read_task(&self, resp: reqwest::Response) -> Result<Task> {
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| self.config.network_error("Failed to read response body", e))?;
        decode_task(status, &body)
    }
}
