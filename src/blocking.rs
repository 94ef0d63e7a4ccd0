//! Synchronous client, enabled with the `blocking` feature.
//!
//! Each call blocks the current thread until the round-trip completes or
//! fails. Do not use it from inside an async runtime.

use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::client::{decode_task, ClientBuilder, ClientConfig};
use crate::error::{BflError, Result};
use crate::inputs::{FluxDevInputs, FluxProInputs, FluxProPlusInputs, Model, ModelInputs};
use crate::types::{AsTaskId, Task};

/// Blocking counterpart of [`crate::Client`].
///
/// # Example
/// ```no_run
/// use bfl_rs::blocking::Client;
/// use bfl_rs::FluxDevInputs;
///
/// # fn example() -> bfl_rs::Result<()> {
/// let client = Client::from_env()?;
/// let task = client.generate_dev(&FluxDevInputs::new("a paper crane").steps(28))?;
/// let snapshot = client.get_result(&task.id)?;
/// println!("done: {}", snapshot.is_done());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::blocking::Client,
    config: ClientConfig,
}

impl Client {
    pub(crate) fn from_config(config: ClientConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| BflError::Configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    /// Create a client with an explicit key, or `None` to read `BFL_API_KEY`.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        ClientBuilder::new().maybe_api_key(api_key).build_blocking()
    }

    /// Create a client from `BFL_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Self::new(None)
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Use a custom `reqwest::blocking::Client`.
    pub fn with_http_client(mut self, client: reqwest::blocking::Client) -> Self {
        self.http = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Submit a generation to `model`. Returns a task holding only its id.
    pub fn generate<P>(&self, model: Model, params: &P) -> Result<Task>
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
            .map_err(|e| self.config.network_error("Failed to submit generation", e))?;

        self.read_task(resp)
    }

    pub fn generate_with<P: ModelInputs>(&self, inputs: &P) -> Result<Task> {
        self.generate(P::MODEL, inputs)
    }

    pub fn generate_pro_plus(&self, inputs: &FluxProPlusInputs) -> Result<Task> {
        self.generate_with(inputs)
    }

    pub fn generate_pro(&self, inputs: &FluxProInputs) -> Result<Task> {
        self.generate_with(inputs)
    }

    pub fn generate_dev(&self, inputs: &FluxDevInputs) -> Result<Task> {
        self.generate_with(inputs)
    }

    /// Fetch the current snapshot of a task, by handle or raw id.
    pub fn get_result<T>(&self, task: &T) -> Result<Task>
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
            .map_err(|e| self.config.network_error("Failed to fetch task result", e))?;

        self.read_task(resp)
    }

    fn read_task(&self, resp: reqwest::blocking::Response) -> Result<Task> {
        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| self.config.network_error("Failed to read response body", e))?;
        decode_task(status, &body)
    }
}
