use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::BflError;

/// Status of a generation task as reported by `/v1/get_result`.
///
/// Wire values are the service's own strings (`"Task not found"`,
/// `"Request Moderated"`, ...). Unknown strings are rejected rather than
/// mapped to a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Status {
    NotFound,
    Pending,
    RequestModerated,
    ContentModerated,
    Ready,
    Error,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::NotFound,
        Status::Pending,
        Status::RequestModerated,
        Status::ContentModerated,
        Status::Ready,
        Status::Error,
    ];

    /// The string the service uses for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::NotFound => "Task not found",
            Status::Pending => "Pending",
            Status::RequestModerated => "Request Moderated",
            Status::ContentModerated => "Content Moderated",
            Status::Ready => "Ready",
            Status::Error => "Error",
        }
    }

    /// Whether no further change is expected after this status.
    ///
    /// `NotFound` is not terminal: the service can report it for a task that
    /// was submitted a moment ago. Callers polling an id that may be bogus
    /// should bound their own loop.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Status::Ready | Status::Error | Status::RequestModerated | Status::ContentModerated
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = BflError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Task not found" | "NotFound" => Ok(Status::NotFound),
            "Pending" => Ok(Status::Pending),
            "Request Moderated" | "RequestModerated" => Ok(Status::RequestModerated),
            "Content Moderated" | "ContentModerated" => Ok(Status::ContentModerated),
            "Ready" => Ok(Status::Ready),
            "Error" => Ok(Status::Error),
            other => Err(BflError::InvalidResponse(format!(
                "unrecognized task status '{}'",
                other
            ))),
        }
    }
}

impl TryFrom<String> for Status {
    type Error = BflError;

    fn try_from(value: String) -> Result<Self, BflError> {
        value.parse()
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Output of a finished generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    /// URL of the generated image.
    #[serde(deserialize_with = "deserialize_sample_url")]
    pub sample: String,
    /// The prompt the image was generated from.
    pub prompt: String,
}

impl TaskResult {
    /// The sample location as a parsed URL.
    pub fn sample_url(&self) -> crate::Result<reqwest::Url> {
        reqwest::Url::parse(&self.sample)
            .map_err(|e| BflError::InvalidResponse(format!("Bad sample URL: {}", e)))
    }
}

fn deserialize_sample_url<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let url = reqwest::Url::parse(&raw).map_err(serde::de::Error::custom)?;
    match url.scheme() {
        "http" | "https" => Ok(raw),
        scheme => Err(serde::de::Error::custom(format!(
            "sample URL must be http(s), got scheme '{}'",
            scheme
        ))),
    }
}

/// Handle to a submitted generation.
///
/// `generate` returns a task carrying only its id. Each `get_result` call
/// returns a fresh snapshot; replace the old value rather than patching it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TaskResult>,
}

impl Task {
    /// A bare handle for an id obtained elsewhere.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: None,
            result: None,
        }
    }

    /// True once the task reached a terminal status.
    pub fn is_done(&self) -> bool {
        self.status.is_some_and(Status::is_terminal)
    }

    /// True if the task finished with an image.
    pub fn is_ready(&self) -> bool {
        self.status == Some(Status::Ready)
    }

    /// Sample URL, if the result is present.
    pub fn sample(&self) -> Option<&str> {
        self.result.as_ref().map(|r| r.sample.as_str())
    }
}

/// Anything that identifies a task: a [`Task`] or its raw id.
pub trait AsTaskId {
    fn task_id(&self) -> &str;
}

impl AsTaskId for Task {
    fn task_id(&self) -> &str {
        &self.id
    }
}

impl AsTaskId for str {
    fn task_id(&self) -> &str {
        self
    }
}

impl AsTaskId for String {
    fn task_id(&self) -> &str {
        self
    }
}
