//! # bfl-rs
//!
//! Rust client for the [Black Forest Labs](https://docs.bfl.ml) FLUX image
//! generation API.
//!
//! Generation is a two-step exchange: submit a request and get back a task
//! id, then fetch the task until its status is terminal. The client does one
//! HTTP round-trip per call and keeps no state about submitted tasks, so how
//! often to poll is the caller's decision.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bfl_rs::{Client, FluxProPlusInputs, Status};
//! use std::time::Duration;
//!
//! # async fn example() -> bfl_rs::Result<()> {
//! // Reads BFL_API_KEY
//! let client = Client::from_env()?;
//!
//! let mut task = client
//!     .generate_pro_plus(&FluxProPlusInputs::new("a sunset over mountains").size(1024, 768))
//!     .await?;
//!
//! while !task.is_done() {
//!     tokio::time::sleep(Duration::from_secs(1)).await;
//!     task = client.get_result(&task).await?;
//! }
//!
//! match task.status {
//!     Some(Status::Ready) => println!("{}", task.sample().unwrap_or_default()),
//!     other => eprintln!("generation ended with {:?}", other),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Only two things are errors: a client that cannot be configured, and a
//! request that does not come back with a 2xx response. A task that ends
//! moderated or failed is a normal [`Task`] whose [`Status`] says so.
//!
//! ## Features
//!
//! - `blocking`: a synchronous [`blocking::Client`] with the same API.

#[cfg(feature = "blocking")]
pub mod blocking;
pub mod client;
pub mod error;
pub mod inputs;
pub mod types;

pub use client::{Client, ClientBuilder, API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{BflError, Result};
pub use inputs::{FluxDevInputs, FluxProInputs, FluxProPlusInputs, Model, ModelInputs};
pub use types::{AsTaskId, Status, Task, TaskResult};
