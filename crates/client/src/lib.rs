//! Client for the remote pack compression service.
//!
//! One compression job goes through two calls: [`submit`] uploads the pack
//! over HTTP and yields a session token, then [`listen`] opens a WebSocket
//! keyed by that token and delivers the job's typed event stream
//! ([`pack_proto::Event`]) to a handler, in arrival order, until a
//! terminal event arrives or the connection closes.
//!
//! ```no_run
//! use pack_client::{listen, submit, ListenOptions, RequestConfig, SubmitOptions};
//!
//! # async fn example() -> Result<(), pack_client::Error> {
//! let config = RequestConfig::new("http://localhost:8000");
//!
//! let response = submit(&config, "pack.siq", SubmitOptions::default()).await?;
//!
//! let end = listen(&config, &response.token, ListenOptions::default(), |event| {
//!     println!("{event:?}");
//! })
//! .await?;
//!
//! println!("job ended in {:?}", end.job.state());
//! # Ok(())
//! # }
//! ```

#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	clippy::dbg_macro,
	deprecated
)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

mod error;
mod stream;
mod submit;
pub mod url;

pub use pack_proto as proto;

pub use error::Error;
pub use stream::{listen, ListenOptions, StreamEnd};
pub use submit::{submit, ProgressFn, SubmitOptions, SubmitResponse};

/// Configuration handed to every operation against the service.
///
/// The [`reqwest::Client`] holds the connection pool, so share one
/// `RequestConfig` across calls instead of rebuilding it per request.
#[derive(Debug, Clone)]
pub struct RequestConfig {
	pub client: reqwest::Client,
	pub base_url: String,
}

impl RequestConfig {
	#[must_use]
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			client: reqwest::Client::new(),
			base_url: base_url.into(),
		}
	}
}
