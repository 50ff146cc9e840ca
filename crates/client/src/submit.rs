use std::{
	path::Path,
	pin::Pin,
	sync::Arc,
	task::{Context, Poll},
};

use futures::Stream;
use pin_project_lite::pin_project;
use reqwest::{header::HeaderMap, multipart};
use serde::Deserialize;
use tokio::fs;
use tokio_util::{io::ReaderStream, sync::CancellationToken};
use tracing::debug;

use super::{url::compose, Error, RequestConfig};

/// Callback invoked as upload bytes are pulled off the request body, with
/// `(bytes_sent, bytes_total)`.
pub type ProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Response to a pack submission. The token keys the job's event stream.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
	pub token: String,
}

#[derive(Default)]
pub struct SubmitOptions {
	pub headers: HeaderMap,
	pub cancel: Option<CancellationToken>,
	pub on_progress: Option<ProgressFn>,
}

/// Uploads the pack at `path` to `POST {base}/compress` as a multipart
/// form, starting one compression job server-side.
///
/// Transport failures and non-2xx statuses surface as [`Error::Http`]; no
/// retry happens here. Cancelling only aborts the upload, the server keeps
/// whatever it already received.
pub async fn submit(
	config: &RequestConfig,
	path: impl AsRef<Path>,
	options: SubmitOptions,
) -> Result<SubmitResponse, Error> {
	let path = path.as_ref();

	let file = fs::File::open(path).await.map_err(|source| Error::FileIO {
		path: path.into(),
		source,
	})?;
	let total = file
		.metadata()
		.await
		.map_err(|source| Error::FileIO {
			path: path.into(),
			source,
		})?
		.len();

	let file_name = path
		.file_name()
		.map_or_else(|| "pack".to_string(), |name| name.to_string_lossy().into_owned());

	let frames = ReaderStream::new(file);
	let body = match options.on_progress {
		Some(on_progress) => reqwest::Body::wrap_stream(ProgressBody {
			inner: frames,
			sent: 0,
			total,
			on_progress,
		}),
		None => reqwest::Body::wrap_stream(frames),
	};

	let form = multipart::Form::new().part(
		"file",
		multipart::Part::stream_with_length(body, total).file_name(file_name),
	);

	let url = compose(&config.base_url, "compress");
	debug!(%url, size = total, "submitting pack");

	let request = config
		.client
		.post(&url)
		.headers(options.headers)
		.multipart(form);

	let send = async move {
		request
			.send()
			.await?
			.error_for_status()?
			.json::<SubmitResponse>()
			.await
			.map_err(Error::Http)
	};

	match options.cancel {
		Some(cancel) => tokio::select! {
			biased;
			() = cancel.cancelled() => Err(Error::Cancelled),
			response = send => response,
		},
		None => send.await,
	}
}

pin_project! {
	/// Counts bytes as the request body is pulled, reporting each chunk to
	/// the caller's progress callback.
	struct ProgressBody<S> {
		#[pin]
		inner: S,
		sent: u64,
		total: u64,
		on_progress: ProgressFn,
	}
}

impl<S, B, E> Stream for ProgressBody<S>
where
	S: Stream<Item = Result<B, E>>,
	B: AsRef<[u8]>,
{
	type Item = Result<B, E>;

	fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		let this = self.project();

		let polled = this.inner.poll_next(cx);
		if let Poll::Ready(Some(Ok(chunk))) = &polled {
			*this.sent += chunk.as_ref().len() as u64;
			(this.on_progress)(*this.sent, *this.total);
		}

		polled
	}
}
