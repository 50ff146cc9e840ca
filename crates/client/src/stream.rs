use futures::{Stream, StreamExt};
use pack_proto::{decode_event, Event, Job};
use tokio_tungstenite::{connect_async, tungstenite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{url::ws_url, Error, RequestConfig};

/// How an event stream ended.
#[derive(Debug)]
pub struct StreamEnd {
	/// Final state machine view of the job.
	pub job: Job,
	/// Whether a terminal event was observed. `false` means the stream was
	/// cut short (remote close or cancellation) and the job ends `Failed`.
	pub completed: bool,
}

#[derive(Debug, Default)]
pub struct ListenOptions {
	/// Cancelling drops the connection; nothing is delivered afterwards.
	pub cancel: Option<CancellationToken>,
}

/// Opens the event stream for `token` and delivers each decoded event to
/// `handler`, in arrival order, until a terminal event arrives or the
/// connection closes. There is no automatic reconnect; a stream that ends
/// early comes back with `completed: false` and it is the caller's call
/// whether to start over.
///
/// A frame that fails to decode aborts the stream with [`Error::Decode`].
/// The protocol has no resync point, so skipping frames would only hand
/// the caller a silently incomplete log.
pub async fn listen<F>(
	config: &RequestConfig,
	token: &str,
	options: ListenOptions,
	handler: F,
) -> Result<StreamEnd, Error>
where
	F: FnMut(Event),
{
	let url = ws_url(&config.base_url, &format!("ws?token={token}"));
	debug!(%url, "opening event stream");

	let (ws, _) = connect_async(url.as_str()).await?;

	drive(ws, options.cancel.unwrap_or_default(), handler).await
}

async fn drive<S, F>(
	mut frames: S,
	cancel: CancellationToken,
	mut handler: F,
) -> Result<StreamEnd, Error>
where
	S: Stream<Item = Result<tungstenite::Message, tungstenite::Error>> + Unpin,
	F: FnMut(Event),
{
	let mut job = Job::new();

	loop {
		let maybe_frame = tokio::select! {
			biased;
			() = cancel.cancelled() => {
				debug!("event stream cancelled");
				break;
			}
			maybe_frame = frames.next() => maybe_frame,
		};

		let Some(frame) = maybe_frame else {
			// Remote went away without a close frame
			break;
		};

		match frame? {
			tungstenite::Message::Text(text) => {
				let event = decode_event(&text)?;
				job.apply(&event)?;

				let terminal = event.is_terminal();
				handler(event);

				if terminal {
					return Ok(StreamEnd {
						job,
						completed: true,
					});
				}
			}
			tungstenite::Message::Binary(_) => return Err(Error::BinaryFrame),
			tungstenite::Message::Close(frame) => {
				debug!(?frame, "event stream closed by remote");
				break;
			}
			// Transport-level frames carry no events
			tungstenite::Message::Ping(_)
			| tungstenite::Message::Pong(_)
			| tungstenite::Message::Frame(_) => {}
		}
	}

	if !cancel.is_cancelled() {
		warn!("event stream ended before a terminal event");
	}

	job.close();

	Ok(StreamEnd {
		job,
		completed: false,
	})
}
