use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error("http request failed: {0}")]
	Http(#[from] reqwest::Error),
	#[error("websocket failure: {0}")]
	Ws(#[from] tokio_tungstenite::tungstenite::Error),

	#[error(transparent)]
	Decode(#[from] pack_proto::DecodeError),
	#[error("protocol violation: {0}")]
	Protocol(#[from] pack_proto::StateError),
	#[error("binary frame received on event stream")]
	BinaryFrame,

	#[error("file I/O error: {source}; path: '{}'", path.display())]
	FileIO {
		path: Box<Path>,
		#[source]
		source: std::io::Error,
	},

	#[error("submission cancelled")]
	Cancelled,
}
