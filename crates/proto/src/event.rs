use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One message in a compression job's event stream.
///
/// The wire form is a JSON object tagged by its `type` field, e.g.
/// `{"type":"result","url":"https://cdn/x.zip"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
	/// Manifest of the job's input. At most one per stream, first if present.
	Info {
		size: u64,
		version: u32,
		items_count: u64,
	},
	/// Progress notification about one item of work.
	Log { data: LogEntry },
	/// Job-level failure, as reported by older servers. Terminal.
	Error { error: String },
	/// Location of the produced artifact. Terminal.
	Result { url: String },
}

/// Payload of a [`Event::Log`] entry, tagged by its `event` field on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum LogEntry {
	/// Transfer progress for one item, `percent` in `0..=100`.
	Uploading {
		#[serde(default, skip_serializing_if = "Option::is_none")]
		id: Option<String>,
		percent: u8,
	},
	/// One item finished, with its name and size before and after.
	Compressed {
		#[serde(default, skip_serializing_if = "Option::is_none")]
		id: Option<String>,
		#[serde(rename = "type")]
		kind: String,
		old_name: String,
		new_name: String,
		old_size: u64,
		new_size: u64,
	},
	/// One item failed. The job carries on with the remaining items.
	Error {
		#[serde(default, skip_serializing_if = "Option::is_none")]
		id: Option<String>,
		#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
		kind: Option<String>,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		name: Option<String>,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		size: Option<u64>,
		error: String,
	},
}

impl Event {
	/// Whether no further events are expected after this one.
	#[must_use]
	pub const fn is_terminal(&self) -> bool {
		matches!(self, Self::Error { .. } | Self::Result { .. })
	}
}

const FRAME_SNIPPET_LEN: usize = 256;

/// A frame that does not decode to any known event shape.
///
/// Carries a bounded snippet of the offending frame so logs stay readable
/// when the server sends something large.
#[derive(Debug, Error)]
#[error("undecodable frame: {source}; frame: '{frame}'")]
pub struct DecodeError {
	pub frame: String,
	#[source]
	pub source: serde_json::Error,
}

/// Decodes a single text frame from the event stream.
///
/// Unknown `type`/`event` tags are errors; unknown extra fields are
/// tolerated, as servers may add them.
pub fn decode_event(frame: &str) -> Result<Event, DecodeError> {
	serde_json::from_str(frame).map_err(|source| DecodeError {
		frame: frame.chars().take(FRAME_SNIPPET_LEN).collect(),
		source,
	})
}
