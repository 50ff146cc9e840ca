use thiserror::Error;

use super::event::{Event, LogEntry};

/// Consumer-side view of where a job is in its lifecycle.
///
/// Transitions are one-directional; nothing moves a job backward, and
/// nothing follows a terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
	/// Token obtained, no event observed yet.
	Started,
	/// The `info` manifest arrived; item count and size are known.
	InfoKnown,
	/// At least one log entry observed.
	InProgress,
	/// Terminal: the artifact is ready at `url`.
	Succeeded { url: String },
	/// Terminal: the server reported a job-level error, or the stream
	/// closed before any terminal event (`error` is `None` then).
	Failed { error: Option<String> },
}

impl JobState {
	#[must_use]
	pub const fn is_terminal(&self) -> bool {
		matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
	}
}

/// The `info` manifest of a job's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackInfo {
	pub size: u64,
	pub version: u32,
	pub items_count: u64,
}

/// Running totals derived from log entries. These are computed by the
/// consumer, never transmitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
	pub items_compressed: u64,
	pub items_failed: u64,
	pub bytes_before: u64,
	pub bytes_after: u64,
	/// Latest transfer percentage seen in an `uploading` entry.
	pub upload_percent: u8,
}

#[derive(Debug, Error)]
pub enum StateError {
	#[error("event received after terminal state")]
	AfterTerminal,
	#[error("duplicate info event")]
	DuplicateInfo,
	#[error("info event arrived after progress began")]
	LateInfo,
}

/// Tracks one compression job across its event stream.
///
/// Feed every decoded event through [`Job::apply`] in arrival order, then
/// call [`Job::close`] when the stream ends.
#[derive(Debug, Clone)]
pub struct Job {
	state: JobState,
	info: Option<PackInfo>,
	progress: Progress,
}

impl Default for Job {
	fn default() -> Self {
		Self::new()
	}
}

impl Job {
	#[must_use]
	pub const fn new() -> Self {
		Self {
			state: JobState::Started,
			info: None,
			progress: Progress {
				items_compressed: 0,
				items_failed: 0,
				bytes_before: 0,
				bytes_after: 0,
				upload_percent: 0,
			},
		}
	}

	#[must_use]
	pub const fn state(&self) -> &JobState {
		&self.state
	}

	#[must_use]
	pub const fn info(&self) -> Option<&PackInfo> {
		self.info.as_ref()
	}

	#[must_use]
	pub const fn progress(&self) -> &Progress {
		&self.progress
	}

	/// Advances the state machine with the next event from the wire.
	///
	/// Per-item `error` log entries only bump the failure tally; the only
	/// events that terminate a job are `result` and the job-level `error`.
	pub fn apply(&mut self, event: &Event) -> Result<(), StateError> {
		if self.state.is_terminal() {
			return Err(StateError::AfterTerminal);
		}

		match event {
			Event::Info {
				size,
				version,
				items_count,
			} => {
				match self.state {
					JobState::Started => {}
					JobState::InfoKnown => return Err(StateError::DuplicateInfo),
					_ => return Err(StateError::LateInfo),
				}

				self.info = Some(PackInfo {
					size: *size,
					version: *version,
					items_count: *items_count,
				});
				self.state = JobState::InfoKnown;
			}

			Event::Log { data } => {
				match data {
					LogEntry::Uploading { percent, .. } => {
						// The wire range is 0..=100; cap whatever the server sent
						self.progress.upload_percent = (*percent).min(100);
					}
					LogEntry::Compressed {
						old_size, new_size, ..
					} => {
						self.progress.items_compressed += 1;
						self.progress.bytes_before += old_size;
						self.progress.bytes_after += new_size;
					}
					LogEntry::Error { .. } => {
						self.progress.items_failed += 1;
					}
				}

				self.state = JobState::InProgress;
			}

			Event::Result { url } => {
				self.state = JobState::Succeeded { url: url.clone() };
			}

			Event::Error { error } => {
				self.state = JobState::Failed {
					error: Some(error.clone()),
				};
			}
		}

		Ok(())
	}

	/// Resolves the job once the stream has ended, returning whether it
	/// completed. A close before any terminal event means the job failed.
	pub fn close(&mut self) -> bool {
		if self.state.is_terminal() {
			true
		} else {
			self.state = JobState::Failed { error: None };
			false
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn log(data: LogEntry) -> Event {
		Event::Log { data }
	}

	fn uploading(percent: u8) -> Event {
		log(LogEntry::Uploading { id: None, percent })
	}

	fn compressed(old_size: u64, new_size: u64) -> Event {
		log(LogEntry::Compressed {
			id: None,
			kind: "image".to_string(),
			old_name: "a.png".to_string(),
			new_name: "b.webp".to_string(),
			old_size,
			new_size,
		})
	}

	fn item_error() -> Event {
		log(LogEntry::Error {
			id: None,
			kind: None,
			name: Some("c.mp4".to_string()),
			size: None,
			error: "ffmpeg choked".to_string(),
		})
	}

	#[test]
	fn happy_path_reaches_succeeded() {
		let mut job = Job::new();

		job.apply(&Event::Info {
			size: 1000,
			version: 5,
			items_count: 2,
		})
		.expect("info first");
		assert_eq!(*job.state(), JobState::InfoKnown);
		assert_eq!(job.info().map(|info| info.items_count), Some(2));

		job.apply(&uploading(50)).expect("progress");
		job.apply(&uploading(100)).expect("progress");
		assert_eq!(*job.state(), JobState::InProgress);
		assert_eq!(job.progress().upload_percent, 100);

		job.apply(&Event::Result {
			url: "https://cdn/x.zip".to_string(),
		})
		.expect("terminal");
		assert_eq!(
			*job.state(),
			JobState::Succeeded {
				url: "https://cdn/x.zip".to_string()
			}
		);
		assert!(job.close());
	}

	#[test]
	fn info_is_optional() {
		let mut job = Job::new();

		job.apply(&compressed(2048, 512)).expect("log without info");
		assert_eq!(*job.state(), JobState::InProgress);
		assert!(job.info().is_none());
	}

	#[test]
	fn per_item_errors_are_not_terminal() {
		let mut job = Job::new();

		job.apply(&compressed(2048, 512)).expect("progress");
		job.apply(&item_error()).expect("item error is non-fatal");

		assert_eq!(*job.state(), JobState::InProgress);
		assert_eq!(job.progress().items_failed, 1);
		assert_eq!(job.progress().items_compressed, 1);

		// A later item may still succeed and the job may still complete.
		job.apply(&compressed(100, 50)).expect("progress");
		job.apply(&Event::Result {
			url: "https://cdn/x.zip".to_string(),
		})
		.expect("terminal");
		assert!(job.state().is_terminal());
	}

	#[test]
	fn job_level_error_fails_the_job() {
		let mut job = Job::new();

		job.apply(&Event::Error {
			error: "pack version 3 not supported".to_string(),
		})
		.expect("terminal");

		assert_eq!(
			*job.state(),
			JobState::Failed {
				error: Some("pack version 3 not supported".to_string())
			}
		);
	}

	#[test]
	fn nothing_follows_a_terminal_event() {
		let mut job = Job::new();

		job.apply(&Event::Result {
			url: "https://cdn/x.zip".to_string(),
		})
		.expect("terminal");

		assert!(matches!(
			job.apply(&uploading(10)),
			Err(StateError::AfterTerminal)
		));
		assert!(matches!(
			job.apply(&Event::Error {
				error: "too late".to_string()
			}),
			Err(StateError::AfterTerminal)
		));
	}

	#[test]
	fn info_must_come_first_and_only_once() {
		let info = Event::Info {
			size: 1000,
			version: 5,
			items_count: 2,
		};

		let mut job = Job::new();
		job.apply(&info).expect("info first");
		assert!(matches!(job.apply(&info), Err(StateError::DuplicateInfo)));

		let mut job = Job::new();
		job.apply(&uploading(10)).expect("progress");
		assert!(matches!(job.apply(&info), Err(StateError::LateInfo)));
	}

	#[test]
	fn close_without_terminal_event_fails_the_job() {
		let mut job = Job::new();
		job.apply(&compressed(2048, 512)).expect("progress");

		assert!(!job.close());
		assert_eq!(*job.state(), JobState::Failed { error: None });

		// Closing is idempotent once terminal.
		assert!(job.close());
	}

	#[test]
	fn upload_percent_is_capped_at_100() {
		let mut job = Job::new();

		job.apply(&uploading(200)).expect("progress");
		assert_eq!(job.progress().upload_percent, 100);

		job.apply(&uploading(30)).expect("progress");
		assert_eq!(job.progress().upload_percent, 30);
	}

	#[test]
	fn compressed_totals_accumulate() {
		let mut job = Job::new();

		job.apply(&compressed(2048, 512)).expect("progress");
		job.apply(&compressed(1000, 300)).expect("progress");

		let progress = job.progress();
		assert_eq!(progress.items_compressed, 2);
		assert_eq!(progress.bytes_before, 3048);
		assert_eq!(progress.bytes_after, 812);
	}
}
