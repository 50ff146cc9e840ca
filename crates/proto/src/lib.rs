//! Wire schema and consumer-side state machine for the pack compression
//! job protocol.
//!
//! A compression job emits an ordered stream of [`Event`]s: an optional
//! `info` manifest, any number of `log` progress entries, then exactly one
//! terminal event (`result` on success, job-level `error` on failure).
//! [`Job`] interprets that stream, tracking the lifecycle and derived
//! progress totals on behalf of whatever is rendering it.
//!
//! This crate is pure data: no I/O, no async. The transport lives in
//! `pack-client`.

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

mod event;
mod state;

pub use event::{decode_event, DecodeError, Event, LogEntry};
pub use state::{Job, JobState, PackInfo, Progress, StateError};
