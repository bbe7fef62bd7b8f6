//! Observability helpers for the refresher, dispatcher, and producers.
//!
//! - Task spans are named `realm_dispatch.task` with `task` and `stage` fields.
//! - Enable `metrics` to increment the `realm_dispatch_task_total` counter for every
//!   attempt/success/failure, labeled by `task` + `outcome`.

mod counter;
mod span;

pub use counter::*;
pub use span::*;

// self
use crate::_prelude::*;

/// Units of work observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskKind {
	/// Client-credentials exchange for one realm client.
	Refresh,
	/// Authenticated resource request.
	Dispatch,
	/// Payload production for a scheduled dispatch.
	Produce,
}
impl TaskKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TaskKind::Refresh => "refresh",
			TaskKind::Dispatch => "dispatch",
			TaskKind::Produce => "produce",
		}
	}
}
impl Display for TaskKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskOutcome {
	/// Entry to a unit of work.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure reported to the caller or logged.
	Failure,
}
impl TaskOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TaskOutcome::Attempt => "attempt",
			TaskOutcome::Success => "success",
			TaskOutcome::Failure => "failure",
		}
	}
}
impl Display for TaskOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
