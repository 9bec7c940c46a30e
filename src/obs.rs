//! Optional observability helpers for task stages.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `aigc_image_task.stage` with the `stage`
//!   and `call` fields, plus debug events carrying request signatures and raw response bodies.
//! - Enable `metrics` to increment the `aigc_image_task_stage_total` counter for every
//!   attempt/success/rejection/failure, labeled by `stage` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Stages of a generation invocation observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
	/// Access token exchange.
	Token,
	/// Signed task creation.
	Submit,
	/// Signed status polling.
	Poll,
	/// End-to-end generation orchestration.
	Generate,
}
impl Stage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Stage::Token => "token",
			Stage::Submit => "submit",
			Stage::Poll => "poll",
			Stage::Generate => "generate",
		}
	}
}
impl Display for Stage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageOutcome {
	/// Entry to a stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Service answered but declined the request (soft failure).
	Rejected,
	/// Hard failure propagated back to the caller.
	Failure,
}
impl StageOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StageOutcome::Attempt => "attempt",
			StageOutcome::Success => "success",
			StageOutcome::Rejected => "rejected",
			StageOutcome::Failure => "failure",
		}
	}

	/// Classifies a stage result.
	pub fn of<T>(result: &Result<T>) -> Self {
		match result {
			Ok(_) => Self::Success,
			Err(e) if e.is_rejection() => Self::Rejected,
			Err(_) => Self::Failure,
		}
	}
}
impl Display for StageOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
