//! End-to-end generation: token → submit → poll → attachments.
//!
//! The result is a three-way [`GenerationOutcome`]. Service-side rejections and unfinished
//! tasks become [`GenerationOutcome::LogicalFailure`], which the host renders as a message in
//! the cell; transport and parse failures become [`GenerationOutcome::TransportError`].

// self
use crate::{
	_prelude::*,
	attachment::{self, Attachment},
	auth::Credentials,
	flows::{PollOutcome, TaskClient},
	http::TaskHttpClient,
	obs::{self, Stage, StageOutcome, StageSpan},
	task::{GenerationRequest, TaskStatus},
};

/// Message shown when the token endpoint rejects the credentials.
pub const TOKEN_FAILURE_MESSAGE: &str = "获取访问token失败，请检查AppKey和AppSecret";
/// Message shown for every other logical failure.
pub const GENERATION_FAILURE_MESSAGE: &str = "生成图片未成功，请重试";

/// Why an invocation ended without images even though every call completed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SoftFailure {
	/// Token endpoint answered `success=false`.
	TokenRejected {
		/// Service-supplied reason.
		reason: String,
	},
	/// Task endpoint answered `success=false`.
	SubmissionRejected {
		/// Service-supplied reason.
		reason: String,
	},
	/// Task reached a terminal state other than `SUCC`.
	TaskFailed {
		/// Reported status, if any.
		status: Option<TaskStatus>,
	},
	/// Polling budget elapsed.
	TimedOut {
		/// Time spent polling.
		elapsed: Duration,
	},
}
impl SoftFailure {
	/// Host-facing message. Every cause except a token rejection shares one text.
	pub fn message(&self) -> &'static str {
		match self {
			Self::TokenRejected { .. } => TOKEN_FAILURE_MESSAGE,
			_ => GENERATION_FAILURE_MESSAGE,
		}
	}
}
impl Display for SoftFailure {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::TokenRejected { reason } => write!(f, "token rejected: {reason}"),
			Self::SubmissionRejected { reason } => write!(f, "submission rejected: {reason}"),
			Self::TaskFailed { status: Some(status) } => write!(f, "task ended with {status}"),
			Self::TaskFailed { status: None } => f.write_str("task ended without a status"),
			Self::TimedOut { elapsed } => write!(f, "polling timed out after {elapsed:?}"),
		}
	}
}

/// Tagged result of one generation invocation.
#[derive(Debug)]
pub enum GenerationOutcome {
	/// All images were generated, in provider order.
	Success(Vec<Attachment>),
	/// Calls completed but produced no images.
	LogicalFailure(SoftFailure),
	/// A transport, parse, or configuration failure aborted the invocation.
	TransportError(Error),
}
impl GenerationOutcome {
	/// Returns the attachments when the invocation succeeded.
	pub fn attachments(&self) -> Option<&[Attachment]> {
		match self {
			Self::Success(attachments) => Some(attachments),
			_ => None,
		}
	}

	fn label(&self) -> &'static str {
		match self {
			Self::Success(_) => "success",
			Self::LogicalFailure(_) => "logical_failure",
			Self::TransportError(_) => "transport_error",
		}
	}
}

impl<C> TaskClient<C>
where
	C: ?Sized + TaskHttpClient,
{
	/// Runs a full invocation for `request` on behalf of `credentials`.
	///
	/// Stages run strictly in sequence. A rejected token skips every later call; a rejected
	/// submission skips polling.
	pub async fn generate(
		&self,
		credentials: &Credentials,
		request: &GenerationRequest,
	) -> GenerationOutcome {
		const STAGE: Stage = Stage::Generate;

		let span = StageSpan::new(STAGE, "generate");

		obs::record_stage_outcome(STAGE, StageOutcome::Attempt);

		let outcome = match span.instrument(self.run_stages(credentials, request)).await {
			Ok(outcome) => outcome,
			Err(e) => GenerationOutcome::TransportError(e),
		};

		match &outcome {
			GenerationOutcome::Success(attachments) => {
				obs::record_stage_outcome(STAGE, StageOutcome::Success);
				obs::record_invocation_outcome(outcome.label(), &attachments.len());
			},
			GenerationOutcome::LogicalFailure(failure) => {
				obs::record_stage_outcome(STAGE, StageOutcome::Rejected);
				obs::record_invocation_outcome(outcome.label(), failure);
			},
			GenerationOutcome::TransportError(e) => {
				obs::record_stage_outcome(STAGE, StageOutcome::Failure);
				obs::record_invocation_outcome(outcome.label(), e);
			},
		}

		outcome
	}

	async fn run_stages(
		&self,
		credentials: &Credentials,
		request: &GenerationRequest,
	) -> Result<GenerationOutcome> {
		let access_token = match self.acquire_token(credentials).await {
			Ok(token) => token,
			Err(Error::Auth { reason }) =>
				return Ok(GenerationOutcome::LogicalFailure(SoftFailure::TokenRejected { reason })),
			Err(e) => return Err(e),
		};
		let session = credentials.session(access_token);
		let task_id = match self.submit_task(request, &session).await {
			Ok(task_id) => task_id,
			Err(Error::Submission { reason }) =>
				return Ok(GenerationOutcome::LogicalFailure(SoftFailure::SubmissionRejected {
					reason,
				})),
			Err(e) => return Err(e),
		};
		let outcome = match self.poll_until_done(&task_id, &session).await? {
			PollOutcome::Succeeded { image_urls } =>
				GenerationOutcome::Success(attachment::to_attachments(&image_urls)),
			PollOutcome::Failed { status } =>
				GenerationOutcome::LogicalFailure(SoftFailure::TaskFailed { status }),
			PollOutcome::TimedOut { elapsed, .. } =>
				GenerationOutcome::LogicalFailure(SoftFailure::TimedOut { elapsed }),
		};

		Ok(outcome)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn only_token_rejection_has_its_own_message() {
		assert_eq!(
			SoftFailure::TokenRejected { reason: "bad".into() }.message(),
			TOKEN_FAILURE_MESSAGE
		);

		for failure in [
			SoftFailure::SubmissionRejected { reason: "quota".into() },
			SoftFailure::TaskFailed { status: Some(TaskStatus::Other("FAIL".into())) },
			SoftFailure::TaskFailed { status: None },
			SoftFailure::TimedOut { elapsed: Duration::from_secs(180) },
		] {
			assert_eq!(failure.message(), GENERATION_FAILURE_MESSAGE, "{failure}");
		}
	}
}
