//! Fixed-cadence status polling under a wall-clock budget.
//!
//! After submission the poller waits [`PollPolicy::initial_delay`], starts its clock, and
//! then issues one freshly signed status request per [`PollPolicy::interval`] until the task
//! leaves `DOING` or [`PollPolicy::timeout`] has elapsed since the clock started. There is
//! no backoff and no jitter.
//!
//! A response with `success=false` is indistinguishable from "not ready yet" and simply
//! loops; this includes signature rejections. Malformed (non-JSON) bodies abort polling with
//! a hard error.

// crates.io
use http::Method;
use serde_json::Value;
use tokio::time::{self, Instant};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{Session, TaskId},
	error::ResponseError,
	flows::{TaskClient, common},
	http::TaskHttpClient,
	obs::{self, Stage, StageOutcome, StageSpan},
	signature::SignedRequest,
	task::{TaskSnapshot, TaskStatus},
};

/// Fixed polling cadence and time budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
	/// Pause between task acceptance and the first status check.
	pub initial_delay: Duration,
	/// Pause between consecutive status checks.
	pub interval: Duration,
	/// Budget measured from the first status check, not from submission.
	pub timeout: Duration,
}
impl PollPolicy {
	const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(3);
	const DEFAULT_INTERVAL: Duration = Duration::from_secs(3);
	const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3 * 60);

	/// Overrides the initial delay.
	pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
		self.initial_delay = initial_delay;

		self
	}

	/// Overrides the interval between checks.
	pub fn with_interval(mut self, interval: Duration) -> Self {
		self.interval = interval;

		self
	}

	/// Overrides the polling budget.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;

		self
	}
}
impl Default for PollPolicy {
	fn default() -> Self {
		Self {
			initial_delay: Self::DEFAULT_INITIAL_DELAY,
			interval: Self::DEFAULT_INTERVAL,
			timeout: Self::DEFAULT_TIMEOUT,
		}
	}
}

/// How a polling run ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollOutcome {
	/// Task reached `SUCC`.
	Succeeded {
		/// Image URLs in provider order.
		image_urls: Vec<String>,
	},
	/// Task reached a terminal state other than `SUCC`; `None` when the service omitted it.
	Failed {
		/// Reported terminal status.
		status: Option<TaskStatus>,
	},
	/// Budget elapsed while the task was still running or unreadable.
	TimedOut {
		/// Time spent polling.
		elapsed: Duration,
		/// Number of status requests issued.
		attempts: u32,
	},
}

impl<C> TaskClient<C>
where
	C: ?Sized + TaskHttpClient,
{
	/// Polls `task_id` until it reaches a terminal state or the policy's timeout elapses.
	pub async fn poll_until_done(&self, task_id: &TaskId, session: &Session) -> Result<PollOutcome> {
		const STAGE: Stage = Stage::Poll;

		let span = StageSpan::new(STAGE, "poll_until_done");

		obs::record_stage_outcome(STAGE, StageOutcome::Attempt);

		let policy = self.poll_policy;
		let result = span
			.instrument(async move {
				time::sleep(policy.initial_delay).await;

				let started = Instant::now();
				let canonical_query = status_query(task_id);
				let mut attempts = 0_u32;

				while started.elapsed() < policy.timeout {
					attempts += 1;

					if let Some(outcome) = self.check_status(&canonical_query, session).await? {
						return Ok(outcome);
					}

					time::sleep(policy.interval).await;
				}

				let elapsed = started.elapsed();

				obs::record_poll_timeout(elapsed, policy.timeout);

				Ok::<_, Error>(PollOutcome::TimedOut { elapsed, attempts })
			})
			.await;
		let outcome = match &result {
			Ok(PollOutcome::Succeeded { .. }) => StageOutcome::Success,
			Ok(_) => StageOutcome::Rejected,
			Err(_) => StageOutcome::Failure,
		};

		obs::record_stage_outcome(STAGE, outcome);

		result
	}

	/// Issues one signed status request; `None` means "keep polling".
	async fn check_status(
		&self,
		canonical_query: &str,
		session: &Session,
	) -> Result<Option<PollOutcome>> {
		const STAGE: Stage = Stage::Poll;

		let signed = SignedRequest::now(
			STAGE,
			Method::GET,
			&self.descriptor.paths.task_status,
			canonical_query,
			"",
			&session.app_secret,
		);
		let request = common::signed_http_request(STAGE, &self.descriptor, &signed, session)?;
		let response = common::dispatch(self.http_client.as_ref(), STAGE, request).await?;
		let envelope = common::decode(STAGE, &response, false)?;

		if !envelope.is_success() {
			return Ok(None);
		}

		// A payload that is not an object carries no status and ends the task as a failure.
		let TaskSnapshot { status, image_urls } = match &envelope.data {
			Some(Value::Object(_)) =>
				common::payload::<TaskSnapshot>(STAGE, &response, &envelope)?.unwrap_or_default(),
			_ => TaskSnapshot::default(),
		};

		match status {
			Some(TaskStatus::Doing) => Ok(None),
			Some(TaskStatus::Succeeded) => {
				let image_urls = image_urls
					.ok_or(ResponseError::MissingField { stage: STAGE, field: "data.imageUrls" })?;

				Ok(Some(PollOutcome::Succeeded { image_urls }))
			},
			status => Ok(Some(PollOutcome::Failed { status })),
		}
	}
}

/// Canonical status query. The id is form-encoded so the signed query survives URL parsing
/// byte for byte.
fn status_query(task_id: &TaskId) -> String {
	form_urlencoded::Serializer::new(String::new()).append_pair("taskId", task_id).finish()
}
