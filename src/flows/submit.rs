//! Signed task creation.

// crates.io
use http::Method;
// self
use crate::{
	_prelude::*,
	auth::{Session, TaskId},
	error::ResponseError,
	flows::{TaskClient, common},
	http::TaskHttpClient,
	obs::{self, Stage, StageOutcome, StageSpan},
	signature::SignedRequest,
	task::{GenerationRequest, TaskCreated},
};

impl<C> TaskClient<C>
where
	C: ?Sized + TaskHttpClient,
{
	/// Submits `request` as a new asynchronous task and returns its identifier.
	///
	/// The body is serialized once; that exact string is both sent and signed (after
	/// whitespace normalization) with an empty canonical query. A `success=false` answer is
	/// reported as [`Error::Submission`] and is never retried.
	pub async fn submit_task(
		&self,
		request: &GenerationRequest,
		session: &Session,
	) -> Result<TaskId> {
		const STAGE: Stage = Stage::Submit;

		let span = StageSpan::new(STAGE, "submit_task");

		obs::record_stage_outcome(STAGE, StageOutcome::Attempt);

		let result = span
			.instrument(async move {
				let body = request.to_json()?;

				obs::record_request_body(STAGE, &body);

				let signed = SignedRequest::now(
					STAGE,
					Method::POST,
					&self.descriptor.paths.create_task,
					"",
					body,
					&session.app_secret,
				);
				let http_request =
					common::signed_http_request(STAGE, &self.descriptor, &signed, session)?;
				let response =
					common::dispatch(self.http_client.as_ref(), STAGE, http_request).await?;
				let envelope = common::decode(STAGE, &response, false)?;

				if !envelope.is_success() {
					return Err(Error::Submission { reason: envelope.reason() });
				}

				let raw = common::payload::<TaskCreated>(STAGE, &response, &envelope)?
					.and_then(|data| data.task_id)
					.ok_or(ResponseError::MissingField { stage: STAGE, field: "data.taskId" })?;

				TaskId::try_from(raw)
					.map_err(|source| ResponseError::InvalidTaskId { stage: STAGE, source }.into())
			})
			.await;

		obs::record_stage_outcome(STAGE, StageOutcome::of(&result));

		result
	}
}
