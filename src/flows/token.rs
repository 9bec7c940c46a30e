//! Access-token exchange.
//!
//! The token endpoint sits outside the signature scheme: credentials travel as query
//! parameters on an unsigned `POST`, and the response carries the bearer token used by every
//! later stage. A `success=false` answer is reported as [`Error::Auth`] so the generation flow
//! can short-circuit into its soft-failure path.

// crates.io
use http::Method;
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Credentials},
	error::{ResponseError, TransportError},
	flows::{TaskClient, common},
	http::TaskHttpClient,
	obs::{self, Stage, StageOutcome, StageSpan},
	task::TokenData,
};

impl<C> TaskClient<C>
where
	C: ?Sized + TaskHttpClient,
{
	/// Exchanges the application key/secret pair for a short-lived access token.
	pub async fn acquire_token(&self, credentials: &Credentials) -> Result<AccessToken> {
		const STAGE: Stage = Stage::Token;

		let span = StageSpan::new(STAGE, "acquire_token");

		obs::record_stage_outcome(STAGE, StageOutcome::Attempt);

		let result = span
			.instrument(async move {
				let query = form_urlencoded::Serializer::new(String::new())
					.append_pair("appKey", &credentials.app_key)
					.append_pair("appSecret", credentials.app_secret.expose())
					.finish();
				let url = self.descriptor.endpoint(&self.descriptor.paths.token, Some(&query))?;
				let request = ::http::Request::builder()
					.method(Method::POST)
					.uri(url.as_str())
					.body(Vec::new())
					.map_err(|source| TransportError::Request { stage: STAGE, source })?;
				let response = common::dispatch(self.http_client.as_ref(), STAGE, request).await?;
				// The body carries the bearer token; keep it out of the logs.
				let envelope = common::decode(STAGE, &response, true)?;

				if !envelope.is_success() {
					return Err(Error::Auth { reason: envelope.reason() });
				}

				common::payload::<TokenData>(STAGE, &response, &envelope)?
					.and_then(|data| data.access_token)
					.ok_or_else(|| {
						ResponseError::MissingField { stage: STAGE, field: "data.accessToken" }
							.into()
					})
			})
			.await;

		obs::record_stage_outcome(STAGE, StageOutcome::of(&result));

		result
	}
}
