//! Shared helpers for stage implementations (request assembly, dispatch, envelope decoding).

// crates.io
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::Session,
	descriptor::ServiceDescriptor,
	error::{ResponseError, TransportError},
	http::{HttpRequest, HttpResponse, TaskHttpClient},
	obs::{self, Stage},
	signature::{SIGNATURE_HEADER, SignedRequest, TIMESTAMP_HEADER},
	task::ApiEnvelope,
};

/// Content type declared on every signed call.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Assembles the wire request for `signed`.
///
/// The URL query, the body, and the timestamp header are taken from the same
/// [`SignedRequest`] the signature was computed over.
pub fn signed_http_request(
	stage: Stage,
	descriptor: &ServiceDescriptor,
	signed: &SignedRequest,
	session: &Session,
) -> Result<HttpRequest> {
	let url = descriptor.endpoint(&signed.path, Some(&signed.canonical_query))?;

	::http::Request::builder()
		.method(signed.method.clone())
		.uri(url.as_str())
		.header(CONTENT_TYPE, JSON_CONTENT_TYPE)
		.header(AUTHORIZATION, session.access_token.bearer())
		.header(TIMESTAMP_HEADER, signed.timestamp.as_str())
		.header(SIGNATURE_HEADER, signed.signature.as_str())
		.body(signed.body.clone().into_bytes())
		.map_err(|source| TransportError::Request { stage, source }.into())
}

/// Sends `request`, mapping transport failures into [`TransportError`].
pub async fn dispatch<C>(client: &C, stage: Stage, request: HttpRequest) -> Result<HttpResponse>
where
	C: ?Sized + TaskHttpClient,
{
	client
		.execute(request)
		.await
		.map_err(|source| TransportError::network(stage, source).into())
}

/// Parses the `{success, message, data}` envelope of a response.
///
/// HTTP status codes are not interpreted; a body that is not a JSON envelope is a hard
/// failure regardless of status. The raw body is emitted to diagnostics unless `redact_body`
/// is set.
pub fn decode(stage: Stage, response: &HttpResponse, redact_body: bool) -> Result<ApiEnvelope> {
	let status = response.status().as_u16();
	let body = response.body();

	if redact_body {
		obs::record_response(stage, status, "<redacted>");
	} else {
		obs::record_response(stage, status, &String::from_utf8_lossy(body));
	}

	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| ResponseError::Malformed { stage, status, source }.into())
}

/// Decodes the stage payload of an envelope already known to be successful.
pub fn payload<T>(
	stage: Stage,
	response: &HttpResponse,
	envelope: &ApiEnvelope,
) -> Result<Option<T>>
where
	T: DeserializeOwned,
{
	envelope.payload().map_err(|source| {
		ResponseError::Malformed { stage, status: response.status().as_u16(), source }.into()
	})
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::{AccessToken, AppSecret},
		signature::{self, Timestamp},
		task::TokenData,
	};

	#[test]
	fn signed_request_carries_matching_headers() {
		let session = Session::new(AccessToken::new("tok"), AppSecret::new("s"));
		let signed = SignedRequest::at(
			Timestamp::from_unix(1_700_000_000),
			::http::Method::GET,
			"/aigc/api/content-generation/image-task/status",
			"taskId=42",
			"",
			&session.app_secret,
		);
		let request = signed_http_request(
			Stage::Poll,
			&ServiceDescriptor::default(),
			&signed,
			&session,
		)
		.expect("Signed request should build.");
		let header = |name: &str| {
			request
				.headers()
				.get(name)
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned)
				.expect("Header should be present.")
		};

		assert_eq!(request.method(), ::http::Method::GET);
		assert_eq!(request.uri().query(), Some("taskId=42"));
		assert_eq!(header("authorization"), "Bearer tok");
		assert_eq!(header("x-timestamp"), "1700000000");
		assert_eq!(header("content-type"), "application/json");
		assert_eq!(
			header("x-signature"),
			signature::sign(
				"GET",
				"/aigc/api/content-generation/image-task/status",
				"1700000000",
				"taskId=42",
				"",
				"s",
			)
		);
		assert!(request.body().is_empty());
	}

	#[test]
	fn decode_reports_path_of_malformed_field() {
		let response = HttpResponse::new(b"{\"success\":\"yes\"}".to_vec());
		let err = decode(Stage::Token, &response, false)
			.expect_err("String success flags should be rejected.");

		match err {
			Error::Response(ResponseError::Malformed { stage, status, source }) => {
				assert_eq!(stage, Stage::Token);
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "success");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn decode_rejects_non_json_bodies() {
		let response = HttpResponse::new(b"<html>bad gateway</html>".to_vec());

		assert!(matches!(
			decode(Stage::Token, &response, true),
			Err(Error::Response(ResponseError::Malformed { .. }))
		));
	}

	#[test]
	fn payload_errors_carry_stage_and_path() {
		let response = HttpResponse::new(b"{\"success\":true,\"data\":{\"accessToken\":7}}".to_vec());
		let envelope = decode(Stage::Token, &response, true).expect("Envelope should parse.");
		let err = payload::<TokenData>(Stage::Token, &response, &envelope)
			.expect_err("Numeric tokens should be rejected.");

		match err {
			Error::Response(ResponseError::Malformed { stage, source, .. }) => {
				assert_eq!(stage, Stage::Token);
				assert_eq!(source.path().to_string(), "accessToken");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}
}
