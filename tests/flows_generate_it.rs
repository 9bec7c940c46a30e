#![cfg(feature = "reqwest")]

// std
use std::time::Duration;
// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use aigc_image_task::{
	auth::{AppKey, AppSecret, Credentials},
	descriptor::ServiceDescriptor,
	field::{self, FieldCode, FieldData, FormItemParams},
	flows::{
		GENERATION_FAILURE_MESSAGE, GenerationOutcome, PollPolicy, ReqwestTaskClient, SoftFailure,
		TOKEN_FAILURE_MESSAGE, TaskClient,
	},
	task::{GenerationRequest, TaskStatus},
};

const APP_KEY: &str = "app-key-it";
const APP_SECRET: &str = "app-secret-it";
const TOKEN_PATH: &str = "/auth/token";
const CREATE_PATH: &str = "/aigc/api/content-generation/image-task";
const STATUS_PATH: &str = "/aigc/api/content-generation/image-task/status";

fn build_client(server: &MockServer) -> ReqwestTaskClient {
	let descriptor = ServiceDescriptor::builder()
		.base_str(&server.base_url())
		.expect("Mock server base URL should parse.")
		.build()
		.expect("Descriptor for the mock server should build.");
	let policy = PollPolicy::default()
		.with_initial_delay(Duration::ZERO)
		.with_interval(Duration::from_millis(10))
		.with_timeout(Duration::from_secs(2));

	TaskClient::new(descriptor).with_poll_policy(policy)
}

fn credentials() -> Credentials {
	Credentials::new(
		AppKey::new(APP_KEY).expect("App key should be valid."),
		AppSecret::new(APP_SECRET),
	)
}

fn request() -> GenerationRequest {
	GenerationRequest::new("a red fox in the snow").expect("Description should be valid.")
}

async fn mock_token<'a>(server: &'a MockServer) -> httpmock::Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.query_param("appKey", APP_KEY)
				.query_param("appSecret", APP_SECRET);
			then.status(200).json_body(json!({
				"success": true,
				"data": { "accessToken": "tok-it" }
			}));
		})
		.await
}

async fn mock_submit<'a>(server: &'a MockServer) -> httpmock::Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path(CREATE_PATH)
				.header("authorization", "Bearer tok-it")
				.header("content-type", "application/json")
				.header_exists("x-timestamp")
				.header_exists("x-signature");
			then.status(200).json_body(json!({ "success": true, "data": { "taskId": 42 } }));
		})
		.await
}

#[tokio::test]
async fn token_rejection_stops_before_submission() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).json_body(json!({ "success": false, "message": "invalid appKey" }));
		})
		.await;
	let submit = mock_submit(&server).await;
	let outcome = client.generate(&credentials(), &request()).await;

	match outcome {
		GenerationOutcome::LogicalFailure(failure) => {
			assert_eq!(failure, SoftFailure::TokenRejected { reason: "invalid appKey".into() });
			assert_eq!(failure.message(), TOKEN_FAILURE_MESSAGE);
		},
		other => panic!("Unexpected outcome: {other:?}."),
	}

	token.assert_calls_async(1).await;
	submit.assert_calls_async(0).await;
}

#[tokio::test]
async fn submission_rejection_skips_polling() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let token = mock_token(&server).await;
	let submit = server
		.mock_async(|when, then| {
			when.method(POST).path(CREATE_PATH);
			then.status(200).json_body(json!({ "success": false, "msg": "quota exceeded" }));
		})
		.await;
	let status = server
		.mock_async(|when, then| {
			when.method(GET).path(STATUS_PATH);
			then.status(200).json_body(json!({ "success": true, "data": { "status": "SUCC" } }));
		})
		.await;
	let outcome = client.generate(&credentials(), &request()).await;

	match outcome {
		GenerationOutcome::LogicalFailure(failure) => {
			assert!(matches!(failure, SoftFailure::SubmissionRejected { .. }));
			assert_eq!(failure.message(), GENERATION_FAILURE_MESSAGE);
		},
		other => panic!("Unexpected outcome: {other:?}."),
	}

	token.assert_calls_async(1).await;
	submit.assert_calls_async(1).await;
	status.assert_calls_async(0).await;
}

#[tokio::test]
async fn succeeded_task_yields_attachments_in_order() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let _token = mock_token(&server).await;
	let _submit = mock_submit(&server).await;
	let status = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(STATUS_PATH)
				.query_param("taskId", "42")
				.header("authorization", "Bearer tok-it")
				.header_exists("x-signature");
			then.status(200).json_body(json!({
				"success": true,
				"data": {
					"status": "SUCC",
					"imageUrls": ["https://cdn.example.com/out/b.png", "https://cdn.example.com/out/"]
				}
			}));
		})
		.await;
	let outcome = client.generate(&credentials(), &request()).await;
	let attachments = outcome.attachments().expect("Task should succeed.");
	let names: Vec<_> = attachments.iter().map(|a| a.name.as_str()).collect();

	assert_eq!(names, ["b.png", "generated_image_2.png"]);
	assert_eq!(attachments[0].content, "https://cdn.example.com/out/b.png");
	assert!(attachments.iter().all(|a| a.content_type == "attachment/url"));

	status.assert_calls_async(1).await;
}

#[tokio::test]
async fn failed_task_reports_generic_message() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let _token = mock_token(&server).await;
	let _submit = mock_submit(&server).await;
	let _status = server
		.mock_async(|when, then| {
			when.method(GET).path(STATUS_PATH);
			then.status(200).json_body(json!({ "success": true, "data": { "status": "FAIL" } }));
		})
		.await;
	let outcome = client.generate(&credentials(), &request()).await;

	match outcome {
		GenerationOutcome::LogicalFailure(SoftFailure::TaskFailed { status }) => {
			assert_eq!(status, Some(TaskStatus::Other("FAIL".into())));
		},
		other => panic!("Unexpected outcome: {other:?}."),
	}
}

#[tokio::test]
async fn running_task_times_out() {
	let server = MockServer::start_async().await;
	let client = build_client(&server).with_poll_policy(
		PollPolicy::default()
			.with_initial_delay(Duration::ZERO)
			.with_interval(Duration::from_millis(20))
			.with_timeout(Duration::from_millis(120)),
	);
	let _token = mock_token(&server).await;
	let _submit = mock_submit(&server).await;
	let _status = server
		.mock_async(|when, then| {
			when.method(GET).path(STATUS_PATH);
			then.status(200).json_body(json!({ "success": true, "data": { "status": "DOING" } }));
		})
		.await;
	let outcome = client.generate(&credentials(), &request()).await;

	match outcome {
		GenerationOutcome::LogicalFailure(failure @ SoftFailure::TimedOut { .. }) => {
			assert_eq!(failure.message(), GENERATION_FAILURE_MESSAGE);
		},
		other => panic!("Unexpected outcome: {other:?}."),
	}
}

#[tokio::test]
async fn non_json_status_is_a_hard_failure() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let _token = mock_token(&server).await;
	let _submit = mock_submit(&server).await;
	let status = server
		.mock_async(|when, then| {
			when.method(GET).path(STATUS_PATH);
			then.status(502).body("<html>Bad Gateway</html>");
		})
		.await;
	let outcome = client.generate(&credentials(), &request()).await;

	assert!(matches!(outcome, GenerationOutcome::TransportError(_)));

	status.assert_calls_async(1).await;
}

#[tokio::test]
async fn field_execute_returns_host_shaped_responses() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let _token = mock_token(&server).await;
	let _submit = mock_submit(&server).await;
	let _status = server
		.mock_async(|when, then| {
			when.method(GET).path(STATUS_PATH);
			then.status(200).json_body(json!({
				"success": true,
				"data": { "status": "SUCC", "imageUrls": ["https://cdn.example.com/a.png"] }
			}));
		})
		.await;
	let params: FormItemParams = serde_json::from_value(json!({
		"imgDesc": [{ "type": "text", "text": "a red fox in the snow" }],
		"imgAmount": { "label": "1", "value": 1 },
		"appKey": APP_KEY,
		"appSecret": APP_SECRET
	}))
	.expect("Host params should deserialize.");
	let response = field::execute(&client, params).await;

	assert_eq!(response.code, FieldCode::Success);
	assert!(matches!(
		response.data,
		Some(FieldData::Attachments(ref attachments)) if attachments[0].name == "a.png"
	));

	let invalid = field::execute(&client, FormItemParams::default()).await;

	assert_eq!(invalid.code, FieldCode::Error);
	assert_eq!(invalid.data, None);
}
