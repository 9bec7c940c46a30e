//! Runs one field invocation against a local mock of the image-task service using the default
//! reqwest transport, then prints the attachments handed back to the host.

// std
use std::time::Duration;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use aigc_image_task::{
	descriptor::ServiceDescriptor,
	field::{self, FieldData, FormItemParams},
	flows::{PollPolicy, TaskClient},
	http::ReqwestHttpClient,
	reqwest::Client,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/token").query_param("appKey", "demo-key");
			then.status(200).json_body(json!({
				"success": true,
				"data": { "accessToken": "demo-access" }
			}));
		})
		.await;
	let task_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/aigc/api/content-generation/image-task")
				.header_exists("x-signature");
			then.status(200).json_body(json!({ "success": true, "data": { "taskId": 7 } }));
		})
		.await;
	let status_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/aigc/api/content-generation/image-task/status")
				.query_param("taskId", "7");
			then.status(200).json_body(json!({
				"success": true,
				"data": {
					"status": "SUCC",
					"imageUrls": [
						"https://cdn.example.com/renders/fox-1.png",
						"https://cdn.example.com/renders/fox-2.png"
					]
				}
			}));
		})
		.await;
	let descriptor = ServiceDescriptor::builder().base_str(&server.base_url())?.build()?;
	let http_client = ReqwestHttpClient::with_client(
		Client::builder().timeout(Duration::from_secs(10)).build()?,
	);
	let client = <TaskClient<ReqwestHttpClient>>::with_http_client(descriptor, http_client)
		.with_poll_policy(
			PollPolicy::default()
				.with_initial_delay(Duration::from_millis(100))
				.with_interval(Duration::from_millis(100)),
		);
	let params: FormItemParams = serde_json::from_value(json!({
		"sysPropmt": "You are an illustrator.",
		"imgDesc": [{ "type": "text", "text": "a red fox in fresh snow" }],
		"imgAmount": { "label": "2", "value": 2 },
		"imgQuality": { "label": "高", "value": "HIGH" },
		"imgSize": { "label": "1024x1024", "value": "_1024x1024" },
		"appKey": "demo-key",
		"appSecret": "demo-secret"
	}))?;
	let response = field::execute(&client, params).await;

	match &response.data {
		Some(FieldData::Attachments(attachments)) =>
			for attachment in attachments {
				println!("Generated {} at {}.", attachment.name, attachment.content);
			},
		Some(FieldData::Message { id }) => println!("No images: {id}."),
		None => println!("Invocation failed."),
	}

	token_mock.assert_async().await;
	task_mock.assert_async().await;
	status_mock.assert_async().await;

	Ok(())
}
