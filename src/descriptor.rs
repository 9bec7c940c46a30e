//! Service descriptor: base host plus the three endpoint paths the client talks to.
//!
//! Paths double as the `PATH` field of the signed payload, so they are stored verbatim and
//! joined onto the base without re-encoding.

/// Builder API for assembling service descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Production host of the image-task service.
pub const DEFAULT_BASE_URL: &str = "https://openapi.caguuu.cn";
/// Unsigned token exchange path.
pub const DEFAULT_TOKEN_PATH: &str = "/auth/token";
/// Signed task creation path.
pub const DEFAULT_CREATE_TASK_PATH: &str = "/aigc/api/content-generation/image-task";
/// Signed task status path.
pub const DEFAULT_TASK_STATUS_PATH: &str = "/aigc/api/content-generation/image-task/status";

/// Endpoint paths declared by a service descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePaths {
	/// Token exchange path.
	pub token: String,
	/// Task creation path.
	pub create_task: String,
	/// Task status path.
	pub task_status: String,
}
impl Default for ServicePaths {
	fn default() -> Self {
		Self {
			token: DEFAULT_TOKEN_PATH.into(),
			create_task: DEFAULT_CREATE_TASK_PATH.into(),
			task_status: DEFAULT_TASK_STATUS_PATH.into(),
		}
	}
}

/// Immutable service descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
	/// Scheme + host (+ optional port) every path is appended to.
	pub base: Url,
	/// Endpoint paths.
	pub paths: ServicePaths,
}
impl ServiceDescriptor {
	/// Creates a new builder seeded with the production defaults.
	pub fn builder() -> ServiceDescriptorBuilder {
		ServiceDescriptorBuilder::new()
	}

	/// Resolves `path` (and an optional literal query) against the base host.
	///
	/// The query is attached verbatim so the bytes on the wire match the canonical query that
	/// was signed.
	pub fn endpoint(&self, path: &str, query: Option<&str>) -> Result<Url, ConfigError> {
		let origin = self.base.as_str().trim_end_matches('/');
		let raw = match query {
			Some(query) if !query.is_empty() => format!("{origin}{path}?{query}"),
			_ => format!("{origin}{path}"),
		};

		Url::parse(&raw).map_err(|source| ConfigError::InvalidEndpoint { url: raw, source })
	}
}
impl Default for ServiceDescriptor {
	fn default() -> Self {
		Self {
			base: Url::parse(DEFAULT_BASE_URL).expect("Default base URL is valid."),
			paths: ServicePaths::default(),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn default_descriptor_targets_production_host() {
		let descriptor = ServiceDescriptor::default();

		assert_eq!(
			descriptor
				.endpoint(&descriptor.paths.task_status, Some("taskId=42"))
				.expect("Status endpoint should resolve.")
				.as_str(),
			"https://openapi.caguuu.cn/aigc/api/content-generation/image-task/status?taskId=42"
		);
		assert_eq!(
			descriptor
				.endpoint(&descriptor.paths.create_task, None)
				.expect("Create endpoint should resolve.")
				.as_str(),
			"https://openapi.caguuu.cn/aigc/api/content-generation/image-task"
		);
	}

	#[test]
	fn endpoint_keeps_literal_query() {
		let descriptor = ServiceDescriptor::default();
		let url = descriptor
			.endpoint("/auth/token", Some("appKey=ak&appSecret=sk"))
			.expect("Token endpoint should resolve.");

		assert_eq!(url.path(), "/auth/token");
		assert_eq!(url.query(), Some("appKey=ak&appSecret=sk"));
	}
}
